use radiolink_frame::{FrameHandler, Packet};
use radiolink_link::{Link, MessageCodec, ProtobufCodec, ToRadio};
use tracing::debug;

use crate::cmd::SendArgs;
use crate::exit::{link_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};

pub fn run(args: SendArgs) -> CliResult<i32> {
    let payload = resolve_payload(&args)?;

    let link = Link::open(&args.device.link_config(), Inbound)
        .map_err(|err| link_error("open failed", err))?;

    link.send_payload(&payload)
        .map_err(|err| link_error("send failed", err))?;
    debug!(len = payload.len(), "payload sent");

    link.close()
        .map_err(|err| link_error("close failed", err))?;
    Ok(SUCCESS)
}

/// Device output during a one-shot send is only logged.
struct Inbound;

impl FrameHandler for Inbound {
    fn on_packet(&mut self, packet: &Packet) {
        debug!(len = packet.payload_len(), "inbound packet ignored");
    }
}

fn resolve_payload(args: &SendArgs) -> CliResult<Vec<u8>> {
    if let Some(hex) = &args.hex {
        return parse_hex(hex);
    }

    let message = if args.heartbeat {
        ToRadio::heartbeat(rand::random())
    } else if args.disconnect {
        ToRadio::disconnect()
    } else {
        return Err(CliError::new(USAGE, "no payload given"));
    };

    ProtobufCodec
        .encode(&message)
        .map_err(|err| CliError::new(DATA_INVALID, format!("encode failed: {err}")))
}

fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let digits: String = input
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && *c != ':')
        .collect();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(&digits);

    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(CliError::new(
            USAGE,
            format!("--hex is not valid hex: {input}"),
        ));
    }
    if digits.len() % 2 != 0 {
        return Err(CliError::new(
            USAGE,
            format!("--hex needs an even number of digits: {input}"),
        ));
    }

    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| CliError::new(USAGE, format!("--hex is not valid hex: {input}")))
        })
        .collect()
}
