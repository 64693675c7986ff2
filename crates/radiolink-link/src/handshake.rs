use std::io::Write;

use radiolink_frame::FrameWriter;
use tracing::debug;

use crate::error::{LinkError, Result};
use crate::message::MessageCodec;

/// Configuration id the device reserves for "no node database" requests.
/// A link never sends it.
pub const NODELESS_WANT_CONFIG_ID: u32 = 69420;

/// Pick a random configuration request id.
pub fn new_config_id() -> u32 {
    avoid_reserved(rand::random())
}

fn avoid_reserved(id: u32) -> u32 {
    if id == NODELESS_WANT_CONFIG_ID {
        id.wrapping_add(1)
    } else {
        id
    }
}

/// Resynchronize the device and ask it for its configuration.
///
/// Sends the priming run of first markers (unframed), then the codec's
/// configuration request as a framed packet. Returns the id carried by the
/// request.
pub fn handshake<W: Write, C: MessageCodec>(
    writer: &mut FrameWriter<W>,
    codec: &C,
) -> Result<u32> {
    writer.prime()?;
    debug!("priming sequence sent");

    let config_id = new_config_id();
    let message = codec.config_request(config_id);
    let payload = codec
        .encode(&message)
        .map_err(|err| LinkError::Encode(Box::new(err)))?;
    writer.send(&payload)?;

    debug!(config_id, len = payload.len(), "configuration requested");
    Ok(config_id)
}
