use radiolink_frame::{MAX_LOG_SIZE, MAX_PACKET_SIZE};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("radiolink {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: radiolink");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("max_packet_size: {MAX_PACKET_SIZE}");
    println!("max_log_size: {MAX_LOG_SIZE}");

    Ok(SUCCESS)
}
