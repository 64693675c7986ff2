use clap::{ArgGroup, Args, Subcommand};
use radiolink_link::LinkConfig;
use radiolink_transport::DEFAULT_BAUD_RATE;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod monitor;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print packets and device log lines from a radio.
    Monitor(MonitorArgs),
    /// Send a single framed payload.
    Send(SendArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Monitor(args) => monitor::run(args, format),
        Command::Send(args) => send::run(args),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct DeviceArgs {
    /// Serial device path (e.g. /dev/ttyACM0).
    #[arg(env = "RADIOLINK_DEVICE")]
    pub device: String,
    /// Line speed in baud.
    #[arg(long, env = "RADIOLINK_BAUD", default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,
}

impl DeviceArgs {
    pub fn link_config(&self) -> LinkConfig {
        let mut config = LinkConfig::new(&self.device);
        config.serial = config.serial.with_baud_rate(self.baud);
        config
    }
}

#[derive(Args, Debug)]
pub struct MonitorArgs {
    #[command(flatten)]
    pub device: DeviceArgs,
    /// Exit after receiving N packets.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("payload")
        .required(true)
        .args(["hex", "heartbeat", "disconnect"])
))]
pub struct SendArgs {
    #[command(flatten)]
    pub device: DeviceArgs,
    /// Already-encoded payload as hex (e.g. 3a020805).
    #[arg(long)]
    pub hex: Option<String>,
    /// Send a heartbeat message.
    #[arg(long)]
    pub heartbeat: bool,
    /// Tell the device the host is disconnecting.
    #[arg(long)]
    pub disconnect: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
