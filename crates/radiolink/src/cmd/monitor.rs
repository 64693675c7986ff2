use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use radiolink_frame::FrameEvent;
use radiolink_link::Link;
use tracing::info;

use crate::cmd::MonitorArgs;
use crate::exit::{link_error, CliError, CliResult, INTERNAL, SUCCESS, TRANSPORT_ERROR};
use crate::output::{print_log_line, print_packet, OutputFormat};

const POLL_INTERVAL: Duration = Duration::from_millis(200);

pub fn run(args: MonitorArgs, format: OutputFormat) -> CliResult<i32> {
    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let (tx, rx) = mpsc::channel();
    let link = Link::open(&args.device.link_config(), tx)
        .map_err(|err| link_error("open failed", err))?;

    let mut printed = 0usize;
    let mut disconnected = false;

    while running.load(Ordering::SeqCst) && !limit_reached(args.count, printed) {
        let event = match rx.recv_timeout(POLL_INTERVAL) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                disconnected = true;
                break;
            }
        };

        match event {
            FrameEvent::Packet(packet) => {
                print_packet(&packet, format);
                printed = printed.saturating_add(1);
            }
            FrameEvent::LogLine(line) => print_log_line(&line, format),
        }
    }

    let stats = link
        .close()
        .map_err(|err| link_error("close failed", err))?;
    info!(
        packets = stats.packets,
        log_lines = stats.log_lines,
        oversize_discarded = stats.oversize_discarded,
        false_markers = stats.false_markers,
        "monitor finished"
    );

    if disconnected {
        return Err(CliError::new(
            TRANSPORT_ERROR,
            format!("{}: device stopped responding", args.device.device),
        ));
    }
    Ok(SUCCESS)
}

fn limit_reached(count: Option<usize>, printed: usize) -> bool {
    count.is_some_and(|count| printed >= count)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
