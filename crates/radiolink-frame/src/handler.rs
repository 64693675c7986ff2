use std::sync::mpsc;

use tracing::{error, info};

use crate::codec::Packet;
use crate::error::FrameError;

/// A unit of output from the frame reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameEvent {
    /// A complete, length-validated packet.
    Packet(Packet),
    /// One line of device diagnostic text, without the line terminator.
    LogLine(String),
}

/// Receives reader output.
///
/// Methods run on the reader thread; they must not block indefinitely or the
/// link stops draining the device.
pub trait FrameHandler: Send {
    /// Called once per complete packet, in arrival order.
    fn on_packet(&mut self, packet: &Packet);

    /// Called once per complete log line, in arrival order.
    fn on_log_line(&mut self, line: &str) {
        info!(target: "radiolink::device", "{line}");
    }

    /// Called when the reader stops because the transport failed.
    fn on_transport_error(&mut self, err: &FrameError) {
        error!(error = %err, "serial reader stopped");
    }

    /// Dispatch an event to the matching callback.
    fn on_event(&mut self, event: &FrameEvent) {
        match event {
            FrameEvent::Packet(packet) => self.on_packet(packet),
            FrameEvent::LogLine(line) => self.on_log_line(line),
        }
    }
}

/// Forwards every event to a consumer thread.
///
/// Events are dropped once the receiving side hangs up.
impl FrameHandler for mpsc::Sender<FrameEvent> {
    fn on_packet(&mut self, packet: &Packet) {
        let _ = self.send(FrameEvent::Packet(packet.clone()));
    }

    fn on_log_line(&mut self, line: &str) {
        let _ = self.send(FrameEvent::LogLine(line.to_string()));
    }
}

impl<H: FrameHandler + ?Sized> FrameHandler for Box<H> {
    fn on_packet(&mut self, packet: &Packet) {
        (**self).on_packet(packet)
    }

    fn on_log_line(&mut self, line: &str) {
        (**self).on_log_line(line)
    }

    fn on_transport_error(&mut self, err: &FrameError) {
        (**self).on_transport_error(err)
    }
}
