use std::io::{ErrorKind, Read};
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use tracing::{debug, trace, warn};

use crate::codec::{decode_length, FrameConfig, Packet, HEADER_SIZE, MARKER_1, MARKER_2};
use crate::error::{FrameError, Result};
use crate::handler::{FrameEvent, FrameHandler};
use crate::log::LogLineBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadState {
    SearchMarker1,
    SearchMarker2,
    ReadHeader,
    ReadPayload,
}

/// Counters describing what a reader has seen so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderStats {
    /// Complete packets delivered.
    pub packets: u64,
    /// Complete log lines delivered.
    pub log_lines: u64,
    /// Frames dropped because the header announced an oversize payload.
    pub oversize_discarded: u64,
    /// First markers that were not followed by the second marker.
    pub false_markers: u64,
}

/// Splits a serial byte stream into packets and log lines.
///
/// Each [`step`](Self::step) issues exactly one read on the inner stream, so
/// the reader tolerates any fragmentation: one byte per read up to whole
/// bursts of packets. A read that yields nothing (`Ok(0)`, a timeout, or an
/// interrupted/would-block error) is an idle step, never an error, unless
/// [`FrameConfig::eof_closes`] makes `Ok(0)` mean the peer has gone.
pub struct FrameReader<T> {
    inner: T,
    state: ReadState,
    buf: Vec<u8>,
    filled: usize,
    needed: usize,
    log: LogLineBuffer,
    config: FrameConfig,
    stats: ReaderStats,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Result<Self> {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    ///
    /// Both buffers are allocated up front at their fixed capacity.
    pub fn with_config(inner: T, mut config: FrameConfig) -> Result<Self> {
        config.max_packet_size = config.max_packet_size.min(u16::MAX as usize);

        let size = HEADER_SIZE + config.max_packet_size;
        let mut buf = Vec::new();
        buf.try_reserve_exact(size)?;
        buf.resize(size, 0);

        let log = LogLineBuffer::with_size(config.max_log_size)?;

        Ok(Self {
            inner,
            state: ReadState::SearchMarker1,
            buf,
            filled: 0,
            needed: 0,
            log,
            config,
            stats: ReaderStats::default(),
        })
    }

    /// Perform one read and advance the state machine.
    ///
    /// Returns the packet or log line completed by this read, if any. Only a
    /// genuine transport failure is returned as an error.
    pub fn step(&mut self) -> Result<Option<FrameEvent>> {
        match self.state {
            ReadState::SearchMarker1 => {
                if self.read_into(1)? == 0 {
                    return Ok(None);
                }
                let byte = self.buf[0];
                if byte == MARKER_1 {
                    self.state = ReadState::SearchMarker2;
                    return Ok(None);
                }
                self.filled = 0;
                Ok(self.push_log(byte))
            }
            ReadState::SearchMarker2 => {
                if self.read_into(1)? == 0 {
                    return Ok(None);
                }
                let byte = self.buf[1];
                if byte == MARKER_2 {
                    self.state = ReadState::ReadHeader;
                    return Ok(None);
                }

                self.stats.false_markers += 1;
                if byte == MARKER_1 {
                    // The rejected byte may itself start a frame.
                    self.filled = 1;
                    return Ok(None);
                }
                self.reset();
                Ok(self.push_log(byte))
            }
            ReadState::ReadHeader => {
                if self.read_into(HEADER_SIZE - self.filled)? == 0 || self.filled < HEADER_SIZE {
                    return Ok(None);
                }

                let len = decode_length(&[self.buf[0], self.buf[1], self.buf[2], self.buf[3]]);
                if len > self.config.max_packet_size {
                    warn!(
                        len,
                        max = self.config.max_packet_size,
                        "discarding oversize frame"
                    );
                    self.stats.oversize_discarded += 1;
                    self.reset();
                    return Ok(None);
                }

                trace!(len, "frame header");
                self.needed = len;
                if len == 0 {
                    return Ok(Some(self.complete()));
                }
                self.state = ReadState::ReadPayload;
                Ok(None)
            }
            ReadState::ReadPayload => {
                let read = self.read_into(self.needed)?;
                if read == 0 {
                    return Ok(None);
                }
                self.needed -= read;
                trace!(read, needed = self.needed, "payload bytes");
                if self.needed == 0 {
                    return Ok(Some(self.complete()));
                }
                Ok(None)
            }
        }
    }

    /// Deliver events to `handler` until `running` is cleared.
    ///
    /// The flag is checked once per read, so shutdown latency is bounded by
    /// the inner stream's read timeout. On transport failure the handler's
    /// [`FrameHandler::on_transport_error`] is called and the error returned.
    pub fn run<H: FrameHandler + ?Sized>(
        &mut self,
        handler: &mut H,
        running: &AtomicBool,
    ) -> Result<()> {
        debug!("frame reader running");
        while running.load(Ordering::Acquire) {
            match self.step() {
                Ok(Some(event)) => handler.on_event(&event),
                Ok(None) => {}
                Err(err) => {
                    handler.on_transport_error(&err);
                    return Err(err);
                }
            }
        }
        debug!(stats = ?self.stats, "frame reader stopped");
        Ok(())
    }

    /// Counters for everything read so far.
    pub fn stats(&self) -> ReaderStats {
        self.stats
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Bytes held for the log line in progress.
    pub fn pending_log(&self) -> &[u8] {
        self.log.pending()
    }

    /// True when no partial frame is buffered.
    pub fn is_searching(&self) -> bool {
        self.state == ReadState::SearchMarker1
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    fn read_into(&mut self, count: usize) -> Result<usize> {
        let end = self.filled + count;
        match self.inner.read(&mut self.buf[self.filled..end]) {
            Ok(0) if self.config.eof_closes => Err(FrameError::ConnectionClosed),
            Ok(n) => {
                self.filled += n;
                Ok(n)
            }
            Err(err) if is_idle(&err) => Ok(0),
            Err(err) => Err(FrameError::Io(err)),
        }
    }

    fn push_log(&mut self, byte: u8) -> Option<FrameEvent> {
        let line = self.log.push(byte)?;
        self.stats.log_lines += 1;
        Some(FrameEvent::LogLine(line))
    }

    fn complete(&mut self) -> FrameEvent {
        let frame = Bytes::copy_from_slice(&self.buf[..self.filled]);
        self.stats.packets += 1;
        self.reset();
        FrameEvent::Packet(Packet::from_frame(frame))
    }

    fn reset(&mut self) {
        self.state = ReadState::SearchMarker1;
        self.filled = 0;
        self.needed = 0;
    }
}

fn is_idle(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::Interrupted | ErrorKind::WouldBlock | ErrorKind::TimedOut
    )
}
