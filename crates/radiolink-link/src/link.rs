use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use radiolink_frame::{FrameConfig, FrameHandler, FrameReader, FrameWriter, ReaderStats};
use radiolink_transport::{SerialChannel, SerialConfig};
use tracing::{debug, info, warn};

use crate::error::{LinkError, Result};
use crate::handshake::handshake;
use crate::message::{MessageCodec, ProtobufCodec};

const READER_THREAD_NAME: &str = "radiolink-reader";

/// Everything needed to open a link.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Serial device and line settings.
    pub serial: SerialConfig,
    /// Reader limits.
    pub frame: FrameConfig,
}

impl LinkConfig {
    /// Defaults for the device at `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            serial: SerialConfig::new(path),
            frame: FrameConfig::default(),
        }
    }
}

/// One open serial connection to a radio.
///
/// A background thread owns the [`FrameReader`] and delivers packets and log
/// lines to the handler given at open time. Sends may come from any thread;
/// they are serialized so frames never interleave on the wire.
///
/// Dropping a link shuts it down the same way [`Link::close`] does.
pub struct Link<W: Write = SerialChannel> {
    writer: Mutex<FrameWriter<W>>,
    running: Arc<AtomicBool>,
    reader: Option<JoinHandle<ReaderStats>>,
    config_id: Option<u32>,
}

impl Link<SerialChannel> {
    /// Open the device described by `config` and perform the handshake with
    /// the protobuf codec.
    pub fn open<H>(config: &LinkConfig, handler: H) -> Result<Self>
    where
        H: FrameHandler + 'static,
    {
        Self::open_with_codec(config, handler, &ProtobufCodec)
    }

    /// Open the device described by `config`, using `codec` for the
    /// configuration request.
    ///
    /// Failing to open the device is fatal and leaves nothing behind. A failed
    /// handshake is only logged: the link stays open and usable.
    pub fn open_with_codec<H, C>(config: &LinkConfig, handler: H, codec: &C) -> Result<Self>
    where
        H: FrameHandler + 'static,
        C: MessageCodec,
    {
        let channel = SerialChannel::open(&config.serial)?;
        let reader_channel = channel.try_clone()?;
        Self::start(reader_channel, channel, handler, codec, config.frame.clone())
    }
}

impl<W: Write> Link<W> {
    /// Build a link over an already-open duplex stream pair such as a socket
    /// or a pipe.
    ///
    /// A zero-byte read is taken as the peer closing the stream: the reader
    /// reports [`FrameError::ConnectionClosed`] to the handler and stops.
    /// `reader` must have a bounded read timeout (or be non-blocking) for
    /// [`Link::close`] to return promptly.
    ///
    /// [`FrameError::ConnectionClosed`]: radiolink_frame::FrameError::ConnectionClosed
    pub fn from_streams<R, H, C>(
        reader: R,
        writer: W,
        handler: H,
        codec: &C,
        frame_config: FrameConfig,
    ) -> Result<Self>
    where
        R: Read + Send + 'static,
        H: FrameHandler + 'static,
        C: MessageCodec,
    {
        let frame_config = FrameConfig {
            eof_closes: true,
            ..frame_config
        };
        Self::start(reader, writer, handler, codec, frame_config)
    }

    fn start<R, H, C>(
        reader: R,
        writer: W,
        handler: H,
        codec: &C,
        frame_config: FrameConfig,
    ) -> Result<Self>
    where
        R: Read + Send + 'static,
        H: FrameHandler + 'static,
        C: MessageCodec,
    {
        let mut frame_reader = FrameReader::with_config(reader, frame_config)?;
        let running = Arc::new(AtomicBool::new(true));

        let reader = {
            let running = Arc::clone(&running);
            let mut handler = handler;
            thread::Builder::new()
                .name(READER_THREAD_NAME.to_string())
                .spawn(move || {
                    if frame_reader.run(&mut handler, &running).is_err() {
                        running.store(false, Ordering::Release);
                    }
                    frame_reader.stats()
                })
                .map_err(LinkError::Spawn)?
        };

        let mut writer = FrameWriter::new(writer);
        let config_id = match handshake(&mut writer, codec) {
            Ok(id) => Some(id),
            Err(err) => {
                warn!(error = %err, "handshake failed, link remains open");
                None
            }
        };

        info!(?config_id, "link open");

        Ok(Self {
            writer: Mutex::new(writer),
            running,
            reader: Some(reader),
            config_id,
        })
    }

    /// Encode `message` with `codec` and send it as one packet.
    pub fn send_message<C: MessageCodec>(&self, codec: &C, message: &C::Message) -> Result<()> {
        let payload = codec
            .encode(message)
            .map_err(|err| LinkError::Encode(Box::new(err)))?;
        self.send_payload(&payload)
    }

    /// Send an already-encoded payload as one packet.
    pub fn send_payload(&self, payload: &[u8]) -> Result<()> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.send(payload)?;
        Ok(())
    }

    /// Id carried by the configuration request, if the handshake succeeded.
    pub fn config_id(&self) -> Option<u32> {
        self.config_id
    }

    /// True while the reader thread is delivering events.
    ///
    /// Becomes false after [`Link::close`] or once the transport fails.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
            && self
                .reader
                .as_ref()
                .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop the reader, wait for it to exit, then release the transport.
    ///
    /// Returns what the reader saw over the lifetime of the link.
    pub fn close(mut self) -> Result<ReaderStats> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<ReaderStats> {
        self.running.store(false, Ordering::Release);
        let Some(handle) = self.reader.take() else {
            return Ok(ReaderStats::default());
        };

        let stats = handle.join().map_err(|_| LinkError::ReaderPanicked)?;
        debug!(?stats, "link closed");
        Ok(stats)
    }
}

impl<W: Write> Drop for Link<W> {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            warn!(error = %err, "link shutdown failed");
        }
    }
}

impl<W: Write> std::fmt::Debug for Link<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Link")
            .field("running", &self.running.load(Ordering::Relaxed))
            .field("config_id", &self.config_id)
            .finish()
    }
}
