/// Errors that can occur while framing packets.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload exceeds the maximum packet size.
    #[error("packet too large ({size} bytes, max {max})")]
    PacketTooLarge { size: usize, max: usize },

    /// The 4-byte header could not be written completely.
    #[error("header write failed: {0}")]
    HeaderWrite(#[source] std::io::Error),

    /// The payload could not be written completely.
    #[error("payload write failed: {0}")]
    PayloadWrite(#[source] std::io::Error),

    /// An I/O error occurred on the transport (read failure or flush failure).
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer closed the stream (only with [`FrameConfig::eof_closes`]).
    ///
    /// [`FrameConfig::eof_closes`]: crate::FrameConfig::eof_closes
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// The packet or log buffer could not be allocated.
    #[error("buffer allocation failed: {0}")]
    AllocationFailed(#[from] std::collections::TryReserveError),
}

pub type Result<T> = std::result::Result<T, FrameError>;
