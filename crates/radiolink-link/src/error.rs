/// Errors that can occur in link operations.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] radiolink_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] radiolink_frame::FrameError),

    /// The message codec could not encode a message.
    #[error("encode failed: {0}")]
    Encode(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The reader thread could not be started.
    #[error("failed to spawn reader thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// The reader thread panicked.
    #[error("reader thread panicked")]
    ReaderPanicked,
}

pub type Result<T> = std::result::Result<T, LinkError>;
