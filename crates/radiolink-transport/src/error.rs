/// Errors that can occur while opening or driving a serial channel.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The device could not be opened.
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        source: serialport::Error,
    },

    /// The device was opened but its line settings could not be applied.
    #[error("failed to configure {path}: {source}")]
    Configure {
        path: String,
        source: std::io::Error,
    },

    /// The serial driver rejected an operation on an open port.
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// An I/O error occurred on the channel.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// The I/O error kind behind this error, when there is one.
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            TransportError::Configure { source, .. } | TransportError::Io(source) => {
                Some(source.kind())
            }
            TransportError::Open { source, .. } | TransportError::Serial(source) => {
                match source.kind() {
                    serialport::ErrorKind::Io(kind) => Some(kind),
                    serialport::ErrorKind::NoDevice => Some(std::io::ErrorKind::NotFound),
                    _ => None,
                }
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
