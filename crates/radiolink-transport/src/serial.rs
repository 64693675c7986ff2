use std::io::{Read, Write};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, TransportError};

/// Default line speed of the radio's USB-serial interface.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default upper bound for a single blocking read.
///
/// The reader thread only observes shutdown between reads, so this also bounds
/// how long closing a link can take.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

#[cfg(unix)]
type PortType = serialport::TTYPort;
#[cfg(windows)]
type PortType = serialport::COMPort;

/// Line configuration for a serial channel.
///
/// Hangup-on-close is always disabled and is not configurable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Device path, e.g. `/dev/ttyUSB0` or `COM3`.
    pub path: String,
    /// Baud rate applied to both directions.
    pub baud_rate: u32,
    /// Upper bound for a single blocking read.
    pub read_timeout: Duration,
}

impl SerialConfig {
    /// Configuration for `path` with default baud rate and read timeout.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Override the baud rate.
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Override the read timeout.
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }
}

/// An open serial device, readable and writable.
///
/// Reads block for at most the configured read timeout and then fail with
/// [`std::io::ErrorKind::TimedOut`], which callers treat as "no data yet".
/// `flush` drains the OS output queue to the device.
pub struct SerialChannel {
    port: PortType,
    path: String,
}

impl SerialChannel {
    /// Open and configure a serial device.
    ///
    /// On failure nothing is left open.
    pub fn open(config: &SerialConfig) -> Result<Self> {
        let port = serialport::new(config.path.as_str(), config.baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .stop_bits(serialport::StopBits::One)
            .parity(serialport::Parity::None)
            .flow_control(serialport::FlowControl::None)
            .timeout(config.read_timeout)
            .open_native()
            .map_err(|source| TransportError::Open {
                path: config.path.clone(),
                source,
            })?;

        #[cfg(unix)]
        disable_hangup_on_close(&port).map_err(|source| TransportError::Configure {
            path: config.path.clone(),
            source,
        })?;

        info!(path = %config.path, baud = config.baud_rate, "opened serial channel");

        Ok(Self {
            port,
            path: config.path.clone(),
        })
    }

    /// Duplicate the handle so reads and writes can happen on separate threads.
    pub fn try_clone(&self) -> Result<Self> {
        let port = self.port.try_clone_native()?;
        debug!(path = %self.path, "cloned serial channel");
        Ok(Self {
            port,
            path: self.path.clone(),
        })
    }
}

impl Read for SerialChannel {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.port.read(buf)
    }
}

impl Write for SerialChannel {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.port.flush()
    }
}

impl std::fmt::Debug for SerialChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialChannel")
            .field("path", &self.path)
            .finish()
    }
}

/// Clear `HUPCL` so that closing the descriptor does not drop the modem
/// control lines (which resets most USB radios).
#[cfg(unix)]
fn disable_hangup_on_close(port: &serialport::TTYPort) -> std::io::Result<()> {
    use std::os::fd::AsRawFd;

    let fd = port.as_raw_fd();
    let mut tty = std::mem::MaybeUninit::<libc::termios>::uninit();

    // SAFETY: `fd` is an open terminal descriptor owned by `port`, and `tty`
    // points to writable storage large enough for a `termios`.
    let rc = unsafe { libc::tcgetattr(fd, tty.as_mut_ptr()) };
    if rc != 0 {
        return Err(std::io::Error::last_os_error());
    }

    // SAFETY: `tcgetattr` returned success, so every field has been written.
    let mut tty = unsafe { tty.assume_init() };
    tty.c_cflag &= !libc::HUPCL;

    // SAFETY: `fd` is still open and `tty` is a fully initialized `termios`.
    let rc = unsafe { libc::tcsetattr(fd, libc::TCSANOW, &tty) };
    if rc != 0 {
        return Err(std::io::Error::last_os_error());
    }

    debug!(fd, "disabled hangup-on-close");
    Ok(())
}
