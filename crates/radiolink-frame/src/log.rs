//! Line reassembly for the diagnostic text a device prints between packets.

use crate::codec::MAX_LOG_SIZE;
use crate::error::Result;

/// Accumulates stray bytes into newline-terminated log lines.
///
/// `\r` is dropped, `\n` completes the line, and bytes beyond the capacity are
/// dropped until the next newline (the line is truncated, never overflowed).
#[derive(Debug)]
pub struct LogLineBuffer {
    buf: Vec<u8>,
    limit: usize,
}

impl LogLineBuffer {
    /// Buffer sized for `MAX_LOG_SIZE`.
    pub fn new() -> Result<Self> {
        Self::with_size(MAX_LOG_SIZE)
    }

    /// Buffer sized for `size`; lines keep at most `size - 1` bytes.
    pub fn with_size(size: usize) -> Result<Self> {
        let limit = size.saturating_sub(1);
        let mut buf = Vec::new();
        buf.try_reserve_exact(limit)?;
        Ok(Self { buf, limit })
    }

    /// Feed one byte. Returns the completed line when `byte` is a newline.
    pub fn push(&mut self, byte: u8) -> Option<String> {
        match byte {
            b'\r' => None,
            b'\n' => {
                let line = String::from_utf8_lossy(&self.buf).into_owned();
                self.buf.clear();
                Some(line)
            }
            _ => {
                if self.buf.len() < self.limit {
                    self.buf.push(byte);
                }
                None
            }
        }
    }

    /// Bytes held for the line in progress.
    pub fn pending(&self) -> &[u8] {
        &self.buf
    }

    /// Maximum number of bytes a line can carry.
    pub fn capacity(&self) -> usize {
        self.limit
    }
}
