use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// First start-of-frame marker.
pub const MARKER_1: u8 = 0x94;

/// Second start-of-frame marker.
pub const MARKER_2: u8 = 0xC3;

/// Frame header: markers (2) + length (2) = 4 bytes.
pub const HEADER_SIZE: usize = 4;

/// Maximum payload size accepted on the wire.
pub const MAX_PACKET_SIZE: usize = 512;

/// Log line buffer size; a line carries at most `MAX_LOG_SIZE - 1` bytes.
pub const MAX_LOG_SIZE: usize = 1024;

/// Number of `MARKER_1` bytes sent unframed when a link opens.
pub const PRIMING_LEN: usize = 32;

/// A complete packet as received from the wire: header followed by payload.
///
/// Packets are immutable and cheap to clone; handlers may keep them after the
/// callback returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    frame: Bytes,
}

impl Packet {
    /// Frame `payload` into a new packet.
    pub fn new(payload: &[u8]) -> Result<Self> {
        let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload.len());
        encode_frame(payload, &mut buf)?;
        Ok(Self {
            frame: buf.freeze(),
        })
    }

    /// Wrap an already-framed buffer. The caller guarantees the header is valid.
    pub(crate) fn from_frame(frame: Bytes) -> Self {
        debug_assert!(frame.len() >= HEADER_SIZE);
        Self { frame }
    }

    /// Header and payload exactly as they appeared on the wire.
    pub fn as_bytes(&self) -> &[u8] {
        &self.frame
    }

    /// The payload without the header.
    pub fn payload(&self) -> &[u8] {
        &self.frame[HEADER_SIZE..]
    }

    /// The payload as a shared buffer (no copy).
    pub fn payload_bytes(&self) -> Bytes {
        self.frame.slice(HEADER_SIZE..)
    }

    /// Payload length in bytes.
    pub fn payload_len(&self) -> usize {
        self.frame.len() - HEADER_SIZE
    }

    /// The total wire size of this packet (header + payload).
    pub fn wire_size(&self) -> usize {
        self.frame.len()
    }

    /// Consume the packet and return the framed bytes.
    pub fn into_bytes(self) -> Bytes {
        self.frame
    }
}

/// Build the 4-byte header for a payload of `payload_len` bytes.
///
/// Wire format:
/// ```text
/// ┌──────────┬──────────┬─────────────┬────────────────┐
/// │ Marker 1 │ Marker 2 │ Length      │ Payload        │
/// │ 0x94     │ 0xC3     │ (2B BE)     │ (Length bytes) │
/// └──────────┴──────────┴─────────────┴────────────────┘
/// ```
pub fn encode_header(payload_len: usize) -> Result<[u8; HEADER_SIZE]> {
    if payload_len > MAX_PACKET_SIZE {
        return Err(FrameError::PacketTooLarge {
            size: payload_len,
            max: MAX_PACKET_SIZE,
        });
    }
    let [hi, lo] = (payload_len as u16).to_be_bytes();
    Ok([MARKER_1, MARKER_2, hi, lo])
}

/// Decode the payload length from a complete header.
pub fn decode_length(header: &[u8; HEADER_SIZE]) -> usize {
    u16::from_be_bytes([header[2], header[3]]) as usize
}

/// Append a framed packet (header + payload) to `dst`.
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    let header = encode_header(payload.len())?;
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_slice(&header);
    dst.put_slice(payload);
    Ok(())
}

/// The unframed run of `MARKER_1` bytes that resynchronizes a device which
/// may be stuck mid-frame.
pub fn priming_sequence() -> [u8; PRIMING_LEN] {
    [MARKER_1; PRIMING_LEN]
}

/// Configuration for the frame reader.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Largest payload accepted from the wire. Default: 512 bytes.
    pub max_packet_size: usize,
    /// Log line buffer size; lines keep at most `max_log_size - 1` bytes.
    pub max_log_size: usize,
    /// Treat a read of zero bytes as the peer closing the stream.
    ///
    /// Off by default: a serial port never reports end-of-stream, and a zero
    /// read there only means no data yet. Socket and pipe transports should
    /// turn it on.
    pub eof_closes: bool,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_packet_size: MAX_PACKET_SIZE,
            max_log_size: MAX_LOG_SIZE,
            eof_closes: false,
        }
    }
}
