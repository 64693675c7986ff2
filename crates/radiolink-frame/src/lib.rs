//! Marker-delimited packet framing for radio serial streams.
//!
//! A radio's serial stream interleaves free-form diagnostic text with binary
//! packets. Every packet is framed with:
//! - Two marker bytes (`0x94 0xC3`) for stream synchronization
//! - A 2-byte big-endian payload length
//!
//! Bytes outside a packet are collected into log lines. The reader tolerates
//! any fragmentation of the underlying transport; callers always get complete
//! packets and complete lines.

pub mod codec;
pub mod error;
pub mod handler;
pub mod log;
pub mod reader;
pub mod writer;

pub use codec::{
    decode_length, encode_frame, encode_header, priming_sequence, FrameConfig, Packet,
    HEADER_SIZE, MARKER_1, MARKER_2, MAX_LOG_SIZE, MAX_PACKET_SIZE, PRIMING_LEN,
};
pub use error::{FrameError, Result};
pub use handler::{FrameEvent, FrameHandler};
pub use log::LogLineBuffer;
pub use reader::{FrameReader, ReaderStats};
pub use writer::FrameWriter;
