//! Serial byte channel for radio devices.
//!
//! This is the lowest layer of radiolink. It owns an open serial device and
//! exposes blocking read-some / write-all primitives plus the line
//! configuration the framing layer depends on:
//! - the configured baud rate
//! - hangup-on-close disabled, so closing the link does not reset the radio
//! - a bounded read timeout, so a reader thread can observe shutdown
//!
//! Everything else builds on top of the [`SerialChannel`] type provided here.

pub mod error;
pub mod serial;

pub use error::{Result, TransportError};
pub use serial::{SerialChannel, SerialConfig, DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT};
