//! Serial link lifecycle for radio devices.
//!
//! This is the "just works" layer. Open a device, get packets and device log
//! lines delivered to a handler on a background reader thread, send framed
//! messages, and close cleanly.

pub mod error;
pub mod handshake;
pub mod link;
pub mod message;

pub use error::{LinkError, Result};
pub use handshake::{new_config_id, NODELESS_WANT_CONFIG_ID};
pub use link::{Link, LinkConfig};
pub use message::{to_radio, Heartbeat, MessageCodec, ProtobufCodec, ToRadio};
