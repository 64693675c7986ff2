//! Serial framing and link management for mesh radio devices.
//!
//! radiolink sits between a radio's USB serial port and a messaging layer. It
//! splits the device's byte stream into binary packets and diagnostic text,
//! frames outbound messages, and manages the lifetime of the connection.
//!
//! # Crate Structure
//!
//! - [`transport`]: Serial byte channel (open, configure, read, write)
//! - [`frame`]: Packet framing, the reader state machine, and log extraction
//! - [`link`]: Link lifecycle: reader thread, handshake, serialized sends

/// Re-export transport types.
pub mod transport {
    pub use radiolink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use radiolink_frame::*;
}

/// Re-export link types.
pub mod link {
    pub use radiolink_link::*;
}

pub use radiolink_frame::{FrameEvent, FrameHandler, Packet};
pub use radiolink_link::{Link, LinkConfig};
