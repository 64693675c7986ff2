//! Outbound message boundary.
//!
//! The link treats encoded messages as opaque payloads. [`MessageCodec`] is
//! the seam; [`ProtobufCodec`] covers the handful of `ToRadio` messages the
//! link itself needs (configuration request, heartbeat, disconnect).

use prost::Message;

/// Serializes structured messages into packet payloads.
pub trait MessageCodec {
    /// The message type this codec encodes.
    type Message;
    /// Encoding failure.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Encode `message` into payload bytes.
    fn encode(&self, message: &Self::Message) -> Result<Vec<u8>, Self::Error>;

    /// Build the message that asks the device to stream its configuration.
    fn config_request(&self, config_id: u32) -> Self::Message;
}

/// Host-to-radio envelope (subset of the Meshtastic `ToRadio` message).
#[derive(Clone, PartialEq, Message)]
pub struct ToRadio {
    #[prost(oneof = "to_radio::PayloadVariant", tags = "3, 4, 7")]
    pub payload_variant: Option<to_radio::PayloadVariant>,
}

pub mod to_radio {
    /// Supported `ToRadio` payloads.
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum PayloadVariant {
        /// Ask the device to send its node database and configuration,
        /// tagged with a caller-chosen nonce.
        #[prost(uint32, tag = "3")]
        WantConfigId(u32),
        /// Tell the device the host is going away.
        #[prost(bool, tag = "4")]
        Disconnect(bool),
        /// Keep-alive.
        #[prost(message, tag = "7")]
        Heartbeat(super::Heartbeat),
    }
}

/// Keep-alive payload.
#[derive(Clone, Copy, PartialEq, Message)]
pub struct Heartbeat {
    #[prost(uint32, tag = "1")]
    pub nonce: u32,
}

impl ToRadio {
    /// Configuration request tagged with `config_id`.
    pub fn want_config(config_id: u32) -> Self {
        Self {
            payload_variant: Some(to_radio::PayloadVariant::WantConfigId(config_id)),
        }
    }

    /// Disconnect notice.
    pub fn disconnect() -> Self {
        Self {
            payload_variant: Some(to_radio::PayloadVariant::Disconnect(true)),
        }
    }

    /// Heartbeat carrying `nonce`.
    pub fn heartbeat(nonce: u32) -> Self {
        Self {
            payload_variant: Some(to_radio::PayloadVariant::Heartbeat(Heartbeat { nonce })),
        }
    }
}

/// Protobuf encoder for [`ToRadio`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProtobufCodec;

impl MessageCodec for ProtobufCodec {
    type Message = ToRadio;
    type Error = prost::EncodeError;

    fn encode(&self, message: &ToRadio) -> Result<Vec<u8>, prost::EncodeError> {
        let mut buf = Vec::with_capacity(message.encoded_len());
        message.encode(&mut buf)?;
        Ok(buf)
    }

    fn config_request(&self, config_id: u32) -> ToRadio {
        ToRadio::want_config(config_id)
    }
}
