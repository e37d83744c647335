//! Packet value type
//!
//! The unit exchanged with clients. The payload is opaque to the server;
//! target/packet names are metadata carried alongside it.

use bytes::Bytes;

/// An opaque structured byte buffer with target/name metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Name of the target this packet belongs to, if known
    target_name: Option<String>,

    /// Name of the packet within its target, if known
    packet_name: Option<String>,

    /// Raw payload bytes (cheaply cloneable for broadcast fan-out)
    buffer: Bytes,
}

impl Packet {
    /// Create a named packet with an empty buffer
    pub fn new(target_name: impl Into<String>, packet_name: impl Into<String>) -> Self {
        Self {
            target_name: Some(target_name.into()),
            packet_name: Some(packet_name.into()),
            buffer: Bytes::new(),
        }
    }

    /// Create an anonymous packet from raw bytes
    ///
    /// Used by framing variants that decode payloads without identifying them.
    pub fn from_buffer(buffer: impl Into<Bytes>) -> Self {
        Self {
            target_name: None,
            packet_name: None,
            buffer: buffer.into(),
        }
    }

    /// Set the payload, consuming and returning the packet
    pub fn with_buffer(mut self, buffer: impl Into<Bytes>) -> Self {
        self.buffer = buffer.into();
        self
    }

    /// Replace the payload
    pub fn set_buffer(&mut self, buffer: impl Into<Bytes>) {
        self.buffer = buffer.into();
    }

    /// Target name, if the packet has been identified
    pub fn target_name(&self) -> Option<&str> {
        self.target_name.as_deref()
    }

    /// Packet name, if the packet has been identified
    pub fn packet_name(&self) -> Option<&str> {
        self.packet_name.as_deref()
    }

    /// Raw payload bytes
    pub fn buffer(&self) -> &Bytes {
        &self.buffer
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// True when the payload is empty
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
