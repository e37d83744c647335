//! Burst framing
//!
//! The minimal built-in variant: no length or delimiter framing at all.
//! Whatever bytes are available at the next read attempt become exactly one
//! decoded packet, and a write is the raw payload with no envelope.

use std::io::{Read, Write};

use bytes::Bytes;

use crate::error::{HubError, Result};
use crate::packet::Packet;

use super::StreamProtocol;

/// Read buffer size for one burst
const READ_CHUNK_SIZE: usize = 4096;

/// Framing-free stream protocol
pub struct BurstProtocol {
    chunk: Vec<u8>,
}

impl BurstProtocol {
    pub fn new() -> Self {
        Self {
            chunk: vec![0u8; READ_CHUNK_SIZE],
        }
    }
}

impl Default for BurstProtocol {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamProtocol for BurstProtocol {
    fn read_packet(&mut self, source: &mut dyn Read) -> Result<Packet> {
        match source.read(&mut self.chunk) {
            Ok(0) => Err(HubError::Disconnected),
            Ok(n) => Ok(Packet::from_buffer(Bytes::copy_from_slice(
                &self.chunk[..n],
            ))),
            Err(e) => Err(HubError::from_read_error(e)),
        }
    }

    fn write_packet(&mut self, sink: &mut dyn Write, packet: &Packet) -> Result<()> {
        sink.write_all(packet.buffer())?;
        sink.flush()?;
        Ok(())
    }
}
