//! Fixed-size framing
//!
//! Every packet is exactly `packet_len` bytes; no header of any kind. Useful
//! for hardware that emits rigid records.

use std::io::{Read, Write};

use bytes::Bytes;

use crate::error::{HubError, Result};
use crate::packet::Packet;

use super::StreamProtocol;

/// Fixed-size stream protocol
///
/// Carries partial-frame state across calls: a record interrupted by a read
/// timeout resumes where it left off instead of desyncing the stream.
pub struct FixedProtocol {
    packet_len: usize,
    buf: Vec<u8>,
    filled: usize,
}

impl FixedProtocol {
    /// `packet_len` must be non-zero (validated by protocol resolution)
    pub fn new(packet_len: usize) -> Self {
        Self {
            packet_len,
            buf: vec![0u8; packet_len],
            filled: 0,
        }
    }
}

impl StreamProtocol for FixedProtocol {
    fn read_packet(&mut self, source: &mut dyn Read) -> Result<Packet> {
        while self.filled < self.packet_len {
            let n = source
                .read(&mut self.buf[self.filled..])
                .map_err(HubError::from_read_error)?;
            if n == 0 {
                return Err(HubError::Disconnected);
            }
            self.filled += n;
        }
        self.filled = 0;
        Ok(Packet::from_buffer(Bytes::copy_from_slice(&self.buf)))
    }

    fn write_packet(&mut self, sink: &mut dyn Write, packet: &Packet) -> Result<()> {
        if packet.len() != self.packet_len {
            return Err(HubError::Protocol(format!(
                "Fixed-size packet must be {} bytes, got {}",
                self.packet_len,
                packet.len()
            )));
        }
        sink.write_all(packet.buffer())?;
        sink.flush()?;
        Ok(())
    }
}
