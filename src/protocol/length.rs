//! Length-prefixed framing
//!
//! Each packet is preceded by a big-endian length prefix of 1, 2 or 4 bytes.
//!
//! ```text
//! ┌────────────────┬─────────────────────────────┐
//! │ Len (1|2|4)    │         Payload             │
//! └────────────────┴─────────────────────────────┘
//! ```

use std::io::{Read, Write};

use bytes::Bytes;

use crate::error::{HubError, Result};
use crate::packet::Packet;

use super::{StreamProtocol, MAX_PACKET_SIZE};

/// Length-prefixed stream protocol
///
/// Carries partial-frame state across calls: a frame interrupted by a read
/// timeout resumes where it left off instead of desyncing the stream.
pub struct LengthProtocol {
    prefix_len: usize,
    prefix: [u8; 4],
    prefix_filled: usize,
    payload: Option<Vec<u8>>,
    payload_filled: usize,
}

impl LengthProtocol {
    /// `prefix_len` must be 1, 2 or 4 (validated by protocol resolution)
    pub fn new(prefix_len: usize) -> Self {
        Self {
            prefix_len,
            prefix: [0u8; 4],
            prefix_filled: 0,
            payload: None,
            payload_filled: 0,
        }
    }

    /// Largest payload the prefix width can express, capped at the global max
    fn max_payload(&self) -> usize {
        match self.prefix_len {
            1 => u8::MAX as usize,
            2 => u16::MAX as usize,
            _ => MAX_PACKET_SIZE,
        }
    }
}

impl StreamProtocol for LengthProtocol {
    fn read_packet(&mut self, source: &mut dyn Read) -> Result<Packet> {
        // Prefix first, then exactly that many payload bytes. A timeout
        // mid-frame returns with the partial bytes retained; the next call
        // resumes from where the stream left off.
        while self.prefix_filled < self.prefix_len {
            let n = source
                .read(&mut self.prefix[self.prefix_filled..self.prefix_len])
                .map_err(HubError::from_read_error)?;
            if n == 0 {
                return Err(HubError::Disconnected);
            }
            self.prefix_filled += n;
        }

        let mut payload_len = 0usize;
        for byte in &self.prefix[..self.prefix_len] {
            payload_len = (payload_len << 8) | *byte as usize;
        }

        if self.payload.is_none() {
            if payload_len > MAX_PACKET_SIZE {
                self.prefix_filled = 0;
                return Err(HubError::Protocol(format!(
                    "Payload too large: {payload_len} bytes (max {MAX_PACKET_SIZE})"
                )));
            }
            self.payload = Some(vec![0u8; payload_len]);
            self.payload_filled = 0;
        }

        if let Some(payload) = self.payload.as_mut() {
            while self.payload_filled < payload.len() {
                let n = source
                    .read(&mut payload[self.payload_filled..])
                    .map_err(HubError::from_read_error)?;
                if n == 0 {
                    return Err(HubError::Disconnected);
                }
                self.payload_filled += n;
            }
        }

        self.prefix_filled = 0;
        self.payload_filled = 0;
        let payload = self.payload.take().unwrap_or_default();
        Ok(Packet::from_buffer(Bytes::from(payload)))
    }

    fn write_packet(&mut self, sink: &mut dyn Write, packet: &Packet) -> Result<()> {
        let payload_len = packet.len();
        if payload_len > self.max_payload() {
            return Err(HubError::Protocol(format!(
                "Payload too large for {}-byte prefix: {payload_len} bytes",
                self.prefix_len
            )));
        }

        let prefix = (payload_len as u32).to_be_bytes();
        sink.write_all(&prefix[4 - self.prefix_len..])?;
        sink.write_all(packet.buffer())?;
        sink.flush()?;
        Ok(())
    }
}
