//! Stream protocols
//!
//! Pluggable per-connection framing strategies. A protocol converts raw bytes
//! into packets and packets into raw bytes; the server is agnostic to framing
//! policy beyond invoking the trait.
//!
//! ## Built-in variants
//! - `BURST`  - no framing: whatever bytes arrive in one read become one packet
//! - `LENGTH` - big-endian length prefix (1, 2 or 4 bytes; default 4)
//! - `FIXED`  - every packet is exactly N bytes
//!
//! Protocols are selected by name at server construction through
//! [`ProtocolKind::resolve`]; an unresolvable name or invalid arguments fail
//! construction before any socket is touched.

mod burst;
mod fixed;
mod length;

pub use burst::BurstProtocol;
pub use fixed::FixedProtocol;
pub use length::LengthProtocol;

use std::io::{Read, Write};

use crate::error::{HubError, Result};
use crate::packet::Packet;

/// Maximum decoded payload size (16 MB)
pub const MAX_PACKET_SIZE: usize = 16 * 1024 * 1024;

/// Per-connection framing strategy
///
/// One instance is constructed for each accepted connection. `read_packet`
/// may keep decode state across calls; `write_packet` encodes one packet and
/// flushes it.
pub trait StreamProtocol: Send {
    /// Decode the next packet from the source.
    ///
    /// Returns `HubError::Timeout` when the source's read timeout elapsed
    /// without a complete packet, and `HubError::Disconnected` when the peer
    /// closed the connection. Partial frames interrupted by a timeout must be
    /// retained and resumed on the next call.
    fn read_packet(&mut self, source: &mut dyn Read) -> Result<Packet>;

    /// Encode one packet onto the sink and flush it
    fn write_packet(&mut self, sink: &mut dyn Write, packet: &Packet) -> Result<()>;

    /// Release any protocol-level state on client removal
    fn disconnect(&mut self) -> Result<()> {
        Ok(())
    }
}

// =============================================================================
// Name Registry
// =============================================================================

/// A resolved protocol selection: the name-to-factory registry entry.
///
/// Arguments are validated once here, at server construction, so per-client
/// instantiation cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolKind {
    /// One low-level read = one packet
    Burst,

    /// Big-endian length prefix of `prefix_len` bytes
    Length { prefix_len: usize },

    /// Every packet is exactly `packet_len` bytes
    Fixed { packet_len: usize },
}

impl ProtocolKind {
    /// Resolve a protocol name and its arguments.
    ///
    /// Names are case-insensitive. Fails with `HubError::Config` on an
    /// unknown name or invalid arguments.
    pub fn resolve(name: &str, args: &[String]) -> Result<Self> {
        match name.to_ascii_uppercase().as_str() {
            "BURST" => {
                if !args.is_empty() {
                    return Err(HubError::Config(format!(
                        "BURST protocol takes no arguments, got {}",
                        args.len()
                    )));
                }
                Ok(ProtocolKind::Burst)
            }
            "LENGTH" => {
                let prefix_len = match args {
                    [] => 4,
                    [arg] => arg.parse::<usize>().map_err(|_| {
                        HubError::Config(format!("LENGTH prefix size is not a number: {arg:?}"))
                    })?,
                    _ => {
                        return Err(HubError::Config(format!(
                            "LENGTH protocol takes at most one argument, got {}",
                            args.len()
                        )))
                    }
                };
                if !matches!(prefix_len, 1 | 2 | 4) {
                    return Err(HubError::Config(format!(
                        "LENGTH prefix size must be 1, 2 or 4 bytes, got {prefix_len}"
                    )));
                }
                Ok(ProtocolKind::Length { prefix_len })
            }
            "FIXED" => {
                let packet_len = match args {
                    [arg] => arg.parse::<usize>().map_err(|_| {
                        HubError::Config(format!("FIXED packet size is not a number: {arg:?}"))
                    })?,
                    _ => {
                        return Err(HubError::Config(
                            "FIXED protocol requires exactly one argument (packet size)"
                                .to_string(),
                        ))
                    }
                };
                if packet_len == 0 || packet_len > MAX_PACKET_SIZE {
                    return Err(HubError::Config(format!(
                        "FIXED packet size must be between 1 and {MAX_PACKET_SIZE}, got {packet_len}"
                    )));
                }
                Ok(ProtocolKind::Fixed { packet_len })
            }
            other => Err(HubError::Config(format!(
                "Unknown stream protocol: {other}"
            ))),
        }
    }

    /// Construct a fresh protocol instance for one connection
    pub fn instantiate(&self) -> Box<dyn StreamProtocol> {
        match *self {
            ProtocolKind::Burst => Box::new(BurstProtocol::new()),
            ProtocolKind::Length { prefix_len } => Box::new(LengthProtocol::new(prefix_len)),
            ProtocolKind::Fixed { packet_len } => Box::new(FixedProtocol::new(packet_len)),
        }
    }
}
