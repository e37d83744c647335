//! # streamhub
//!
//! A concurrent TCP packet server with:
//! - One or two listening ports (broadcast delivery and packet ingestion)
//! - Pluggable per-connection framing ("stream protocols"), resolved by name
//! - Per-connection access-control gating with optional reverse-DNS
//! - Single-producer broadcast fan-out to every connected client
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────┐   accept    ┌─────────────────────────────┐
//! │  Listener    ├────────────▶│  ACL Gate → ClientRegistry  │
//! │ (per port)   │             └──────┬───────────────▲──────┘
//! └──────────────┘                    │               │
//!                        read-capable │               │ snapshot
//!                                     ▼               │
//!                           ┌──────────────┐   ┌──────┴───────┐
//!                           │ Read         │   │ Write        │
//!                           │ Aggregator   │   │ Broadcaster  │
//!                           └──────┬───────┘   └──────▲───────┘
//!                                  │ push             │ pop
//!                                  ▼                  │
//!                           ┌──────────────┐   ┌──────┴───────┐
//!                           │  Read Queue  │   │ Write Queue  │
//!                           └──────┬───────┘   └──────▲───────┘
//!                                  │ read()           │ write()
//!                                  ▼                  │
//!                               consumers         producer
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod network;
pub mod packet;
pub mod protocol;
pub mod queue;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::{AccessControl, HostResolver, ServerConfig};
pub use error::{HubError, Result};
pub use network::TcpServer;
pub use packet::Packet;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of streamhub
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
