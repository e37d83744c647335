//! Network Module
//!
//! The TCP server core and its background loops.
//!
//! ## Architecture
//! - One listener thread per distinct bound port
//! - One read aggregator thread per read-capable client
//! - One shared write broadcaster thread when a write port is set
//! - Client registry and both packet queues carry independent locks

mod broadcaster;
mod connection;
mod listener;
mod reader;
mod registry;
mod server;

pub use connection::ClientConnection;
pub use registry::ClientRegistry;
pub use server::{TcpServer, WriteHook};
