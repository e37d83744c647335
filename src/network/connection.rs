//! Client connection
//!
//! One accepted socket paired with its write-side stream protocol instance.
//! Read-capable clients decode through a separate instance owned by their
//! reader thread, so a broadcast never waits on an in-flight read. Created on
//! accept; destroyed on orderly disconnect, read/write failure, or server
//! shutdown.

use std::net::{Shutdown, SocketAddr, TcpStream};

use parking_lot::Mutex;

use crate::error::Result;
use crate::packet::Packet;
use crate::protocol::StreamProtocol;

/// A single connected client
pub struct ClientConnection {
    /// Registry identity
    id: u64,

    /// Primary socket handle (shared file description with any reader clone)
    stream: TcpStream,

    /// Write-side framing state; the mutex serializes concurrent writers
    protocol: Mutex<Box<dyn StreamProtocol>>,

    /// Peer address captured at accept
    peer_addr: SocketAddr,

    /// Reverse-DNS name, when resolution is enabled and succeeded
    hostname: Option<String>,
}

impl ClientConnection {
    pub fn new(
        id: u64,
        stream: TcpStream,
        protocol: Box<dyn StreamProtocol>,
        peer_addr: SocketAddr,
        hostname: Option<String>,
    ) -> Self {
        Self {
            id,
            stream,
            protocol: Mutex::new(protocol),
            peer_addr,
            hostname,
        }
    }

    /// Registry identity
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Peer address
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Resolved hostname, if any
    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    /// Hostname when resolved, peer address otherwise; for log messages
    pub fn peer_label(&self) -> String {
        match &self.hostname {
            Some(host) => format!("{host} ({})", self.peer_addr),
            None => self.peer_addr.to_string(),
        }
    }

    /// Clone the socket handle for a dedicated reader thread
    pub fn try_clone_stream(&self) -> std::io::Result<TcpStream> {
        self.stream.try_clone()
    }

    /// Encode and send one packet to this client
    pub fn write_packet(&self, packet: &Packet) -> Result<()> {
        let mut protocol = self.protocol.lock();
        let mut sink = &self.stream;
        protocol.write_packet(&mut sink, packet)
    }

    /// Invoke the protocol's disconnect capability
    pub fn disconnect_protocol(&self) -> Result<()> {
        self.protocol.lock().disconnect()
    }

    /// Shut the socket down, unblocking any reader thread parked on it
    pub fn close(&self) {
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}
