//! Configuration for streamhub
//!
//! Centralized configuration with sensible defaults. A `ServerConfig` is
//! immutable once built; reconfiguration requires constructing a new server.

use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

/// Access-control gate consulted once per accepted connection.
///
/// An external collaborator: the rule source and matching algorithm live
/// outside this crate. A `false` result closes the connection before it is
/// ever counted or registered.
pub trait AccessControl: Send + Sync {
    /// Decide whether a peer may connect.
    ///
    /// `hostname` is the reverse-DNS name when DNS resolution is enabled and
    /// succeeded for this peer.
    fn allow(&self, addr: IpAddr, hostname: Option<&str>) -> bool;
}

/// Reverse-DNS resolver collaborator, injected rather than implemented here.
pub type HostResolver = dyn Fn(IpAddr) -> Option<String> + Send + Sync;

/// Main configuration for a streamhub server instance
#[derive(Clone)]
pub struct ServerConfig {
    // -------------------------------------------------------------------------
    // Port Configuration
    // -------------------------------------------------------------------------
    /// Port clients connect to in order to receive broadcast packets.
    /// `None` disables the write role entirely.
    pub write_port: Option<u16>,

    /// Port clients connect to in order to send packets to the server.
    /// `None` disables the read role entirely.
    pub read_port: Option<u16>,

    /// Address the listeners bind to
    pub bind_addr: IpAddr,

    // -------------------------------------------------------------------------
    // Timeout Configuration
    // -------------------------------------------------------------------------
    /// Socket write timeout (`None` = OS default, unbounded)
    pub write_timeout: Option<Duration>,

    /// Per-attempt read timeout for client read loops (`None` = use an
    /// internal poll interval so shutdown stays bounded)
    pub read_timeout: Option<Duration>,

    // -------------------------------------------------------------------------
    // Framing Configuration
    // -------------------------------------------------------------------------
    /// Stream protocol name, resolved at server construction (e.g. "BURST")
    pub protocol_name: String,

    /// Arguments passed to the protocol factory (meaning is per-protocol)
    pub protocol_args: Vec<String>,

    // -------------------------------------------------------------------------
    // Access Configuration
    // -------------------------------------------------------------------------
    /// Resolve peer hostnames before the ACL check
    pub use_dns: bool,

    /// Optional access-control gate; `None` admits every peer
    pub acl: Option<Arc<dyn AccessControl>>,

    /// Reverse-DNS collaborator, consulted only when `use_dns` is set
    pub resolver: Option<Arc<HostResolver>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            write_port: None,
            read_port: None,
            bind_addr: IpAddr::from([127, 0, 0, 1]),
            write_timeout: Some(Duration::from_secs(10)),
            read_timeout: None,
            protocol_name: "BURST".to_string(),
            protocol_args: Vec::new(),
            use_dns: false,
            acl: None,
            resolver: None,
        }
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("write_port", &self.write_port)
            .field("read_port", &self.read_port)
            .field("bind_addr", &self.bind_addr)
            .field("write_timeout", &self.write_timeout)
            .field("read_timeout", &self.read_timeout)
            .field("protocol_name", &self.protocol_name)
            .field("protocol_args", &self.protocol_args)
            .field("use_dns", &self.use_dns)
            .field("acl", &self.acl.as_ref().map(|_| "<acl>"))
            .field("resolver", &self.resolver.as_ref().map(|_| "<resolver>"))
            .finish()
    }
}

impl ServerConfig {
    /// Create a new config builder
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// The distinct set of ports to bind, with their (read, write) roles.
    ///
    /// One bind when the ports are equal or only one is set; two when both
    /// are set and differ.
    pub fn bind_plan(&self) -> Vec<PortRoles> {
        match (self.write_port, self.read_port) {
            (Some(w), Some(r)) if w == r => vec![PortRoles {
                port: w,
                read: true,
                write: true,
            }],
            (Some(w), Some(r)) => vec![
                PortRoles {
                    port: w,
                    read: false,
                    write: true,
                },
                PortRoles {
                    port: r,
                    read: true,
                    write: false,
                },
            ],
            (Some(w), None) => vec![PortRoles {
                port: w,
                read: false,
                write: true,
            }],
            (None, Some(r)) => vec![PortRoles {
                port: r,
                read: true,
                write: false,
            }],
            (None, None) => Vec::new(),
        }
    }
}

/// One port to bind and the roles its listener serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRoles {
    /// Port number to bind (0 lets the OS assign one)
    pub port: u16,

    /// Accepted clients get a read aggregator feeding the read queue
    pub read: bool,

    /// Accepted clients receive broadcast packets
    pub write: bool,
}

/// Builder for ServerConfig
#[derive(Default)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    /// Set the write (broadcast) port
    pub fn write_port(mut self, port: impl Into<Option<u16>>) -> Self {
        self.config.write_port = port.into();
        self
    }

    /// Set the read (ingest) port
    pub fn read_port(mut self, port: impl Into<Option<u16>>) -> Self {
        self.config.read_port = port.into();
        self
    }

    /// Set the bind address for all listeners
    pub fn bind_addr(mut self, addr: IpAddr) -> Self {
        self.config.bind_addr = addr;
        self
    }

    /// Set the socket write timeout
    pub fn write_timeout(mut self, timeout: impl Into<Option<Duration>>) -> Self {
        self.config.write_timeout = timeout.into();
        self
    }

    /// Set the per-attempt read timeout
    pub fn read_timeout(mut self, timeout: impl Into<Option<Duration>>) -> Self {
        self.config.read_timeout = timeout.into();
        self
    }

    /// Set the stream protocol by name
    pub fn protocol(mut self, name: impl Into<String>) -> Self {
        self.config.protocol_name = name.into();
        self
    }

    /// Set the stream protocol arguments
    pub fn protocol_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.protocol_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Enable reverse-DNS resolution for accepted peers
    pub fn use_dns(mut self, use_dns: bool) -> Self {
        self.config.use_dns = use_dns;
        self
    }

    /// Install an access-control gate
    pub fn acl(mut self, acl: Arc<dyn AccessControl>) -> Self {
        self.config.acl = Some(acl);
        self
    }

    /// Install a reverse-DNS resolver collaborator
    pub fn resolver(mut self, resolver: Arc<HostResolver>) -> Self {
        self.config.resolver = Some(resolver);
        self
    }

    pub fn build(self) -> ServerConfig {
        self.config
    }
}
