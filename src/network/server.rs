//! Server supervisor
//!
//! Owns configuration, lifecycle (connect/disconnect), and the public
//! accessors. All shared mutable state lives in the client registry and the
//! two packet queues, each with its own lock; no single global lock
//! serializes the server.

use std::net::{SocketAddr, TcpListener};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::error::{HubError, Result};
use crate::packet::Packet;
use crate::protocol::ProtocolKind;
use crate::queue::PacketQueue;

use super::broadcaster;
use super::listener;
use super::registry::ClientRegistry;

/// Hook invoked per outgoing packet immediately before broadcast fan-out.
///
/// Intended for instrumentation or fault injection; an error escapes the
/// per-client isolation boundary and terminates the write broadcaster.
pub type WriteHook = dyn Fn(&Packet) -> Result<()> + Send + Sync;

/// State shared between the supervisor and its background threads
pub(crate) struct ServerShared {
    pub config: ServerConfig,
    pub protocol: ProtocolKind,
    pub registry: ClientRegistry,
    pub read_queue: PacketQueue,
    pub write_queue: PacketQueue,

    /// Sole cancellation signal for every background loop
    pub stop: AtomicBool,

    /// Listener loops still running; drives `connected()` once all die
    pub live_listeners: AtomicUsize,

    /// Handles of every spawned background thread, joined at disconnect
    pub threads: Mutex<Vec<JoinHandle<()>>>,
}

/// Concurrent TCP packet server
///
/// Accepts clients on up to two ports, feeds packets decoded from
/// read-capable clients into a FIFO read queue, and broadcasts every packet
/// submitted through [`TcpServer::write`] to all connected clients.
pub struct TcpServer {
    shared: Arc<ServerShared>,

    /// True between a successful `connect()` and the next `disconnect()`
    connected: AtomicBool,

    /// Listener count of the current connect cycle
    listeners_total: AtomicUsize,

    /// Serializes connect/disconnect transitions
    lifecycle: Mutex<()>,

    write_hook: Mutex<Option<Arc<WriteHook>>>,

    local_write_addr: Mutex<Option<SocketAddr>>,
    local_read_addr: Mutex<Option<SocketAddr>>,
}

impl TcpServer {
    /// Create a server from a configuration.
    ///
    /// Resolves the stream protocol name immediately; an unresolvable name or
    /// invalid protocol arguments fail here with `HubError::Config`, before
    /// any socket is touched.
    pub fn new(config: ServerConfig) -> Result<Self> {
        let protocol = ProtocolKind::resolve(&config.protocol_name, &config.protocol_args)?;

        Ok(Self {
            shared: Arc::new(ServerShared {
                config,
                protocol,
                registry: ClientRegistry::new(),
                read_queue: PacketQueue::new(),
                write_queue: PacketQueue::new(),
                stop: AtomicBool::new(false),
                live_listeners: AtomicUsize::new(0),
                threads: Mutex::new(Vec::new()),
            }),
            connected: AtomicBool::new(false),
            listeners_total: AtomicUsize::new(0),
            lifecycle: Mutex::new(()),
            write_hook: Mutex::new(None),
            local_write_addr: Mutex::new(None),
            local_read_addr: Mutex::new(None),
        })
    }

    /// Install the per-packet write hook. Takes effect at the next `connect`.
    pub fn set_write_hook(&self, hook: Arc<WriteHook>) {
        *self.write_hook.lock() = Some(hook);
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Bind the configured ports and spawn all background loops.
    ///
    /// Fails with `HubError::Bind` when already connected or when a port
    /// cannot be bound; binding failures surface synchronously, before any
    /// thread is spawned.
    pub fn connect(&self) -> Result<()> {
        let _lifecycle = self.lifecycle.lock();

        if self.connected.load(Ordering::SeqCst) {
            return Err(HubError::Bind("server already connected".to_string()));
        }

        let config = &self.shared.config;
        let plan = config.bind_plan();

        // Bind everything before spawning anything so a port collision
        // surfaces to the caller with no threads started.
        let mut bound = Vec::with_capacity(plan.len());
        for roles in plan {
            let tcp_listener =
                TcpListener::bind((config.bind_addr, roles.port)).map_err(|e| {
                    HubError::Bind(format!("error binding to port {}: {e}", roles.port))
                })?;
            tcp_listener.set_nonblocking(true).map_err(|e| {
                HubError::Bind(format!("error preparing listener on port {}: {e}", roles.port))
            })?;
            bound.push((tcp_listener, roles));
        }

        for (tcp_listener, roles) in &bound {
            let addr = tcp_listener.local_addr()?;
            if roles.write {
                *self.local_write_addr.lock() = Some(addr);
            }
            if roles.read {
                *self.local_read_addr.lock() = Some(addr);
            }
        }

        self.shared.stop.store(false, Ordering::SeqCst);
        if config.read_port.is_some() {
            self.shared.read_queue.reopen();
        }
        if config.write_port.is_some() {
            self.shared.write_queue.reopen();
        }

        self.listeners_total.store(bound.len(), Ordering::SeqCst);
        self.shared.live_listeners.store(bound.len(), Ordering::SeqCst);

        let mut threads = self.shared.threads.lock();

        for (tcp_listener, roles) in bound {
            let shared = Arc::clone(&self.shared);
            let handle = std::thread::Builder::new()
                .name(format!("streamhub-listen-{}", roles.port))
                .spawn(move || listener::run(tcp_listener, roles, shared))?;
            threads.push(handle);
        }

        if config.write_port.is_some() {
            let shared = Arc::clone(&self.shared);
            let hook = self.write_hook.lock().clone();
            let handle = std::thread::Builder::new()
                .name("streamhub-broadcast".to_string())
                .spawn(move || broadcaster::run(shared, hook))?;
            threads.push(handle);
        }

        self.connected.store(true, Ordering::SeqCst);
        info!(
            "Server connected (write port {:?}, read port {:?}, protocol {})",
            config.write_port, config.read_port, config.protocol_name
        );
        Ok(())
    }

    /// Stop every background loop, remove every client, and drain both
    /// queues. Idempotent and safe to call from any state; completes in
    /// bounded time.
    pub fn disconnect(&self) {
        let _lifecycle = self.lifecycle.lock();

        self.shared.stop.store(true, Ordering::SeqCst);

        // Wake the broadcaster and any blocked read() callers
        self.shared.read_queue.close();
        self.shared.write_queue.close();

        // Socket shutdown unblocks every reader thread
        self.shared.registry.clear();

        let handles: Vec<JoinHandle<()>> = {
            let mut threads = self.shared.threads.lock();
            threads.drain(..).collect()
        };
        for handle in handles {
            let _ = handle.join();
        }

        self.shared.read_queue.clear();
        self.shared.write_queue.clear();
        *self.local_write_addr.lock() = None;
        *self.local_read_addr.lock() = None;
        self.listeners_total.store(0, Ordering::SeqCst);

        if self.connected.swap(false, Ordering::SeqCst) {
            debug!("Server disconnected");
        }
    }

    /// True once `connect` has bound its ports; false after `disconnect` or
    /// once every listener loop has exited.
    pub fn connected(&self) -> bool {
        if !self.connected.load(Ordering::SeqCst) {
            return false;
        }
        let total = self.listeners_total.load(Ordering::SeqCst);
        total == 0 || self.shared.live_listeners.load(Ordering::SeqCst) > 0
    }

    // =========================================================================
    // Data Path
    // =========================================================================

    /// Dequeue the oldest packet received from any read-capable client.
    ///
    /// Returns `None` immediately when no read port is configured or the
    /// server is not connected. Otherwise blocks (cooperative wait) until a
    /// packet arrives or `disconnect()` wakes the caller with `None`.
    pub fn read(&self) -> Option<Packet> {
        if self.shared.config.read_port.is_none() {
            return None;
        }
        self.shared.read_queue.pop()
    }

    /// Submit a packet for broadcast to every connected client.
    ///
    /// A no-op when no write port is configured. Never blocks on delivery.
    pub fn write(&self, packet: Packet) {
        if self.shared.config.write_port.is_none() {
            return;
        }
        self.shared.write_queue.push(packet);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Number of currently connected clients
    pub fn num_clients(&self) -> usize {
        self.shared.registry.len()
    }

    /// Packets waiting in the read queue
    pub fn read_queue_size(&self) -> usize {
        self.shared.read_queue.len()
    }

    /// Packets waiting in the write queue
    pub fn write_queue_size(&self) -> usize {
        self.shared.write_queue.len()
    }

    /// Actual bound address serving the write role, while connected
    pub fn local_write_addr(&self) -> Option<SocketAddr> {
        *self.local_write_addr.lock()
    }

    /// Actual bound address serving the read role, while connected
    pub fn local_read_addr(&self) -> Option<SocketAddr> {
        *self.local_read_addr.lock()
    }

    /// Live background threads (listeners + client readers + broadcaster)
    pub fn background_thread_count(&self) -> usize {
        self.shared
            .threads
            .lock()
            .iter()
            .filter(|h| !h.is_finished())
            .count()
    }

    /// The server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.shared.config
    }
}

impl Drop for TcpServer {
    fn drop(&mut self) {
        self.disconnect();
    }
}
