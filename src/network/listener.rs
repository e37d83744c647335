//! Listener loop
//!
//! One background accept loop per bound port. The listener socket runs
//! non-blocking and polls a stop flag, so `disconnect()` never waits on a
//! parked accept. Each accepted connection is gated through DNS resolution
//! and the ACL before it is registered.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::PortRoles;
use crate::error::Result;

use super::connection::ClientConnection;
use super::reader;
use super::server::ServerShared;

/// Poll interval while waiting for connections or the stop flag
const ACCEPT_POLL: Duration = Duration::from_millis(50);

/// Read-loop poll timeout applied when no read timeout is configured, so a
/// reader never holds its protocol lock unboundedly and shutdown stays
/// bounded.
const DEFAULT_READ_POLL: Duration = Duration::from_millis(250);

/// Accept loop entry point. Exits cleanly on the stop flag; any error
/// escaping the accept body is logged as an unexpected listener death.
pub(crate) fn run(tcp_listener: TcpListener, roles: PortRoles, shared: Arc<ServerShared>) {
    let port = roles.port;
    match accept_loop(&tcp_listener, roles, &shared) {
        Ok(()) => debug!("Listener on port {port} stopped"),
        Err(e) => error!("Tcpip server listen thread unexpectedly died: {e}"),
    }
    shared.live_listeners.fetch_sub(1, Ordering::SeqCst);
}

fn accept_loop(
    tcp_listener: &TcpListener,
    roles: PortRoles,
    shared: &Arc<ServerShared>,
) -> Result<()> {
    while !shared.stop.load(Ordering::SeqCst) {
        match tcp_listener.accept() {
            Ok((stream, peer_addr)) => handle_accept(stream, peer_addr, roles, shared)?,
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(ACCEPT_POLL);
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Gate, register, and (for read-role listeners) start reading one accepted
/// connection.
fn handle_accept(
    stream: TcpStream,
    peer_addr: SocketAddr,
    roles: PortRoles,
    shared: &Arc<ServerShared>,
) -> Result<()> {
    let config = &shared.config;

    // The accepted socket must block; only the listener polls.
    stream.set_nonblocking(false)?;

    let hostname = if config.use_dns {
        config
            .resolver
            .as_ref()
            .and_then(|resolve| resolve(peer_addr.ip()))
    } else {
        None
    };

    if let Some(acl) = &config.acl {
        if !acl.allow(peer_addr.ip(), hostname.as_deref()) {
            // Dropping the stream closes it; the peer observes end-of-stream.
            warn!("Tcpip server rejected connection from {peer_addr}");
            return Ok(());
        }
    }

    stream.set_nodelay(true)?;
    if let Some(timeout) = config.write_timeout {
        stream.set_write_timeout(Some(timeout))?;
    }

    let id = shared.registry.next_id();
    let client = Arc::new(ClientConnection::new(
        id,
        stream,
        shared.protocol.instantiate(),
        peer_addr,
        hostname,
    ));
    shared.registry.add(Arc::clone(&client));
    info!(
        "Client connected from {} ({} clients)",
        client.peer_label(),
        shared.registry.len()
    );

    if roles.read {
        if let Err(e) = spawn_reader(&client, shared) {
            shared.registry.remove(id);
            return Err(e);
        }
    }

    // Shutdown race: disconnect() may have cleared the registry while this
    // client was being registered.
    if shared.stop.load(Ordering::SeqCst) {
        shared.registry.remove(id);
    }

    Ok(())
}

fn spawn_reader(client: &Arc<ClientConnection>, shared: &Arc<ServerShared>) -> Result<()> {
    let read_stream = client.try_clone_stream()?;
    let timeout = shared.config.read_timeout.unwrap_or(DEFAULT_READ_POLL);
    read_stream.set_read_timeout(Some(timeout))?;

    // The reader decodes through its own protocol instance so the broadcast
    // write path never waits on an in-flight read.
    let read_protocol = shared.protocol.instantiate();

    let client = Arc::clone(client);
    let reader_shared = Arc::clone(shared);
    let handle = std::thread::Builder::new()
        .name(format!("streamhub-read-{}", client.id()))
        .spawn(move || reader::run(client, read_stream, read_protocol, reader_shared))?;
    shared.threads.lock().push(handle);
    Ok(())
}
