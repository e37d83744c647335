//! Read aggregator
//!
//! One background loop per read-capable client, feeding decoded packets into
//! the shared read queue. FIFO within one client's stream; no ordering
//! guarantee across clients. A dead client is never retried.

use std::net::TcpStream;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::error::HubError;
use crate::protocol::StreamProtocol;

use super::connection::ClientConnection;
use super::server::ServerShared;

/// Read-loop entry point for one client. Owns its own protocol instance so
/// decode state never contends with the broadcast write path.
pub(crate) fn run(
    client: Arc<ClientConnection>,
    mut stream: TcpStream,
    mut protocol: Box<dyn StreamProtocol>,
    shared: Arc<ServerShared>,
) {
    loop {
        match protocol.read_packet(&mut stream) {
            Ok(packet) => {
                shared.read_queue.push(packet);
                if shared.stop.load(Ordering::SeqCst) {
                    break;
                }
            }
            Err(HubError::Timeout) => {
                // No complete packet this interval; keep polling unless the
                // server is shutting down.
                if shared.stop.load(Ordering::SeqCst) {
                    break;
                }
            }
            Err(HubError::Disconnected) => {
                // Orderly disconnect: remove quietly. During server shutdown
                // the registry is already cleared.
                if !shared.stop.load(Ordering::SeqCst) {
                    shared.registry.remove(client.id());
                    debug!("Client {} disconnected", client.peer_label());
                }
                break;
            }
            Err(e) => {
                if shared.stop.load(Ordering::SeqCst) {
                    break;
                }
                error!(
                    "Tcpip server read thread unexpectedly died for client {}: {e}",
                    client.peer_label()
                );
                // Removal attempts the protocol disconnect and logs its
                // failure separately.
                shared.registry.remove(client.id());
                break;
            }
        }
    }

    if let Err(e) = protocol.disconnect() {
        warn!(
            "Stream protocol disconnect failed for {}: {e}",
            client.peer_label()
        );
    }
}
