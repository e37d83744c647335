//! Write broadcaster
//!
//! The single shared loop draining the write queue and fanning each packet
//! out to every client in a stable registry snapshot. Per-client write
//! failures are isolated: the client is removed and delivery continues to
//! the rest. Anything escaping that isolation terminates the loop.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::error::Result;
use crate::packet::Packet;

use super::server::{ServerShared, WriteHook};

/// Broadcast-loop entry point. Exits cleanly when the write queue is closed
/// by `disconnect()`.
pub(crate) fn run(shared: Arc<ServerShared>, hook: Option<Arc<WriteHook>>) {
    while let Some(packet) = shared.write_queue.pop() {
        if let Err(e) = broadcast_one(&shared, hook.as_deref(), &packet) {
            error!("Tcpip server write thread unexpectedly died: {e}");
            return;
        }
    }
    debug!("Write broadcaster stopped");
}

/// Deliver one packet to every client in the fan-out snapshot.
///
/// Clients registered after the snapshot do not receive this packet. The
/// hook runs before fan-out, outside per-client isolation, so its error
/// propagates to the loop boundary.
fn broadcast_one(
    shared: &ServerShared,
    hook: Option<&WriteHook>,
    packet: &Packet,
) -> Result<()> {
    if let Some(hook) = hook {
        hook(packet)?;
    }

    for client in shared.registry.snapshot() {
        if shared.stop.load(Ordering::SeqCst) {
            break;
        }
        if let Err(e) = client.write_packet(packet) {
            warn!(
                "Tcpip server lost write connection to {}: {e}",
                client.peer_label()
            );
            shared.registry.remove(client.id());
        }
    }

    Ok(())
}
