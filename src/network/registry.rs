//! Client registry
//!
//! Thread-safe set of connected clients. Carries its own lock so accept,
//! decode, and broadcast never contend on unrelated state.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::warn;

use super::connection::ClientConnection;

/// Thread-safe set of connected clients keyed by connection identity
pub struct ClientRegistry {
    clients: RwLock<HashMap<u64, Arc<ClientConnection>>>,
    next_id: AtomicU64,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self {
            clients: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Reserve the next connection identity
    pub fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Register a client
    pub fn add(&self, client: Arc<ClientConnection>) {
        self.clients.write().insert(client.id(), client);
    }

    /// Remove a client, invoking its protocol disconnect and closing its
    /// socket. A disconnect failure is logged; removal still completes.
    pub fn remove(&self, id: u64) -> Option<Arc<ClientConnection>> {
        let client = self.clients.write().remove(&id)?;
        Self::teardown(&client);
        Some(client)
    }

    /// Remove every client (server shutdown path)
    pub fn clear(&self) {
        let drained: Vec<_> = self.clients.write().drain().map(|(_, c)| c).collect();
        for client in &drained {
            Self::teardown(client);
        }
    }

    /// Stable snapshot for broadcast fan-out, ordered by connection identity
    pub fn snapshot(&self) -> Vec<Arc<ClientConnection>> {
        let mut clients: Vec<_> = self.clients.read().values().cloned().collect();
        clients.sort_by_key(|c| c.id());
        clients
    }

    /// Number of registered clients
    pub fn len(&self) -> usize {
        self.clients.read().len()
    }

    /// True when no clients are registered
    pub fn is_empty(&self) -> bool {
        self.clients.read().is_empty()
    }

    fn teardown(client: &ClientConnection) {
        if let Err(e) = client.disconnect_protocol() {
            warn!(
                "Stream protocol disconnect failed for {}: {}",
                client.peer_label(),
                e
            );
        }
        client.close();
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}
