//! Registry of live subscriber connections.

use crate::error::DeliveryError;
use crate::handle::{Outbound, SubscriberHandle};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Identifier assigned to a connection at registration.
pub type ConnectionId = Uuid;

/// One registered subscriber.
pub struct Connection {
    id: ConnectionId,
    alive: AtomicBool,
    handle: Arc<dyn SubscriberHandle>,
}

impl Connection {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Whether the subscriber has answered since the last probe was sent.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    pub(crate) fn mark_alive(&self) {
        self.alive.store(true, Ordering::Release);
    }

    /// Clears the liveness flag, returning whether it was set.
    pub(crate) fn take_alive(&self) -> bool {
        self.alive.swap(false, Ordering::AcqRel)
    }

    pub(crate) fn try_send(&self, frame: Outbound) -> Result<(), DeliveryError> {
        self.handle.try_send(frame)
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("alive", &self.is_alive())
            .finish_non_exhaustive()
    }
}

type ConnectionMap = HashMap<ConnectionId, Arc<Connection>>;

/// Owns the set of live connections.
///
/// Membership changes take the write lock one at a time. Fan-out never
/// iterates the live map: callers work on a [`snapshot`](Self::snapshot)
/// taken under a short read lock, so slow or failing sends never hold up
/// registration or eviction.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    connections: Arc<RwLock<ConnectionMap>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subscriber and returns its id. New connections start alive.
    pub async fn register(&self, handle: Arc<dyn SubscriberHandle>) -> ConnectionId {
        let id = Uuid::new_v4();
        let connection = Arc::new(Connection {
            id,
            alive: AtomicBool::new(true),
            handle,
        });

        let total = {
            let mut connections = self.connections.write().await;
            connections.insert(id, connection);
            connections.len()
        };
        tracing::debug!(connection_id = %id, total, "registered subscriber");
        id
    }

    /// Removes a subscriber. Returns `false` if it was already gone.
    ///
    /// Dropping the registry's handle is what closes the subscriber's
    /// outbound queue once in-flight snapshots are released.
    pub async fn unregister(&self, id: ConnectionId) -> bool {
        let removed = self.connections.write().await.remove(&id).is_some();
        if removed {
            tracing::debug!(connection_id = %id, "unregistered subscriber");
        }
        removed
    }

    /// Point-in-time copy of the live connections.
    pub async fn snapshot(&self) -> Vec<Arc<Connection>> {
        self.connections.read().await.values().cloned().collect()
    }

    /// Applies `f` to every connection in a snapshot.
    ///
    /// `f` may trigger registration or eviction; those changes apply to the
    /// registry, not to the snapshot being iterated.
    pub async fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&Arc<Connection>),
    {
        for connection in self.snapshot().await {
            f(&connection);
        }
    }

    /// Records a probe response. Returns `false` for unknown connections.
    pub async fn mark_alive(&self, id: ConnectionId) -> bool {
        match self.connections.read().await.get(&id) {
            Some(connection) => {
                connection.mark_alive();
                true
            }
            None => false,
        }
    }

    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.connections.read().await.contains_key(&id)
    }

    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }
}
