//! Connection pool with per-connection in-flight load counters

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// One backend connection plus the number of requests currently using it
pub struct ConnectionHandle<C> {
    index: usize,
    client: C,
    load: AtomicUsize,
}

impl<C> ConnectionHandle<C> {
    pub fn new(index: usize, client: C) -> Self {
        Self {
            index,
            client,
            load: AtomicUsize::new(0),
        }
    }

    /// Position of this connection in the pool
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Current number of in-flight requests
    pub fn load(&self) -> usize {
        self.load.load(Ordering::Relaxed)
    }

    /// Count one more in-flight request until the returned guard is dropped
    pub fn acquire(self: &Arc<Self>) -> LoadGuard<C> {
        self.load.fetch_add(1, Ordering::Relaxed);
        LoadGuard {
            connection: Arc::clone(self),
        }
    }
}

/// Keeps a connection's load counter raised while alive
pub struct LoadGuard<C> {
    connection: Arc<ConnectionHandle<C>>,
}

impl<C> LoadGuard<C> {
    pub fn connection(&self) -> &Arc<ConnectionHandle<C>> {
        &self.connection
    }
}

impl<C> Drop for LoadGuard<C> {
    fn drop(&mut self) {
        self.connection.load.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Ordered set of equivalent backend connections
pub struct ClientPool<C> {
    connections: Vec<Arc<ConnectionHandle<C>>>,
}

impl<C> ClientPool<C> {
    /// Build a pool, numbering connections in the given order
    pub fn new(clients: impl IntoIterator<Item = C>) -> Self {
        let connections = clients
            .into_iter()
            .enumerate()
            .map(|(index, client)| Arc::new(ConnectionHandle::new(index, client)))
            .collect();
        Self { connections }
    }

    pub fn connections(&self) -> &[Arc<ConnectionHandle<C>>] {
        &self.connections
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Snapshot of `(index, load)` for every connection, in pool order
    pub fn loads(&self) -> Vec<(usize, usize)> {
        self.connections
            .iter()
            .map(|c| (c.index(), c.load()))
            .collect()
    }
}
