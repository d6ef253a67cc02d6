//! Connection pool: all active connections indexed by id and by user.

use std::sync::Arc;

use dashmap::DashMap;

use classhub_core::types::UserId;

use super::handle::{ConnectionHandle, ConnectionId};

/// Thread-safe pool of all active WebSocket connections.
#[derive(Debug, Default)]
pub struct ConnectionPool {
    /// User ID → connections (one user may have several tabs open).
    by_user: DashMap<UserId, Vec<Arc<ConnectionHandle>>>,
    /// Connection ID → handle.
    by_id: DashMap<ConnectionId, Arc<ConnectionHandle>>,
}

impl ConnectionPool {
    /// Creates a new empty connection pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to the pool.
    pub fn add(&self, handle: Arc<ConnectionHandle>) {
        self.by_id.insert(handle.id, Arc::clone(&handle));
        self.by_user.entry(handle.user_id()).or_default().push(handle);
    }

    /// Removes a connection from the pool.
    pub fn remove(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        let (_, handle) = self.by_id.remove(conn_id)?;
        let user_id = handle.user_id();
        if let Some(mut connections) = self.by_user.get_mut(&user_id) {
            connections.retain(|c| c.id != *conn_id);
            if connections.is_empty() {
                drop(connections);
                self.by_user.remove_if(&user_id, |_, v| v.is_empty());
            }
        }
        Some(handle)
    }

    /// Gets a specific connection by ID.
    pub fn get(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.by_id.get(conn_id).map(|entry| Arc::clone(entry.value()))
    }

    /// Gets all connections of a user.
    pub fn user_connections(&self, user_id: &UserId) -> Vec<Arc<ConnectionHandle>> {
        self.by_user
            .get(user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Returns all connection handles.
    pub fn all_connections(&self) -> Vec<Arc<ConnectionHandle>> {
        self.by_id
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Total number of active connections.
    pub fn connection_count(&self) -> usize {
        self.by_id.len()
    }

    /// Number of distinct connected users.
    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classhub_entity::user::UserRole;
    use classhub_service::RequestContext;
    use tokio::sync::mpsc;

    fn handle(user_id: UserId) -> Arc<ConnectionHandle> {
        let (tx, _rx) = mpsc::channel(1);
        let ctx = RequestContext::new(user_id, UserRole::Student, "Alice");
        Arc::new(ConnectionHandle::new(ctx, tx))
    }

    #[test]
    fn test_tracks_multiple_connections_per_user() {
        let pool = ConnectionPool::new();
        let user = UserId::new();
        let a = handle(user);
        let b = handle(user);
        pool.add(Arc::clone(&a));
        pool.add(Arc::clone(&b));
        assert_eq!(pool.connection_count(), 2);
        assert_eq!(pool.user_count(), 1);

        pool.remove(&a.id);
        assert_eq!(pool.user_connections(&user).len(), 1);
        pool.remove(&b.id);
        assert_eq!(pool.user_count(), 0);
        assert!(pool.remove(&b.id).is_none());
    }
}
