//! Individual WebSocket connection handle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, mpsc};
use tokio::time::Instant;
use uuid::Uuid;

use classhub_core::types::UserId;
use classhub_service::RequestContext;

/// Unique connection identifier.
pub type ConnectionId = Uuid;

/// A handle to a single WebSocket connection.
///
/// Holds the sender for pushing serialized frames to the client plus the
/// authenticated caller the connection acts as.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// Authenticated caller; every event on this connection acts as them.
    pub ctx: RequestContext,
    /// Outbound frame queue drained by the socket writer.
    sender: mpsc::Sender<String>,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
    /// Last pong received.
    last_pong: RwLock<Instant>,
    /// Whether the connection is still alive.
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a new connection handle.
    pub fn new(ctx: RequestContext, sender: mpsc::Sender<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            ctx,
            sender,
            connected_at: now,
            last_pong: RwLock::new(Instant::now()),
            alive: AtomicBool::new(true),
        }
    }

    /// The connected user.
    pub fn user_id(&self) -> UserId {
        self.ctx.user_id
    }

    /// Queue a frame without waiting. A full queue drops the frame; a
    /// closed one marks the connection dead.
    pub fn send(&self, frame: String) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(frame) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(conn_id = %self.id, "Send buffer full, dropping frame");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                false
            }
        }
    }

    /// Check if the connection is alive.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark the connection as dead.
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Record a pong response.
    pub async fn record_pong(&self) {
        *self.last_pong.write().await = Instant::now();
    }

    /// Time since the last pong (or since connecting).
    pub async fn since_last_pong(&self) -> Duration {
        self.last_pong.read().await.elapsed()
    }

    /// Snapshot of connection info.
    pub fn info(&self) -> ConnectionInfo {
        ConnectionInfo {
            id: self.id,
            user_id: self.ctx.user_id,
            display_name: self.ctx.display_name.clone(),
            connected_at: self.connected_at,
            alive: self.is_alive(),
        }
    }
}

/// Serializable snapshot of a connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub id: ConnectionId,
    pub user_id: UserId,
    pub display_name: String,
    pub connected_at: DateTime<Utc>,
    pub alive: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use classhub_entity::user::UserRole;

    fn handle(buffer: usize) -> (ConnectionHandle, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(buffer);
        let ctx = RequestContext::new(UserId::new(), UserRole::Student, "Alice");
        (ConnectionHandle::new(ctx, tx), rx)
    }

    #[tokio::test]
    async fn test_send_queues_frame() {
        let (handle, mut rx) = handle(4);
        assert!(handle.send("hello".into()));
        assert_eq!(rx.recv().await.as_deref(), Some("hello"));
    }

    #[test]
    fn test_full_buffer_drops_frame() {
        let (handle, _rx) = handle(1);
        assert!(handle.send("a".into()));
        assert!(!handle.send("b".into()));
        assert!(handle.is_alive());
    }

    #[test]
    fn test_closed_receiver_marks_dead() {
        let (handle, rx) = handle(1);
        drop(rx);
        assert!(!handle.send("a".into()));
        assert!(!handle.is_alive());
    }
}
