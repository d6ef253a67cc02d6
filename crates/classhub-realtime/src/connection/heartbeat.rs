//! Ping/pong heartbeat for WebSocket keepalive.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time;
use tracing::{debug, warn};

use classhub_core::config::RealtimeConfig;

use super::handle::ConnectionHandle;
use crate::message::types::ServerEvent;
use crate::metrics::RealtimeMetrics;

/// Heartbeat configuration.
#[derive(Debug, Clone)]
pub struct HeartbeatConfig {
    /// Interval between pings.
    pub ping_interval: Duration,
    /// Grace period after a ping before the connection counts as dead.
    pub ping_timeout: Duration,
}

impl From<&RealtimeConfig> for HeartbeatConfig {
    fn from(config: &RealtimeConfig) -> Self {
        Self {
            ping_interval: Duration::from_secs(config.ping_interval_seconds.max(1)),
            ping_timeout: Duration::from_secs(config.ping_timeout_seconds),
        }
    }
}

/// Run the heartbeat loop for a connection.
///
/// Sends a `ping` event every interval. Returns once the connection has
/// gone `ping_interval + ping_timeout` without a pong, or is otherwise
/// dead; the caller then closes the socket.
pub async fn run_heartbeat(
    handle: Arc<ConnectionHandle>,
    config: HeartbeatConfig,
    metrics: Arc<RealtimeMetrics>,
) {
    let mut interval = time::interval(config.ping_interval);
    // The first tick completes immediately.
    interval.tick().await;
    let deadline = config.ping_interval + config.ping_timeout;

    loop {
        interval.tick().await;

        if !handle.is_alive() {
            break;
        }

        let since_pong = handle.since_last_pong().await;
        if since_pong > deadline {
            warn!(conn_id = %handle.id, ?since_pong, "Heartbeat timeout");
            handle.mark_dead();
            break;
        }

        let ping = ServerEvent::Ping {
            timestamp: Utc::now().timestamp_millis(),
        };
        let Ok(frame) = serde_json::to_string(&ping) else {
            continue;
        };
        if handle.send(frame) {
            metrics.frame_sent();
        } else if !handle.is_alive() {
            break;
        }
    }

    debug!(conn_id = %handle.id, "Heartbeat loop ended");
}

#[cfg(test)]
mod tests {
    use super::*;
    use classhub_core::types::UserId;
    use classhub_entity::user::UserRole;
    use classhub_service::RequestContext;
    use tokio::sync::mpsc;

    fn connection() -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(16);
        let ctx = RequestContext::new(UserId::new(), UserRole::Student, "Alice");
        (Arc::new(ConnectionHandle::new(ctx, tx)), rx)
    }

    fn config() -> HeartbeatConfig {
        HeartbeatConfig {
            ping_interval: Duration::from_secs(10),
            ping_timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_connection_times_out() {
        let (handle, mut rx) = connection();
        let task = tokio::spawn(run_heartbeat(
            Arc::clone(&handle),
            config(),
            Arc::new(RealtimeMetrics::new()),
        ));

        let frame = rx.recv().await.unwrap();
        assert!(frame.contains(r#""type":"ping""#));

        task.await.unwrap();
        assert!(!handle.is_alive());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pongs_keep_connection_alive() {
        let (handle, mut rx) = connection();
        let task = tokio::spawn(run_heartbeat(
            Arc::clone(&handle),
            config(),
            Arc::new(RealtimeMetrics::new()),
        ));

        for _ in 0..5 {
            rx.recv().await.unwrap();
            handle.record_pong().await;
        }
        assert!(handle.is_alive());

        handle.mark_dead();
        task.await.unwrap();
    }
}
