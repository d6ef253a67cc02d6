//! Top-level realtime engine.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use classhub_core::config::RealtimeConfig;
use classhub_core::result::AppResult;
use classhub_entity::class::ClassRoster;
use classhub_entity::conversation::Conversation;
use classhub_service::{ConversationService, LiveRoomManager, RequestContext};

use crate::channel::registry::{ChannelRegistry, conversation_group};
use crate::connection::handle::{ConnectionHandle, ConnectionId};
use crate::connection::heartbeat::HeartbeatConfig;
use crate::connection::pool::ConnectionPool;
use crate::message::error::EventError;
use crate::message::types::ServerEvent;
use crate::message::validator::parse_frame;
use crate::metrics::{MetricsSnapshot, RealtimeMetrics};

/// Coordinates connections, groups, and event dispatch.
///
/// Events from one connection are handled in arrival order. No lock is
/// held across a store or cache call; group fan-out is the only
/// serialized section.
#[derive(Debug, Clone)]
pub struct RealtimeEngine {
    pub(crate) pool: Arc<ConnectionPool>,
    pub(crate) groups: Arc<ChannelRegistry>,
    pub(crate) metrics: Arc<RealtimeMetrics>,
    pub(crate) conversations: ConversationService,
    pub(crate) live: LiveRoomManager,
    config: RealtimeConfig,
}

impl RealtimeEngine {
    /// Creates a new engine over the given services.
    pub fn new(
        config: RealtimeConfig,
        conversations: ConversationService,
        live: LiveRoomManager,
    ) -> Self {
        info!("Realtime engine initialized");
        Self {
            pool: Arc::new(ConnectionPool::new()),
            groups: Arc::new(ChannelRegistry::new()),
            metrics: Arc::new(RealtimeMetrics::new()),
            conversations,
            live,
            config,
        }
    }

    /// Register an authenticated connection.
    ///
    /// Returns the handle and the receiver the socket writer drains.
    pub fn register(&self, ctx: RequestContext) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size.max(1));
        let handle = Arc::new(ConnectionHandle::new(ctx, tx));

        self.pool.add(Arc::clone(&handle));
        self.metrics.connection_opened();

        info!(
            conn_id = %handle.id,
            user_id = %handle.user_id(),
            "WebSocket connection registered"
        );
        (handle, rx)
    }

    /// Drop a connection from the pool and from every group.
    ///
    /// Completed mutations stay; live rooms are not left.
    pub fn unregister(&self, conn_id: &ConnectionId) {
        let Some(handle) = self.pool.remove(conn_id) else {
            return;
        };
        handle.mark_dead();
        let groups = self.groups.leave_all(*conn_id);
        self.metrics.connection_closed();

        info!(
            conn_id = %conn_id,
            user_id = %handle.user_id(),
            groups,
            "WebSocket connection unregistered"
        );
    }

    /// Handle one inbound text frame.
    ///
    /// Failures are reported to this connection only; the connection stays
    /// open.
    pub async fn handle_inbound(&self, conn_id: &ConnectionId, raw: &str) {
        let Some(handle) = self.pool.get(conn_id) else {
            warn!(conn_id = %conn_id, "Frame from unknown connection");
            return;
        };
        self.metrics.event_received();

        let event = match parse_frame(raw, self.config.max_message_bytes) {
            Ok(event) => event,
            Err(err) => {
                self.reply_error(&handle, err, None);
                return;
            }
        };

        let name = event.name();
        debug!(conn_id = %conn_id, event = name, "Inbound event");
        if let Err(err) = self.dispatch(&handle, event).await {
            self.reply_error(&handle, err, Some(name));
        }
    }

    /// Send an event to one connection.
    pub fn send(&self, handle: &ConnectionHandle, event: &ServerEvent) {
        let Some(frame) = self.encode(event) else {
            return;
        };
        if handle.send(frame) {
            self.metrics.frame_sent();
        }
    }

    /// Send an event to every member of a group accepted by `filter`.
    pub fn broadcast(
        &self,
        group: &str,
        event: &ServerEvent,
        filter: impl Fn(&ConnectionHandle) -> bool,
    ) {
        let Some(frame) = self.encode(event) else {
            return;
        };
        let sent = self.groups.broadcast(group, &frame, filter);
        self.metrics.frames_sent(sent as u64);
    }

    /// Replace a class's member set and drop connections whose user is no
    /// longer enrolled from the conversation's group.
    pub async fn sync_roster(&self, roster: &ClassRoster) -> AppResult<Conversation> {
        let conversation = self.conversations.sync_roster(roster).await?;
        self.evict_non_members(&conversation);
        Ok(conversation)
    }

    /// Remove connections of users outside `conversation`'s member set from
    /// its group. Each one is told with `conversation_left`. Returns how
    /// many were removed.
    pub fn evict_non_members(&self, conversation: &Conversation) -> usize {
        let group = conversation_group(conversation.id);
        let mut evicted = 0;
        for handle in self.groups.members(&group) {
            if handle.ctx.is_admin() || conversation.has_member(&handle.user_id()) {
                continue;
            }
            if self.groups.leave(&group, handle.id) {
                self.send(
                    &handle,
                    &ServerEvent::ConversationLeft {
                        conversation_id: conversation.id,
                    },
                );
                evicted += 1;
            }
        }
        if evicted > 0 {
            info!(
                conversation_id = %conversation.id,
                evicted,
                "Unenrolled connections removed from conversation group"
            );
        }
        evicted
    }

    /// Heartbeat settings for new connections.
    pub fn heartbeat_config(&self) -> HeartbeatConfig {
        HeartbeatConfig::from(&self.config)
    }

    /// Shared counters.
    pub fn metrics(&self) -> Arc<RealtimeMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Counter snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Number of open connections.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }

    /// Mark every connection dead and drop it.
    pub fn close_all(&self) {
        let all = self.pool.all_connections();
        for handle in &all {
            self.unregister(&handle.id);
        }
        info!(count = all.len(), "All connections closed");
    }

    fn reply_error(&self, handle: &ConnectionHandle, err: EventError, request: Option<&str>) {
        self.metrics.error_emitted();
        let event = ServerEvent::Error {
            code: err.code,
            message: err.message,
            request: request.map(str::to_string),
        };
        self.send(handle, &event);
    }

    fn encode(&self, event: &ServerEvent) -> Option<String> {
        match serde_json::to_string(event) {
            Ok(frame) => Some(frame),
            Err(e) => {
                error!(error = %e, "Failed to serialize server event");
                None
            }
        }
    }
}
