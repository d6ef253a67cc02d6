//! Shared application state passed to all handlers.

use std::sync::Arc;
use std::time::Instant;

use classhub_auth::JwtDecoder;
use classhub_cache::CacheManager;
use classhub_core::config::AppConfig;
use classhub_database::ChatStore;
use classhub_realtime::RealtimeEngine;
use classhub_service::{ConversationService, LiveRoomManager};

/// Application state shared across all handlers via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    // -- Configuration ---------------------------------------------------
    /// Application configuration.
    pub config: Arc<AppConfig>,

    // -- Auth ------------------------------------------------------------
    /// Access token verifier.
    pub jwt_decoder: Arc<JwtDecoder>,

    // -- Services --------------------------------------------------------
    /// Conversation operations (roster sync).
    pub conversations: ConversationService,
    /// Live room lifecycle and teacher presence.
    pub live: LiveRoomManager,

    // -- Realtime --------------------------------------------------------
    /// WebSocket messaging engine.
    pub realtime: RealtimeEngine,

    // -- Health ----------------------------------------------------------
    /// Conversation store, probed by the health endpoint.
    pub store: Arc<dyn ChatStore>,
    /// Cache, probed by the health endpoint.
    pub cache: Arc<CacheManager>,
    /// Process start, for uptime reporting.
    pub started_at: Instant,
}
