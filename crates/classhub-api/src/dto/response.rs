//! Response DTOs.

use serde::{Deserialize, Serialize};

use classhub_core::types::{ClassId, ConversationId};
use classhub_realtime::MetricsSnapshot;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Result of a roster sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterResponse {
    pub conversation_id: ConversationId,
    pub class_id: ClassId,
    pub member_count: usize,
}

/// `GET /api/health` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub database: String,
    pub cache: String,
    pub realtime: MetricsSnapshot,
}
