//! Read marker repository.

use sqlx::PgPool;

use classhub_core::error::{AppError, ErrorKind};
use classhub_core::result::AppResult;
use classhub_core::types::{ConversationId, MessageId, UserId};
use classhub_entity::read_marker::ReadMarker;

/// Repository for per-user read positions.
#[derive(Debug, Clone)]
pub struct ReadMarkerRepository {
    pool: PgPool,
}

impl ReadMarkerRepository {
    /// Create a new read marker repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create or overwrite a marker in one statement.
    pub async fn upsert(
        &self,
        conversation_id: ConversationId,
        user_id: UserId,
        message_id: MessageId,
    ) -> AppResult<ReadMarker> {
        sqlx::query_as::<_, ReadMarker>(
            "INSERT INTO read_markers (conversation_id, user_id, message_id) VALUES ($1, $2, $3) \
             ON CONFLICT (conversation_id, user_id) DO UPDATE \
             SET message_id = EXCLUDED.message_id, read_at = NOW() RETURNING *",
        )
        .bind(conversation_id)
        .bind(user_id)
        .bind(message_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to upsert read marker", e))
    }

    /// All markers of a conversation.
    pub async fn list_for_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> AppResult<Vec<ReadMarker>> {
        sqlx::query_as::<_, ReadMarker>(
            "SELECT * FROM read_markers WHERE conversation_id = $1 ORDER BY read_at",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list read markers", e))
    }
}
