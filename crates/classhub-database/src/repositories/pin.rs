//! Pin repository.

use sqlx::PgPool;

use classhub_core::error::{AppError, ErrorKind};
use classhub_core::result::AppResult;
use classhub_core::types::{ConversationId, MessageId, UserId};
use classhub_entity::pin::Pin;

/// Repository for pinned messages.
#[derive(Debug, Clone)]
pub struct PinRepository {
    pool: PgPool,
}

impl PinRepository {
    /// Create a new pin repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Pin a message, returning the existing pin when it is already pinned.
    pub async fn pin(
        &self,
        conversation_id: ConversationId,
        message_id: MessageId,
        pinned_by: UserId,
    ) -> AppResult<Pin> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        sqlx::query_as::<_, Pin>(
            "INSERT INTO message_pins (conversation_id, message_id, pinned_by) VALUES ($1, $2, $3) \
             ON CONFLICT (conversation_id, message_id) DO UPDATE \
             SET pinned_by = message_pins.pinned_by RETURNING *",
        )
        .bind(conversation_id)
        .bind(message_id)
        .bind(pinned_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to pin message", e))
    }

    /// Unpin a message.
    pub async fn unpin(
        &self,
        conversation_id: ConversationId,
        message_id: MessageId,
    ) -> AppResult<bool> {
        sqlx::query("DELETE FROM message_pins WHERE conversation_id = $1 AND message_id = $2")
            .bind(conversation_id)
            .bind(message_id)
            .execute(&self.pool)
            .await
            .map(|r| r.rows_affected() > 0)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to unpin message", e))
    }

    /// Pins of a conversation, oldest first.
    pub async fn list_for_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> AppResult<Vec<Pin>> {
        sqlx::query_as::<_, Pin>(
            "SELECT * FROM message_pins WHERE conversation_id = $1 ORDER BY pinned_at",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list pins", e))
    }
}
