//! Reaction repository.

use sqlx::PgPool;

use classhub_core::error::{AppError, ErrorKind};
use classhub_core::result::AppResult;
use classhub_core::types::{MessageId, UserId};
use classhub_entity::reaction::Reaction;

/// Repository for reaction tuples. The primary key on
/// (message, user, emoji) makes adds idempotent.
#[derive(Debug, Clone)]
pub struct ReactionRepository {
    pool: PgPool,
}

impl ReactionRepository {
    /// Create a new reaction repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a reaction, ignoring duplicates.
    pub async fn add(&self, message_id: MessageId, user_id: UserId, emoji: &str) -> AppResult<bool> {
        sqlx::query(
            "INSERT INTO message_reactions (message_id, user_id, emoji) VALUES ($1, $2, $3) \
             ON CONFLICT DO NOTHING",
        )
        .bind(message_id)
        .bind(user_id)
        .bind(emoji)
        .execute(&self.pool)
        .await
        .map(|r| r.rows_affected() > 0)
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to add reaction", e))
    }

    /// Delete a reaction if present.
    pub async fn remove(
        &self,
        message_id: MessageId,
        user_id: UserId,
        emoji: &str,
    ) -> AppResult<bool> {
        sqlx::query(
            "DELETE FROM message_reactions WHERE message_id = $1 AND user_id = $2 AND emoji = $3",
        )
        .bind(message_id)
        .bind(user_id)
        .bind(emoji)
        .execute(&self.pool)
        .await
        .map(|r| r.rows_affected() > 0)
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to remove reaction", e))
    }

    /// All reactions on a batch of messages.
    pub async fn list_for_messages(&self, message_ids: &[MessageId]) -> AppResult<Vec<Reaction>> {
        if message_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, Reaction>(
            "SELECT * FROM message_reactions WHERE message_id = ANY($1) ORDER BY created_at",
        )
        .bind(message_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list reactions", e))
    }
}
