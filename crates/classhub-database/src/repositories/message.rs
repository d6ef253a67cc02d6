//! Message repository.

use sqlx::PgPool;

use classhub_core::error::{AppError, ErrorKind};
use classhub_core::result::AppResult;
use classhub_core::types::{ConversationId, MessageId, UserId};
use classhub_entity::message::{Message, MessageKind, MessageRow, NewMessage};

/// Repository for message rows.
///
/// Ownership checks live in the `WHERE` clause of each mutation, so an
/// edit or delete by anyone but the sender matches zero rows.
#[derive(Debug, Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    /// Create a new message repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new message.
    pub async fn create(&self, data: &NewMessage) -> AppResult<Message> {
        sqlx::query_as::<_, MessageRow>(
            "INSERT INTO messages (id, conversation_id, sender_id, sender_role, kind, content, reply_to) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(MessageId::new())
        .bind(data.conversation_id)
        .bind(data.sender_id)
        .bind(data.sender_role)
        .bind(data.kind)
        .bind(&data.content)
        .bind(data.reply_to)
        .fetch_one(&self.pool)
        .await
        .map(Message::from)
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create message", e))
    }

    /// Find a message by ID.
    pub async fn find_by_id(&self, id: MessageId) -> AppResult<Option<Message>> {
        sqlx::query_as::<_, MessageRow>("SELECT * FROM messages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map(|row| row.map(Message::from))
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find message", e))
    }

    /// Find messages by IDs.
    pub async fn find_by_ids(&self, ids: &[MessageId]) -> AppResult<Vec<Message>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, MessageRow>("SELECT * FROM messages WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map(|rows| rows.into_iter().map(Message::from).collect())
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find messages", e))
    }

    /// Messages older than a cursor, newest first.
    pub async fn list_before(
        &self,
        conversation_id: ConversationId,
        before: Option<MessageId>,
        limit: usize,
    ) -> AppResult<Vec<Message>> {
        sqlx::query_as::<_, MessageRow>(
            "SELECT * FROM messages WHERE conversation_id = $1 \
             AND ($2::uuid IS NULL OR id < $2) ORDER BY id DESC LIMIT $3",
        )
        .bind(conversation_id)
        .bind(before)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map(|rows| rows.into_iter().map(Message::from).collect())
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list messages", e))
    }

    /// Edit a live message owned by `sender_id`.
    pub async fn update_content(
        &self,
        id: MessageId,
        sender_id: UserId,
        content: &str,
    ) -> AppResult<Option<Message>> {
        sqlx::query_as::<_, MessageRow>(
            "UPDATE messages SET content = $3, edited_at = NOW() \
             WHERE id = $1 AND sender_id = $2 AND deleted_at IS NULL RETURNING *",
        )
        .bind(id)
        .bind(sender_id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await
        .map(|row| row.map(Message::from))
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to edit message", e))
    }

    /// Soft-delete a live message owned by `sender_id`. The content is
    /// cleared in the same statement.
    pub async fn soft_delete(
        &self,
        id: MessageId,
        sender_id: UserId,
    ) -> AppResult<Option<Message>> {
        sqlx::query_as::<_, MessageRow>(
            "UPDATE messages SET deleted_at = NOW(), content = NULL, kind = 'deleted' \
             WHERE id = $1 AND sender_id = $2 AND deleted_at IS NULL RETURNING *",
        )
        .bind(id)
        .bind(sender_id)
        .fetch_optional(&self.pool)
        .await
        .map(|row| row.map(Message::from))
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete message", e))
    }

    /// Overwrite the kind of a live message.
    pub async fn set_kind(&self, id: MessageId, kind: MessageKind) -> AppResult<()> {
        sqlx::query("UPDATE messages SET kind = $2 WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .bind(kind)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update message kind", e)
            })?;
        Ok(())
    }
}
