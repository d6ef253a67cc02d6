//! Conversation repository.

use sqlx::PgPool;

use classhub_core::error::{AppError, ErrorKind};
use classhub_core::result::AppResult;
use classhub_core::types::{ClassId, ConversationId, UserId};
use classhub_entity::conversation::Conversation;

/// Repository for class conversations and their member sets.
#[derive(Debug, Clone)]
pub struct ConversationRepository {
    pool: PgPool,
}

impl ConversationRepository {
    /// Create a new conversation repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a conversation by ID.
    pub async fn find_by_id(&self, id: ConversationId) -> AppResult<Option<Conversation>> {
        sqlx::query_as::<_, Conversation>("SELECT * FROM conversations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find conversation", e)
            })
    }

    /// Find the conversation owned by a class.
    pub async fn find_by_class(&self, class_id: ClassId) -> AppResult<Option<Conversation>> {
        sqlx::query_as::<_, Conversation>("SELECT * FROM conversations WHERE class_id = $1")
            .bind(class_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    "Failed to find conversation by class",
                    e,
                )
            })
    }

    /// Replace a class's member set in one statement, creating the
    /// conversation if it does not exist yet.
    pub async fn replace_members(
        &self,
        class_id: ClassId,
        member_ids: &[UserId],
    ) -> AppResult<Conversation> {
        sqlx::query_as::<_, Conversation>(
            "INSERT INTO conversations (id, class_id, member_ids) VALUES ($1, $2, $3) \
             ON CONFLICT (class_id) DO UPDATE SET member_ids = EXCLUDED.member_ids, \
             updated_at = NOW() RETURNING *",
        )
        .bind(ConversationId::new())
        .bind(class_id)
        .bind(member_ids)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to sync conversation members", e)
        })
    }
}
