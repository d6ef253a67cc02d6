//! Media object and attachment link repository.

use sqlx::PgPool;

use classhub_core::error::{AppError, ErrorKind};
use classhub_core::result::AppResult;
use classhub_core::types::{MediaId, MessageId, UserId};
use classhub_entity::media::{AttachmentLink, MediaObject};

use crate::store::UnlinkOutcome;

/// Repository for media rows and their reference-counted links.
#[derive(Debug, Clone)]
pub struct MediaRepository {
    pool: PgPool,
}

impl MediaRepository {
    /// Create a new media repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record an uploaded object.
    pub async fn create(&self, media: &MediaObject) -> AppResult<MediaObject> {
        sqlx::query_as::<_, MediaObject>(
            "INSERT INTO media_objects (id, object_key, content_type, file_name, size_bytes, uploaded_by) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(media.id)
        .bind(&media.object_key)
        .bind(&media.content_type)
        .bind(&media.file_name)
        .bind(media.size_bytes)
        .bind(media.uploaded_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to register media", e))
    }

    /// Find media objects by IDs.
    pub async fn find_by_ids(&self, ids: &[MediaId]) -> AppResult<Vec<MediaObject>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, MediaObject>("SELECT * FROM media_objects WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find media", e))
    }

    /// Link media to a message, preserving the given order.
    pub async fn link(
        &self,
        message_id: MessageId,
        media_ids: &[MediaId],
    ) -> AppResult<Vec<AttachmentLink>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let mut links = Vec::with_capacity(media_ids.len());
        for (position, media_id) in media_ids.iter().enumerate() {
            let link = sqlx::query_as::<_, AttachmentLink>(
                "INSERT INTO message_attachments (message_id, media_id, position) \
                 VALUES ($1, $2, $3) RETURNING *",
            )
            .bind(message_id)
            .bind(media_id)
            .bind(position as i32)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to link attachment", e)
            })?;
            links.push(link);
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit attachment links", e)
        })?;
        Ok(links)
    }

    /// All links for a batch of messages.
    pub async fn list_for_messages(
        &self,
        message_ids: &[MessageId],
    ) -> AppResult<Vec<AttachmentLink>> {
        if message_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, AttachmentLink>(
            "SELECT * FROM message_attachments WHERE message_id = ANY($1) \
             ORDER BY message_id, position",
        )
        .bind(message_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list attachments", e))
    }

    /// Remove a link from a live message owned by `sender_id` and drop the
    /// media row if nothing references it.
    pub async fn unlink(
        &self,
        message_id: MessageId,
        sender_id: UserId,
        media_id: MediaId,
    ) -> AppResult<UnlinkOutcome> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let removed = sqlx::query(
            "DELETE FROM message_attachments a USING messages m \
             WHERE a.message_id = $1 AND a.media_id = $2 \
               AND m.id = a.message_id AND m.sender_id = $3 AND m.deleted_at IS NULL",
        )
        .bind(message_id)
        .bind(media_id)
        .bind(sender_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to unlink attachment", e))?
        .rows_affected()
            > 0;

        let orphaned = if removed {
            sqlx::query_as::<_, MediaObject>(
                "DELETE FROM media_objects WHERE id = $1 AND NOT EXISTS \
                 (SELECT 1 FROM message_attachments WHERE media_id = $1) RETURNING *",
            )
            .bind(media_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete orphaned media", e)
            })?
        } else {
            None
        };

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit unlink", e)
        })?;
        Ok(UnlinkOutcome { removed, orphaned })
    }
}
