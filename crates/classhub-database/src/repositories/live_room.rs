//! Live room repository.

use sqlx::PgPool;

use classhub_core::error::{AppError, ErrorKind};
use classhub_core::result::AppResult;
use classhub_core::types::{ClassId, RoomId, UserId};
use classhub_entity::live_room::LiveRoom;

/// Repository for live rooms.
///
/// The partial unique index on `class_id WHERE status = 'open'` backs the
/// one-open-room-per-class rule; every participant change is a single
/// conditional `UPDATE` on the array column.
#[derive(Debug, Clone)]
pub struct LiveRoomRepository {
    pool: PgPool,
}

impl LiveRoomRepository {
    /// Create a new live room repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert an open room unless the class already has one.
    pub async fn insert_open(
        &self,
        class_id: ClassId,
        name: &str,
        created_by: UserId,
    ) -> AppResult<Option<LiveRoom>> {
        sqlx::query_as::<_, LiveRoom>(
            "INSERT INTO live_rooms (id, class_id, name, status, created_by, participant_ids) \
             VALUES ($1, $2, $3, 'open', $4, ARRAY[$4]::uuid[]) \
             ON CONFLICT (class_id) WHERE status = 'open' DO NOTHING RETURNING *",
        )
        .bind(RoomId::new())
        .bind(class_id)
        .bind(name)
        .bind(created_by)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create live room", e))
    }

    /// The open room of a class.
    pub async fn find_open_by_class(&self, class_id: ClassId) -> AppResult<Option<LiveRoom>> {
        sqlx::query_as::<_, LiveRoom>(
            "SELECT * FROM live_rooms WHERE class_id = $1 AND status = 'open'",
        )
        .bind(class_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find open room", e))
    }

    /// Find a room by ID.
    pub async fn find_by_id(&self, id: RoomId) -> AppResult<Option<LiveRoom>> {
        sqlx::query_as::<_, LiveRoom>("SELECT * FROM live_rooms WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find live room", e))
    }

    /// Add a participant if absent.
    pub async fn add_participant(&self, id: RoomId, user_id: UserId) -> AppResult<Option<LiveRoom>> {
        sqlx::query_as::<_, LiveRoom>(
            "UPDATE live_rooms SET participant_ids = CASE \
               WHEN $2 = ANY(participant_ids) THEN participant_ids \
               ELSE array_append(participant_ids, $2) END \
             WHERE id = $1 AND status = 'open' RETURNING *",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to join live room", e))
    }

    /// Remove a participant and close the room when it empties.
    pub async fn remove_participant(
        &self,
        id: RoomId,
        user_id: UserId,
    ) -> AppResult<Option<LiveRoom>> {
        sqlx::query_as::<_, LiveRoom>(
            "UPDATE live_rooms SET \
               participant_ids = array_remove(participant_ids, $2), \
               status = CASE WHEN cardinality(array_remove(participant_ids, $2)) = 0 \
                 THEN 'closed'::room_status ELSE status END, \
               ended_at = CASE WHEN cardinality(array_remove(participant_ids, $2)) = 0 \
                 THEN NOW() ELSE ended_at END \
             WHERE id = $1 AND status = 'open' RETURNING *",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to leave live room", e))
    }
}
