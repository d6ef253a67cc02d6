//! User directory repository.

use sqlx::PgPool;

use classhub_core::error::{AppError, ErrorKind};
use classhub_core::result::AppResult;
use classhub_core::types::UserId;
use classhub_entity::user::UserProfile;

/// Read access to the user directory projection.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find profiles for a batch of user ids.
    pub async fn find_by_ids(&self, ids: &[UserId]) -> AppResult<Vec<UserProfile>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, UserProfile>(
            "SELECT id, display_name, role, avatar_key FROM users WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find users", e))
    }

    /// Insert or replace a profile.
    pub async fn upsert(&self, profile: &UserProfile) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO users (id, display_name, role, avatar_key) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (id) DO UPDATE SET display_name = EXCLUDED.display_name, \
             role = EXCLUDED.role, avatar_key = EXCLUDED.avatar_key",
        )
        .bind(profile.id)
        .bind(&profile.display_name)
        .bind(profile.role)
        .bind(&profile.avatar_key)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to upsert user", e))?;
        Ok(())
    }
}
