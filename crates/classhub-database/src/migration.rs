//! Schema migrations for the conversation store.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use classhub_core::error::{AppError, ErrorKind};
use classhub_core::result::AppResult;

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Apply pending migrations from `/migrations`.
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    let latest = MIGRATOR.iter().map(|m| m.version).max().unwrap_or_default();
    info!(
        known = MIGRATOR.iter().count(),
        latest, "Migrating conversation store schema"
    );

    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Conversation store migration failed: {e}"),
            e,
        )
    })?;

    info!(version = latest, "Conversation store schema up to date");
    Ok(())
}
