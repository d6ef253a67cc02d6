//! PostgreSQL pool backing the conversation store.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use classhub_core::config::DatabaseConfig;
use classhub_core::error::{AppError, ErrorKind};
use classhub_core::result::AppResult;

/// Pool of PostgreSQL connections shared by every repository.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Open the pool described by `database.*`.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        validate(config)?;

        info!(
            store = "conversation",
            url = %redact_url(&config.url),
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            acquire_timeout_seconds = config.connect_timeout_seconds,
            "Opening conversation store pool"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Conversation store unreachable: {e}"),
                    e,
                )
            })?;

        info!(store = "conversation", size = pool.size(), "Conversation store pool ready");
        Ok(Self { pool })
    }

    /// The underlying sqlx pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Round-trip a trivial query; feeds `/api/health`.
    pub async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Conversation store health check failed", e)
            })
    }
}

fn validate(config: &DatabaseConfig) -> AppResult<()> {
    if config.url.is_empty() {
        return Err(AppError::configuration(
            "database.url is required for the postgres provider",
        ));
    }
    if config.max_connections == 0 || config.min_connections > config.max_connections {
        return Err(AppError::configuration(format!(
            "database.min_connections ({}) must not exceed a non-zero database.max_connections ({})",
            config.min_connections, config.max_connections
        )));
    }
    Ok(())
}

/// Hide the password in a connection URL before it reaches the logs.
fn redact_url(url: &str) -> String {
    let Some(at) = url.rfind('@') else {
        return url.to_string();
    };
    let userinfo_start = url.find("://").map(|p| p + 3).unwrap_or(0);
    match url[userinfo_start..at].find(':') {
        Some(colon) => format!(
            "{}:****@{}",
            &url[..userinfo_start + colon],
            &url[at + 1..]
        ),
        None => url.to_string(),
    }
}
