//! Health check handler.

use axum::Json;
use axum::extract::State;

use classhub_core::traits::cache::CacheProvider;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let database = probe(state.store.health_check().await);
    let cache = probe(state.cache.health_check().await);
    let status = if database == "ok" && cache == "ok" {
        "ok"
    } else {
        "degraded"
    };

    Json(ApiResponse::ok(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        database: database.to_string(),
        cache: cache.to_string(),
        realtime: state.realtime.metrics_snapshot(),
    }))
}

fn probe(result: classhub_core::result::AppResult<bool>) -> &'static str {
    match result {
        Ok(true) => "ok",
        Ok(false) => "unavailable",
        Err(e) => {
            tracing::warn!(error = %e, "Health probe failed");
            "unavailable"
        }
    }
}
