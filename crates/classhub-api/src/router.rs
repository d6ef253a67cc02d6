//! Route definitions for the ClassHub HTTP API.
//!
//! REST routes are mounted under `/api`; the WebSocket endpoint lives at
//! `/ws`.

use axum::Router;
use axum::middleware as axum_middleware;
use axum::routing::{get, post, put};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the router with all routes. Layers are added by
/// [`crate::app::build_app`].
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(live_routes())
        .merge(class_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(handlers::ws::ws_upgrade))
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Live rooms and teacher presence.
fn live_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/classes/{class_id}/live-room",
            post(handlers::live::create_or_join_room),
        )
        .route(
            "/classes/{class_id}/live-status",
            get(handlers::live::live_status),
        )
        .route("/live-rooms/{room_id}/join", post(handlers::live::join_room))
        .route("/live-rooms/{room_id}/leave", post(handlers::live::leave_room))
        .route("/live-rooms/{room_id}/ping", post(handlers::live::ping_room))
}

/// Class membership sync.
fn class_routes() -> Router<AppState> {
    Router::new().route(
        "/classes/{class_id}/roster",
        put(handlers::roster::sync_roster),
    )
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
