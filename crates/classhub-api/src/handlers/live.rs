//! Live room handlers.
//!
//! The same operations are reachable as WebSocket events; these routes
//! serve clients that manage the room outside the chat socket.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use classhub_core::types::{ClassId, RoomId};
use classhub_entity::live_room::LiveStatus;
use classhub_service::live::RoomJoin;

use crate::dto::request::{CreateRoomRequest, validate};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/classes/{class_id}/live-room
pub async fn create_or_join_room(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(class_id): Path<ClassId>,
    Json(req): Json<CreateRoomRequest>,
) -> Result<Json<ApiResponse<RoomJoin>>, ApiError> {
    validate(&req)?;
    let join = state
        .live
        .create_or_join(&auth, class_id, &req.room_name)
        .await?;
    Ok(Json(ApiResponse::ok(join)))
}

/// POST /api/live-rooms/{room_id}/join
pub async fn join_room(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(room_id): Path<RoomId>,
) -> Result<Json<ApiResponse<RoomJoin>>, ApiError> {
    let join = state.live.join(&auth, room_id).await?;
    Ok(Json(ApiResponse::ok(join)))
}

/// POST /api/live-rooms/{room_id}/leave
///
/// Accepts `?token=` so it can be sent as a page-unload beacon.
pub async fn leave_room(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(room_id): Path<RoomId>,
) -> Result<StatusCode, ApiError> {
    state.live.leave(&auth, room_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/live-rooms/{room_id}/ping
pub async fn ping_room(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(room_id): Path<RoomId>,
) -> Result<StatusCode, ApiError> {
    state.live.ping(&auth, room_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/classes/{class_id}/live-status
pub async fn live_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(class_id): Path<ClassId>,
) -> Result<Json<ApiResponse<LiveStatus>>, ApiError> {
    let status = state.live.live_status(&auth, class_id).await?;
    Ok(Json(ApiResponse::ok(status)))
}
