//! Class roster sync.

use axum::Json;
use axum::extract::{Path, State};

use classhub_core::error::AppError;
use classhub_core::types::ClassId;
use classhub_entity::class::ClassRoster;

use crate::dto::request::RosterRequest;
use crate::dto::response::{ApiResponse, RosterResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// PUT /api/classes/{class_id}/roster
///
/// Called by the class management application whenever teachers or
/// enrollment change. Creates the class conversation on first sync; open
/// connections of users who were removed stop receiving its events.
pub async fn sync_roster(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(class_id): Path<ClassId>,
    Json(req): Json<RosterRequest>,
) -> Result<Json<ApiResponse<RosterResponse>>, ApiError> {
    if !auth.is_admin() {
        return Err(AppError::forbidden("Only admins can sync class rosters").into());
    }

    let roster = ClassRoster {
        class_id,
        teacher_ids: req.teacher_ids,
        student_ids: req.student_ids,
    };
    let conversation = state.realtime.sync_roster(&roster).await?;

    tracing::info!(
        class_id = %class_id,
        conversation_id = %conversation.id,
        members = conversation.member_ids.len(),
        "Class roster synced"
    );

    Ok(Json(ApiResponse::ok(RosterResponse {
        conversation_id: conversation.id,
        class_id: conversation.class_id,
        member_count: conversation.member_ids.len(),
    })))
}
