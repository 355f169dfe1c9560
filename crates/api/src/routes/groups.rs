//! Trip group endpoint handlers.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::{
    CreateGroupRequest, CreateGroupResponse, GroupRecord, JoinGroupRequest, JoinGroupResponse,
    LeaveGroupResponse, UpdateGroupRequest,
};

use super::request_body;
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Caller;

/// Create a new trip group with a fresh join code.
///
/// POST /api/v1/groups
///
/// Requires an admin token.
pub async fn create_group(
    State(state): State<AppState>,
    caller: Caller,
    body: Bytes,
) -> Result<(StatusCode, Json<CreateGroupResponse>), ApiError> {
    let request: CreateGroupRequest = request_body(&caller, &body)?;
    let created = state
        .group_service
        .create_group(caller.identity(), request)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Edit a group's name, description and dates.
///
/// PATCH /api/v1/groups/:group_id
pub async fn update_group(
    State(state): State<AppState>,
    caller: Caller,
    Path(group_id): Path<String>,
    body: Bytes,
) -> Result<Json<GroupRecord>, ApiError> {
    let request: UpdateGroupRequest = request_body(&caller, &body)?;
    let updated = state
        .group_service
        .update_group(caller.identity(), &group_id, request)
        .await?;
    Ok(Json(updated))
}

/// Join a group by its join code.
///
/// POST /api/v1/groups/join
pub async fn join_group(
    State(state): State<AppState>,
    caller: Caller,
    body: Bytes,
) -> Result<Json<JoinGroupResponse>, ApiError> {
    let request: JoinGroupRequest = request_body(&caller, &body)?;
    let joined = state
        .group_service
        .join_group(caller.identity(), request)
        .await?;
    Ok(Json(joined))
}

/// Leave a group.
///
/// POST /api/v1/groups/:group_id/leave
pub async fn leave_group(
    State(state): State<AppState>,
    caller: Caller,
    Path(group_id): Path<String>,
) -> Result<Json<LeaveGroupResponse>, ApiError> {
    let left = state
        .group_service
        .leave_group(caller.identity(), &group_id)
        .await?;
    Ok(Json(left))
}
