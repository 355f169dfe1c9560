//! Group schedule endpoint handlers.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use domain::models::{AddEventRequest, AddEventResponse, DeleteEventResponse, NextEventResponse};

use super::request_body;
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Caller;

/// Add an activity to a group's schedule.
///
/// POST /api/v1/groups/:group_id/events
pub async fn add_event(
    State(state): State<AppState>,
    caller: Caller,
    Path(group_id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<AddEventResponse>), ApiError> {
    let request: AddEventRequest = request_body(&caller, &body)?;
    let added = state
        .schedule_service
        .add_event(caller.identity(), &group_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(added)))
}

/// Remove an activity from a group's schedule.
///
/// DELETE /api/v1/groups/:group_id/events/:event_id
pub async fn delete_event(
    State(state): State<AppState>,
    caller: Caller,
    Path((group_id, event_id)): Path<(String, String)>,
) -> Result<Json<DeleteEventResponse>, ApiError> {
    let deleted = state
        .schedule_service
        .delete_event(caller.identity(), &group_id, &event_id)
        .await?;
    Ok(Json(deleted))
}

/// Next upcoming activity of a group, or `null`.
///
/// GET /api/v1/groups/:group_id/schedule/next
pub async fn next_event(
    State(state): State<AppState>,
    caller: Caller,
    Path(group_id): Path<String>,
) -> Result<Json<NextEventResponse>, ApiError> {
    let next = state
        .schedule_service
        .next_event(caller.identity(), &group_id, Utc::now().timestamp_millis())
        .await?;
    Ok(Json(next))
}
