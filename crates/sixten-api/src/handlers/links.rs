//! Link handlers: intake, listing, status changes, per-link tags and stats.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use sixten_core::{Error, LinkFilter, LinkStatus, UpdateLinkStatusRequest};

use super::json_body;
use crate::services::{IntakeOutcome, IntakeRequest};
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct ReplaceTagsRequest {
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddTagRequest {
    pub tag: String,
}

/// List links, newest first. Deleted links are left out unless
/// `status=deleted` or `include_deleted=true` is given.
pub async fn list_links(
    State(state): State<AppState>,
    filter: Result<Query<LinkFilter>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(filter) =
        filter.map_err(|e| ApiError::BadRequest(format!("Invalid query: {}", e.body_text())))?;
    let links = state.links.list(&state.owner, &filter).await?;
    Ok(Json(links))
}

/// Run one intake path.
///
/// # Returns
/// - 201 with the created link
/// - 200 with `{outcome: "fallback_required", url?, reason}`
/// - 409 `DUPLICATE` with the status the existing link is in
pub async fn create_link(
    State(state): State<AppState>,
    payload: Result<Json<IntakeRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = json_body(payload)?;
    let outcome = state.triage.intake(&state.owner, request).await?;

    Ok(match outcome {
        IntakeOutcome::Created { link } => (StatusCode::CREATED, Json(link)).into_response(),
        fallback @ IntakeOutcome::FallbackRequired { .. } => {
            (StatusCode::OK, Json(fallback)).into_response()
        }
    })
}

pub async fn get_link(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let link = state
        .links
        .get(&state.owner, id)
        .await?
        .ok_or(Error::LinkNotFound(id))?;
    Ok(Json(link))
}

pub async fn update_link_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateLinkStatusRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = json_body(payload)?;
    let link = state
        .triage
        .transition(&state.owner, id, req.status, req.note)
        .await?;
    Ok(Json(link))
}

/// Soft-delete a link. Follows the transition table, so an active link
/// has to be moved out of the active list first.
pub async fn delete_link(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .triage
        .transition(&state.owner, id, LinkStatus::Deleted, None)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn replace_tags(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<ReplaceTagsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = json_body(payload)?;
    let tags = state
        .triage
        .replace_tags(&state.owner, id, &req.tags)
        .await?;
    Ok(Json(tags))
}

pub async fn add_tag(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<AddTagRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = json_body(payload)?;
    let tag = state.triage.add_tag(&state.owner, id, &req.tag).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

pub async fn remove_tag(
    State(state): State<AppState>,
    Path((id, tag_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    state.triage.remove_tag(&state.owner, id, tag_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Weekly counters and the current active-list load.
pub async fn stats(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let stats = state.triage.stats(&state.owner).await?;
    let limits = state.triage.limits();
    Ok(Json(serde_json::json!({
        "addedThisWeek": stats.added_this_week,
        "handledThisWeek": stats.handled_this_week,
        "queueCount": stats.queue_count,
        "activeCount": stats.active_count,
        "activeMinutes": stats.active_minutes,
        "maxActiveLinks": limits.max_active_links,
        "maxActiveMinutes": limits.max_active_minutes,
        "remainingMinutes": limits.remaining_minutes(stats.active_minutes),
    })))
}
