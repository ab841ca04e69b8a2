//! Tag autocomplete and favorite tags.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use sixten_core::normalize_tag;

use super::json_body;
use crate::{ApiError, AppState};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagQuery {
    #[serde(default)]
    pub q: Option<String>,
    /// Leave out tags already on this link.
    #[serde(default)]
    pub link_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct FavoriteTagRequest {
    pub tag: String,
}

/// Autocomplete: favorites matching `q` first, then other known tags.
pub async fn suggest_tags(
    State(state): State<AppState>,
    Query(query): Query<TagQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let suggestions = state
        .triage
        .suggest(
            &state.owner,
            query.q.as_deref().unwrap_or_default(),
            query.link_id,
        )
        .await?;
    Ok(Json(suggestions))
}

pub async fn list_favorite_tags(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let favorites = state.favorites.list(&state.owner).await?;
    Ok(Json(favorites))
}

pub async fn add_favorite_tag(
    State(state): State<AppState>,
    payload: Result<Json<FavoriteTagRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = json_body(payload)?;
    let name = normalize_tag(&req.tag)
        .ok_or_else(|| ApiError::BadRequest("Tag name is empty".to_string()))?;
    let favorite = state.favorites.add(&state.owner, &name).await?;
    Ok((StatusCode::CREATED, Json(favorite)))
}

pub async fn remove_favorite_tag(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let name = normalize_tag(&name)
        .ok_or_else(|| ApiError::BadRequest("Tag name is empty".to_string()))?;
    if state.favorites.remove(&state.owner, &name).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Favorite tag '{}' not found", name)))
    }
}
