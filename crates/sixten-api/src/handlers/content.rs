//! Fetch-content endpoint: a proxy to the content fetcher.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use sixten_core::urls::normalize_input_url;

use super::json_body;
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct FetchContentRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct FetchContentResponse {
    pub content: String,
    /// The normalized URL that was fetched.
    pub url: String,
}

/// Fetch the plain text of a page.
///
/// # Returns
/// - 200 with `{content, url}`
/// - 400 `INVALID_REQUEST` for a missing URL
/// - 404 `NOT_FOUND`, 403 `ACCESS_DENIED`
/// - 422 `EMPTY_CONTENT` or `UNREADABLE`
/// - 502 `UPSTREAM_UNAVAILABLE`
pub async fn fetch_content(
    State(state): State<AppState>,
    payload: Result<Json<FetchContentRequest>, JsonRejection>,
) -> Result<Json<FetchContentResponse>, ApiError> {
    let req = json_body(payload)?;
    if req.url.trim().is_empty() {
        return Err(ApiError::BadRequest("A URL is required".to_string()));
    }

    let url = normalize_input_url(&req.url);
    let content = state.fetcher.fetch(&url).await?;

    tracing::debug!(
        subsystem = "api",
        component = "content",
        op = "fetch",
        response_len = content.len(),
        "Content fetched"
    );

    Ok(Json(FetchContentResponse { content, url }))
}
