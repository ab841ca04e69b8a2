//! HTTP handlers, grouped by resource.

pub mod analyze;
pub mod content;
pub mod email;
pub mod events;
pub mod links;
pub mod tags;

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::ApiError;

/// Unwrap a JSON body, turning extractor rejections into `INVALID_REQUEST`.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e.body_text())))
}
