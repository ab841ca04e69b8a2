//! HTTP error mapping.
//!
//! Every failure leaves the server as `{ "error": <message>, "code": <CODE> }`
//! plus variant-specific fields (`status` for duplicates, `remainingMinutes`
//! for the active-list time limit).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use sixten_core::{AnalysisError, CapacityError, Error, FetchError, LinkStatus};

/// HTTP status for a content fetch failure.
pub fn fetch_status(err: &FetchError) -> StatusCode {
    match err {
        FetchError::NotFound => StatusCode::NOT_FOUND,
        FetchError::AccessDenied => StatusCode::FORBIDDEN,
        FetchError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
        FetchError::EmptyContent | FetchError::Unreadable => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

/// HTTP status for an analysis failure.
///
/// `UNREADABLE_IMAGE` is an expected outcome and answers 200.
pub fn analysis_status(err: &AnalysisError) -> StatusCode {
    match err {
        AnalysisError::InvalidImageFormat => StatusCode::BAD_REQUEST,
        AnalysisError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        AnalysisError::NotConfigured | AnalysisError::UpstreamAuth => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        AnalysisError::UnreadableImage => StatusCode::OK,
        AnalysisError::Upstream(_) => StatusCode::BAD_GATEWAY,
    }
}

/// Errors returned by handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed request body or parameters.
    BadRequest(String),
    NotFound(String),
    Duplicate { status: LinkStatus },
    InvalidTransition { from: LinkStatus, to: LinkStatus },
    Capacity(CapacityError),
    Fetch(FetchError),
    Analysis(AnalysisError),
    /// Storage or other server-side failure. Details are logged, not returned.
    Internal(Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Duplicate { .. }
            | ApiError::InvalidTransition { .. }
            | ApiError::Capacity(_) => StatusCode::CONFLICT,
            ApiError::Fetch(e) => fetch_status(e),
            ApiError::Analysis(e) => analysis_status(e),
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "INVALID_REQUEST",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Duplicate { .. } => "DUPLICATE",
            ApiError::InvalidTransition { .. } => "INVALID_TRANSITION",
            ApiError::Capacity(e) => e.code(),
            ApiError::Fetch(e) => e.code(),
            ApiError::Analysis(e) => e.code(),
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) => msg.clone(),
            ApiError::Duplicate { status } => {
                format!("This link is already saved in {}", status.label())
            }
            ApiError::InvalidTransition { from, to } => {
                format!("Cannot move a link from {} to {}", from, to)
            }
            ApiError::Capacity(e) => e.to_string(),
            ApiError::Fetch(e) => e.to_string(),
            ApiError::Analysis(e) => e.to_string(),
            ApiError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::LinkNotFound(id) => ApiError::NotFound(format!("Link {} not found", id)),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::Duplicate { status } => ApiError::Duplicate { status },
            Error::InvalidTransition { from, to } => ApiError::InvalidTransition { from, to },
            Error::Capacity(e) => ApiError::Capacity(e),
            Error::Fetch(e) => ApiError::Fetch(e),
            Error::Analysis(e) => ApiError::Analysis(e),
            other => ApiError::Internal(other),
        }
    }
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        ApiError::Fetch(err)
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        ApiError::Analysis(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if let ApiError::Internal(ref err) = self {
            tracing::error!(
                subsystem = "api",
                error_code = self.code(),
                error = %err,
                "Request failed"
            );
        }

        let mut body = json!({
            "error": self.message(),
            "code": self.code(),
        });
        match &self {
            ApiError::Duplicate { status } => {
                body["status"] = json!(status);
            }
            ApiError::Capacity(e) => {
                if let Some(remaining) = e.remaining_minutes() {
                    body["remainingMinutes"] = json!(remaining);
                }
            }
            _ => {}
        }

        (status, Json(body)).into_response()
    }
}
