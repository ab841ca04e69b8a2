//! Analyze endpoint.
//!
//! A server-side proxy to the AI analyzer so the model credential never
//! leaves the server. Accepts text (`type: "url"` carrying already-fetched
//! page text, or the legacy `{content}` shape) and screenshots
//! (`type: "image"`).

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use sixten_core::{Analysis, AnalysisError, AnalysisInput};

use crate::error::analysis_status;
use crate::AppState;

/// Request body variants with an explicit `type`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum TypedAnalyzeRequest {
    /// `data` is page text.
    Url {
        data: String,
        #[serde(default)]
        existing_tags: Vec<String>,
    },
    /// `data` is a `data:image/...;base64,...` URL.
    Image {
        data: String,
        #[serde(default)]
        existing_tags: Vec<String>,
    },
}

/// Older clients send `{ "content": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LegacyAnalyzeRequest {
    pub content: String,
}

/// Every accepted body shape. Anything else is rejected at extraction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AnalyzeRequest {
    Typed(TypedAnalyzeRequest),
    Legacy(LegacyAnalyzeRequest),
}

impl AnalyzeRequest {
    /// Convert into analyzer input. Blank text is rejected.
    pub fn into_input(self) -> Result<AnalysisInput, &'static str> {
        let input = match self {
            AnalyzeRequest::Typed(TypedAnalyzeRequest::Url {
                data,
                existing_tags,
            }) => AnalysisInput::Text {
                content: data,
                existing_tags,
            },
            AnalyzeRequest::Typed(TypedAnalyzeRequest::Image {
                data,
                existing_tags,
            }) => AnalysisInput::Image {
                data_url: data,
                existing_tags,
            },
            AnalyzeRequest::Legacy(LegacyAnalyzeRequest { content }) => AnalysisInput::Text {
                content,
                existing_tags: Vec::new(),
            },
        };

        if let AnalysisInput::Text { content, .. } = &input {
            if content.trim().is_empty() {
                return Err("No content to analyze");
            }
        }
        Ok(input)
    }
}

/// Response body. On success the analysis fields are flattened in; on
/// failure `error` carries the symbolic code.
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    #[serde(flatten)]
    pub analysis: Option<Analysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AnalyzeResponse {
    fn ok(analysis: Analysis) -> Self {
        Self {
            success: true,
            analysis: Some(analysis),
            error: None,
            message: None,
        }
    }

    fn failed(code: &'static str, message: String) -> Self {
        Self {
            success: false,
            analysis: None,
            error: Some(code),
            message: Some(message),
        }
    }
}

fn invalid_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(AnalyzeResponse::failed("INVALID_REQUEST", message.into())),
    )
        .into_response()
}

/// Analyze text or a screenshot.
///
/// # Returns
/// - 200 with `success: true` and the analysis
/// - 200 with `success: false, error: "UNREADABLE_IMAGE"`
/// - 400 `INVALID_REQUEST` or `INVALID_IMAGE_FORMAT`
/// - 429 `RATE_LIMITED`
/// - 500 `NOT_CONFIGURED` or `UPSTREAM_AUTH_ERROR`
/// - 502 `UPSTREAM_ERROR`
pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Response {
    if !state.analyzer.is_configured() {
        let err = AnalysisError::NotConfigured;
        return (
            analysis_status(&err),
            Json(AnalyzeResponse::failed(err.code(), err.to_string())),
        )
            .into_response();
    }

    let request = match payload {
        Ok(Json(request)) => request,
        Err(e) => return invalid_request(format!("Invalid request body: {}", e.body_text())),
    };

    let input = match request.into_input() {
        Ok(input) => input,
        Err(msg) => return invalid_request(msg),
    };

    let kind = input.kind();
    match state.analyzer.analyze(input).await {
        Ok(analysis) => {
            debug!(
                subsystem = "api",
                component = "analyze",
                kind,
                model = state.analyzer.model_name(),
                estimated_minutes = analysis.estimated_minutes,
                "Analysis succeeded"
            );
            (StatusCode::OK, Json(AnalyzeResponse::ok(analysis))).into_response()
        }
        Err(err) => {
            warn!(
                subsystem = "api",
                component = "analyze",
                kind,
                error_code = err.code(),
                error = %err,
                "Analysis failed"
            );
            (
                analysis_status(&err),
                Json(AnalyzeResponse::failed(err.code(), err.to_string())),
            )
                .into_response()
        }
    }
}
