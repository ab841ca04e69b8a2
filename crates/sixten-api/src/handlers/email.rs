//! Inbound email webhook.
//!
//! Receives form-encoded inbound mail and reports the URLs found in the
//! subject and body. The URLs are not queued.

use axum::{
    extract::rejection::FormRejection,
    Form, Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use sixten_core::urls::extract_urls;

use crate::ApiError;

/// Inbound parse payload. Every field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct InboundEmail {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailWebhookResponse {
    pub message: String,
    pub urls_found: usize,
    pub urls: Vec<String>,
}

impl InboundEmail {
    /// Subject and body joined, the body taken from `text` or else `html`.
    pub fn combined_text(&self) -> String {
        let body = self
            .text
            .as_deref()
            .filter(|t| !t.is_empty())
            .or(self.html.as_deref())
            .unwrap_or_default();
        format!("{}\n{}", self.subject.as_deref().unwrap_or_default(), body)
    }
}

pub async fn email_webhook(
    payload: Result<Form<InboundEmail>, FormRejection>,
) -> Result<Json<EmailWebhookResponse>, ApiError> {
    let Form(email) =
        payload.map_err(|e| ApiError::BadRequest(format!("Invalid form body: {}", e.body_text())))?;

    let urls = extract_urls(&email.combined_text());

    info!(
        subsystem = "api",
        component = "email",
        from = email.from.as_deref().unwrap_or(""),
        to = email.to.as_deref().unwrap_or(""),
        result_count = urls.len(),
        "Inbound email processed"
    );

    let message = if urls.is_empty() {
        "No URLs found"
    } else {
        "Email processed"
    };

    Ok(Json(EmailWebhookResponse {
        message: message.to_string(),
        urls_found: urls.len(),
        urls,
    }))
}
