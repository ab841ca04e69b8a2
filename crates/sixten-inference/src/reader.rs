//! Jina Reader content fetcher.
//!
//! The reader turns a web page into plain text. It answers some failures
//! with a 200 status and a short error message as the body, so short bodies
//! are checked against known error fingerprints.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};

use sixten_core::defaults::{
    READER_TIMEOUT_SECS, READER_URL, UNREADABLE_BODY_THRESHOLD, UNREADABLE_FINGERPRINTS,
};
use sixten_core::{ContentFetcher, Error, FetchError, Result};

/// Configuration for the reader client.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    pub base_url: String,
    /// Optional key, sent as a bearer token.
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            base_url: READER_URL.to_string(),
            api_key: None,
            timeout_seconds: READER_TIMEOUT_SECS,
        }
    }
}

impl ReaderConfig {
    /// Read `JINA_READER_URL`, `JINA_API_KEY` and `JINA_TIMEOUT`.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("JINA_READER_URL").unwrap_or_else(|_| READER_URL.to_string()),
            api_key: std::env::var("JINA_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            timeout_seconds: std::env::var("JINA_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(READER_TIMEOUT_SECS),
        }
    }
}

/// Classify a successful reader body.
///
/// Blank bodies are `EmptyContent`. Bodies under the threshold (trimmed)
/// that contain an error fingerprint are `Unreadable`. Anything else is
/// returned as-is.
pub fn classify_body(body: String) -> std::result::Result<String, FetchError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(FetchError::EmptyContent);
    }
    if trimmed.chars().count() < UNREADABLE_BODY_THRESHOLD {
        let lower = trimmed.to_lowercase();
        if UNREADABLE_FINGERPRINTS.iter().any(|fp| lower.contains(fp)) {
            return Err(FetchError::Unreadable);
        }
    }
    Ok(body)
}

/// Map a non-success reader status to a fetch error.
pub fn classify_status(status: StatusCode) -> FetchError {
    match status {
        StatusCode::NOT_FOUND => FetchError::NotFound,
        StatusCode::FORBIDDEN => FetchError::AccessDenied,
        s if s.is_server_error() => {
            FetchError::UpstreamUnavailable(format!("reader returned HTTP {}", s.as_u16()))
        }
        s => FetchError::UpstreamUnavailable(format!("could not fetch content (HTTP {})", s.as_u16())),
    }
}

/// Content fetcher backed by Jina Reader.
pub struct JinaReader {
    client: Client,
    config: ReaderConfig,
}

impl JinaReader {
    pub fn new(config: ReaderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "inference",
            component = "jina",
            url = %config.base_url,
            authenticated = config.api_key.is_some(),
            "Initializing reader client"
        );

        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(ReaderConfig::from_env())
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    fn reader_url(&self, target: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(target)
        )
    }
}

#[async_trait]
impl ContentFetcher for JinaReader {
    async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError> {
        let start = Instant::now();
        let mut req = self
            .client
            .get(self.reader_url(url))
            .header("Accept", "text/plain");

        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req.send().await.map_err(|e| {
            warn!(
                subsystem = "inference",
                component = "jina",
                op = "fetch",
                error = %e,
                "Reader request failed"
            );
            FetchError::UpstreamUnavailable(format!("could not connect: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let err = classify_status(status);
            debug!(
                subsystem = "inference",
                component = "jina",
                op = "fetch",
                status = status.as_u16(),
                error_code = err.code(),
                "Reader returned an error status"
            );
            return Err(err);
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::UpstreamUnavailable(format!("could not read body: {}", e)))?;

        let result = classify_body(body);
        debug!(
            subsystem = "inference",
            component = "jina",
            op = "fetch",
            duration_ms = start.elapsed().as_millis() as u64,
            success = result.is_ok(),
            "Reader fetch complete"
        );
        result
    }
}
