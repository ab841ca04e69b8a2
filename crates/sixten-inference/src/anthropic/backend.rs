//! Anthropic-backed analyzer implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};

use sixten_core::defaults::{
    ANALYSIS_IMAGE_MAX_TOKENS, ANALYSIS_MAX_INPUT_CHARS, ANALYSIS_TEXT_MAX_TOKENS, ANTHROPIC_MODEL,
    ANTHROPIC_TIMEOUT_SECS, ANTHROPIC_URL, ANTHROPIC_VERSION,
};
use sixten_core::{Analysis, AnalysisError, AnalysisInput, Analyzer, Error, Result};

use super::types::*;
use crate::analysis::{
    decode_image_data_url, image_prompt, parse_model_reply, text_prompt, truncate_chars,
    ModelReply,
};

/// Configuration for the Anthropic analyzer.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// Base URL, without the `/v1/messages` path.
    pub base_url: String,
    /// API key. Without one every analysis fails with `NOT_CONFIGURED`.
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_seconds: u64,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            base_url: ANTHROPIC_URL.to_string(),
            api_key: None,
            model: ANTHROPIC_MODEL.to_string(),
            timeout_seconds: ANTHROPIC_TIMEOUT_SECS,
        }
    }
}

impl AnthropicConfig {
    /// Read `ANTHROPIC_API_KEY`, `ANTHROPIC_BASE_URL`, `ANTHROPIC_MODEL`
    /// and `ANTHROPIC_TIMEOUT`.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("ANTHROPIC_BASE_URL")
                .unwrap_or_else(|_| ANTHROPIC_URL.to_string()),
            api_key: std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            model: std::env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| ANTHROPIC_MODEL.to_string()),
            timeout_seconds: std::env::var("ANTHROPIC_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(ANTHROPIC_TIMEOUT_SECS),
        }
    }
}

/// Analyzer backed by the Anthropic Messages API.
pub struct AnthropicAnalyzer {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicAnalyzer {
    pub fn new(config: AnthropicConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "inference",
            component = "anthropic",
            url = %config.base_url,
            model = %config.model,
            configured = config.api_key.is_some(),
            "Initializing Anthropic analyzer"
        );

        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(AnthropicConfig::from_env())
    }

    pub fn config(&self) -> &AnthropicConfig {
        &self.config
    }

    /// Build the request body for an input. Image inputs are validated here,
    /// before anything goes over the network.
    fn build_request(&self, input: &AnalysisInput) -> std::result::Result<MessagesRequest, AnalysisError> {
        let (max_tokens, message) = match input {
            AnalysisInput::Text {
                content,
                existing_tags,
            } => {
                let truncated = truncate_chars(content, ANALYSIS_MAX_INPUT_CHARS);
                (
                    ANALYSIS_TEXT_MAX_TOKENS,
                    Message::user_text(text_prompt(truncated, existing_tags)),
                )
            }
            AnalysisInput::Image {
                data_url,
                existing_tags,
            } => {
                let payload = decode_image_data_url(data_url)?;
                (
                    ANALYSIS_IMAGE_MAX_TOKENS,
                    Message::user_blocks(vec![
                        ContentBlock::Image {
                            source: ImageSource::base64(payload.media_type, payload.data),
                        },
                        ContentBlock::Text {
                            text: image_prompt(existing_tags),
                        },
                    ]),
                )
            }
        };

        Ok(MessagesRequest {
            model: self.config.model.clone(),
            max_tokens,
            messages: vec![message],
        })
    }

    async fn send(
        &self,
        api_key: &str,
        request: &MessagesRequest,
    ) -> std::result::Result<String, AnalysisError> {
        let url = format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| AnalysisError::Upstream(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                subsystem = "inference",
                component = "anthropic",
                status = status.as_u16(),
                "Anthropic returned an error status"
            );
            return Err(match status {
                StatusCode::UNAUTHORIZED => AnalysisError::UpstreamAuth,
                StatusCode::TOO_MANY_REQUESTS => AnalysisError::RateLimited,
                other => AnalysisError::Upstream(format!("HTTP {}", other.as_u16())),
            });
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::Upstream(format!("Failed to parse response: {}", e)))?;

        body.first_text()
            .map(str::to_string)
            .ok_or_else(|| AnalysisError::Upstream("Empty reply".to_string()))
    }
}

#[async_trait]
impl Analyzer for AnthropicAnalyzer {
    async fn analyze(&self, input: AnalysisInput) -> std::result::Result<Analysis, AnalysisError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(AnalysisError::NotConfigured)?;

        let request = self.build_request(&input)?;
        let start = Instant::now();

        debug!(
            subsystem = "inference",
            component = "anthropic",
            op = "analyze",
            kind = input.kind(),
            model = %self.config.model,
            max_tokens = request.max_tokens,
            "Sending analysis request"
        );

        let text = self.send(api_key, &request).await?;

        let reply = parse_model_reply(&text).map_err(|e| {
            warn!(
                subsystem = "inference",
                component = "anthropic",
                op = "parse",
                response_len = text.len(),
                error = %e,
                "Model reply could not be parsed"
            );
            AnalysisError::Upstream(e.to_string())
        })?;

        debug!(
            subsystem = "inference",
            component = "anthropic",
            op = "analyze",
            duration_ms = start.elapsed().as_millis() as u64,
            response_len = text.len(),
            "Analysis complete"
        );

        match reply {
            ModelReply::Analysis(analysis) => Ok(analysis),
            ModelReply::UnreadableImage => Err(AnalysisError::UnreadableImage),
        }
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }

    fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }
}
