//! Error types for sixten.

use thiserror::Error;

use crate::models::LinkStatus;

/// Result type alias using sixten's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for sixten operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Link not found
    #[error("Link not found: {0}")]
    LinkNotFound(uuid::Uuid),

    /// The submitted URL is already in the queue
    #[error("Link already exists in {status}")]
    Duplicate { status: LinkStatus },

    /// Status change not allowed by the triage table
    #[error("Cannot move link from {from} to {to}")]
    InvalidTransition { from: LinkStatus, to: LinkStatus },

    /// Promotion to the active list rejected
    #[error("{0}")]
    Capacity(#[from] CapacityError),

    /// Content extraction failed
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// AI analysis failed
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

/// Failure modes of the content fetcher.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Remote returned 404.
    #[error("The page could not be found. Check that the link is correct.")]
    NotFound,
    /// Remote returned 403.
    #[error("Access denied. The site may block automated fetching.")]
    AccessDenied,
    /// Remote 5xx, other non-success status, or transport failure.
    #[error("The content service is not responding right now: {0}")]
    UpstreamUnavailable(String),
    /// 200 response with a blank body.
    #[error("The page appears to be empty or could not be read.")]
    EmptyContent,
    /// 200 response whose short body is an error message in disguise.
    #[error("The page could not be read. Check that the link is correct.")]
    Unreadable,
}

impl FetchError {
    /// Symbolic code used on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            FetchError::NotFound => "NOT_FOUND",
            FetchError::AccessDenied => "ACCESS_DENIED",
            FetchError::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            FetchError::EmptyContent => "EMPTY_CONTENT",
            FetchError::Unreadable => "UNREADABLE",
        }
    }
}

/// Failure modes of the AI analyzer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// No credential for the model provider.
    #[error("AI analysis is not configured")]
    NotConfigured,
    /// Data URL is not a supported base64 image.
    #[error("Unsupported or malformed image data")]
    InvalidImageFormat,
    /// The model reported that the image has no legible content.
    #[error("The image could not be read")]
    UnreadableImage,
    /// Provider returned 429.
    #[error("Too many requests to the AI service, wait a moment and try again")]
    RateLimited,
    /// Provider returned 401.
    #[error("The AI service rejected the configured credential")]
    UpstreamAuth,
    /// Anything else: transport failure, bad status, unusable reply.
    #[error("AI service error: {0}")]
    Upstream(String),
}

impl AnalysisError {
    /// Symbolic code used on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            AnalysisError::NotConfigured => "NOT_CONFIGURED",
            AnalysisError::InvalidImageFormat => "INVALID_IMAGE_FORMAT",
            AnalysisError::UnreadableImage => "UNREADABLE_IMAGE",
            AnalysisError::RateLimited => "RATE_LIMITED",
            AnalysisError::UpstreamAuth => "UPSTREAM_AUTH_ERROR",
            AnalysisError::Upstream(_) => "UPSTREAM_ERROR",
        }
    }
}

/// Reasons a link may not join the active list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapacityError {
    #[error("Active list is full (max {max} links). Mark something as done first.")]
    TooManyLinks { max: usize },

    #[error(
        "Link ({candidate_minutes} min) exceeds the time limit. \
         You have {remaining_minutes} min left of {max_minutes}."
    )]
    TooManyMinutes {
        candidate_minutes: i32,
        remaining_minutes: i32,
        max_minutes: i32,
    },
}

impl CapacityError {
    pub fn code(&self) -> &'static str {
        match self {
            CapacityError::TooManyLinks { .. } => "ACTIVE_LIST_FULL",
            CapacityError::TooManyMinutes { .. } => "ACTIVE_MINUTES_EXCEEDED",
        }
    }

    /// Minutes of headroom left, when the minutes limit was the cause.
    pub fn remaining_minutes(&self) -> Option<i32> {
        match self {
            CapacityError::TooManyMinutes {
                remaining_minutes, ..
            } => Some(*remaining_minutes),
            CapacityError::TooManyLinks { .. } => None,
        }
    }
}
