//! Core data models for sixten.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults;

// =============================================================================
// OWNERSHIP
// =============================================================================

/// Identity every store operation is scoped to.
///
/// The deployment runs a single user context, so this is usually the
/// configured constant, but repositories always filter on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for OwnerId {
    fn default() -> Self {
        Self(defaults::DEFAULT_USER_ID.to_string())
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// ENUMS
// =============================================================================

/// Triage status of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    Inbox,
    Active,
    Later,
    Done,
    Deleted,
}

impl LinkStatus {
    pub const ALL: [LinkStatus; 5] = [
        LinkStatus::Inbox,
        LinkStatus::Active,
        LinkStatus::Later,
        LinkStatus::Done,
        LinkStatus::Deleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkStatus::Inbox => "inbox",
            LinkStatus::Active => "active",
            LinkStatus::Later => "later",
            LinkStatus::Done => "done",
            LinkStatus::Deleted => "deleted",
        }
    }

    /// Human-readable bucket name used in user-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            LinkStatus::Inbox => "Inbox",
            LinkStatus::Active => "Active list",
            LinkStatus::Later => "Later",
            LinkStatus::Done => "Saved",
            LinkStatus::Deleted => "Deleted",
        }
    }

    /// Statuses that still count as "in the queue".
    pub fn is_queued(&self) -> bool {
        matches!(
            self,
            LinkStatus::Inbox | LinkStatus::Active | LinkStatus::Later
        )
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inbox" => Ok(LinkStatus::Inbox),
            "active" => Ok(LinkStatus::Active),
            "later" => Ok(LinkStatus::Later),
            "done" => Ok(LinkStatus::Done),
            "deleted" => Ok(LinkStatus::Deleted),
            other => Err(crate::Error::InvalidInput(format!(
                "Unknown link status: {}",
                other
            ))),
        }
    }
}

/// Kind of content behind a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Article,
    Video,
    Podcast,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Article => "article",
            ContentType::Video => "video",
            ContentType::Podcast => "podcast",
        }
    }

    /// Lenient mapping for model output. Unknown values become `Article`.
    pub fn from_model(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("video") => ContentType::Video,
            Some("podcast") | Some("podd") => ContentType::Podcast,
            _ => ContentType::Article,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "article" => Ok(ContentType::Article),
            "video" => Ok(ContentType::Video),
            "podcast" => Ok(ContentType::Podcast),
            other => Err(crate::Error::InvalidInput(format!(
                "Unknown content type: {}",
                other
            ))),
        }
    }
}

// =============================================================================
// ENTITIES
// =============================================================================

/// A queued piece of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: Uuid,
    pub user_id: String,
    /// Source URL, or an `image://<millis>` placeholder for screenshots.
    pub url: String,
    pub title: String,
    pub summary: String,
    pub content_type: ContentType,
    /// Always >= 1.
    pub estimated_minutes: i32,
    pub status: LinkStatus,
    /// Set only when the link is completed.
    pub note: Option<String>,
    /// Inline data URL for image-originated links.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
    /// User-pasted text the analysis was based on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual_content: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Link {
    /// Whether this link was created from a screenshot without a source URL.
    pub fn is_image_placeholder(&self) -> bool {
        self.url.starts_with(defaults::IMAGE_URL_SCHEME)
    }

    pub fn tag_names(&self) -> Vec<String> {
        self.tags.iter().map(|t| t.tag_name.clone()).collect()
    }
}

/// A tag attached to a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub link_id: Uuid,
    /// Normalized: lowercase, at most 20 characters.
    pub tag_name: String,
    /// True when proposed by the analyzer rather than entered by the user.
    pub ai_suggested: bool,
    pub created_at: DateTime<Utc>,
}

/// A starred tag name used to order autocomplete suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteTag {
    pub id: Uuid,
    pub user_id: String,
    pub tag_name: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// REQUESTS
// =============================================================================

/// Tag to attach while creating a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDraft {
    pub name: String,
    pub ai_suggested: bool,
}

impl TagDraft {
    pub fn suggested(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ai_suggested: true,
        }
    }

    pub fn manual(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ai_suggested: false,
        }
    }
}

/// Fields for a new link. New links always start in `inbox`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLink {
    pub url: String,
    pub title: String,
    pub summary: String,
    pub content_type: ContentType,
    pub estimated_minutes: i32,
    pub image_data: Option<String>,
    pub manual_content: Option<String>,
    /// Already normalized.
    pub tags: Vec<TagDraft>,
}

/// Listing filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LinkFilter {
    pub status: Option<LinkStatus>,
    /// Case-insensitive tag name.
    pub tag: Option<String>,
    /// Include soft-deleted links (analytics only).
    #[serde(default)]
    pub include_deleted: bool,
}

impl LinkFilter {
    pub fn with_status(status: LinkStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Whether a link passes this filter.
    pub fn matches(&self, link: &Link) -> bool {
        if !self.include_deleted
            && link.status == LinkStatus::Deleted
            && self.status != Some(LinkStatus::Deleted)
        {
            return false;
        }
        if let Some(status) = self.status {
            if link.status != status {
                return false;
            }
        }
        if let Some(tag) = &self.tag {
            let wanted = tag.to_lowercase();
            if !link.tags.iter().any(|t| t.tag_name.to_lowercase() == wanted) {
                return false;
            }
        }
        true
    }
}

/// Request body for a status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateLinkStatusRequest {
    pub status: LinkStatus,
    #[serde(default)]
    pub note: Option<String>,
}

/// Why an intake attempt needs the user to supply details by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FallbackReason {
    /// LinkedIn posts cannot be extracted; ask for pasted text or a screenshot.
    #[serde(rename = "linkedin_post")]
    LinkedInPost,
    /// Content extraction failed.
    UrlUnreadable { code: String, message: String },
    /// The screenshot could not be analyzed.
    ImageUnanalyzed { code: String, message: String },
}

impl FallbackReason {
    pub fn kind(&self) -> &'static str {
        match self {
            FallbackReason::LinkedInPost => "linkedin_post",
            FallbackReason::UrlUnreadable { .. } => "url_unreadable",
            FallbackReason::ImageUnanalyzed { .. } => "image_unanalyzed",
        }
    }
}

// =============================================================================
// ANALYSIS
// =============================================================================

/// What the analyzer is asked to look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisInput {
    /// Extracted or pasted text.
    Text {
        content: String,
        existing_tags: Vec<String>,
    },
    /// `data:image/...;base64,...` URL.
    Image {
        data_url: String,
        existing_tags: Vec<String>,
    },
}

impl AnalysisInput {
    pub fn existing_tags(&self) -> &[String] {
        match self {
            AnalysisInput::Text { existing_tags, .. } => existing_tags,
            AnalysisInput::Image { existing_tags, .. } => existing_tags,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisInput::Text { .. } => "text",
            AnalysisInput::Image { .. } => "image",
        }
    }
}

/// Normalized analyzer result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub title: String,
    pub summary: String,
    pub content_type: ContentType,
    pub estimated_minutes: i32,
    pub tags: Vec<String>,
}

/// Clamp a model-provided estimate to a positive whole number of minutes.
///
/// Returns `None` for non-finite input.
pub fn clamp_estimated_minutes(raw: f64) -> Option<i32> {
    if !raw.is_finite() {
        return None;
    }
    let clamped = raw.max(1.0).round().min(f64::from(i32::MAX));
    Some(clamped as i32)
}
