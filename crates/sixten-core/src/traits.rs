//! Core traits for sixten abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy: the Postgres and in-memory link stores, and the hosted
//! content and analysis services.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{AnalysisError, FetchError, Result};
use crate::models::*;

// =============================================================================
// LINK STORE TRAITS
// =============================================================================

/// Repository for link CRUD and status changes.
///
/// Every method is scoped to `owner`; a link owned by someone else behaves
/// exactly like a missing one.
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Insert a link in `inbox` together with its tags, atomically.
    async fn create(&self, owner: &OwnerId, link: NewLink) -> Result<Link>;

    /// Fetch a link with its tags.
    async fn get(&self, owner: &OwnerId, id: Uuid) -> Result<Option<Link>>;

    /// List links newest first, tags attached.
    async fn list(&self, owner: &OwnerId, filter: &LinkFilter) -> Result<Vec<Link>>;

    /// Set the status. `note` is written only when `Some`, an absent note
    /// never clears a stored one. Fails with `LinkNotFound`.
    async fn update_status(
        &self,
        owner: &OwnerId,
        id: Uuid,
        status: LinkStatus,
        note: Option<&str>,
    ) -> Result<Link>;

    /// Mark the link `deleted`. The row is kept.
    async fn soft_delete(&self, owner: &OwnerId, id: Uuid) -> Result<()>;
}

/// Repository for per-link tags. Names passed in are already normalized.
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Append one tag to a link.
    async fn add(&self, owner: &OwnerId, link_id: Uuid, name: &str, ai_suggested: bool)
        -> Result<Tag>;

    /// Remove one tag from a link.
    async fn remove(&self, owner: &OwnerId, link_id: Uuid, tag_id: Uuid) -> Result<()>;

    /// Replace every tag on a link in one transaction.
    async fn replace(
        &self,
        owner: &OwnerId,
        link_id: Uuid,
        names: &[String],
        ai_suggested: bool,
    ) -> Result<Vec<Tag>>;

    /// Distinct tag names across the owner's non-deleted links, sorted.
    async fn list_names(&self, owner: &OwnerId) -> Result<Vec<String>>;
}

/// Repository for starred tag names.
#[async_trait]
pub trait FavoriteTagRepository: Send + Sync {
    async fn list(&self, owner: &OwnerId) -> Result<Vec<FavoriteTag>>;

    /// Star a tag name. Starring an already-starred name returns the existing row.
    async fn add(&self, owner: &OwnerId, name: &str) -> Result<FavoriteTag>;

    /// Unstar a tag name. Returns whether anything was removed.
    async fn remove(&self, owner: &OwnerId, name: &str) -> Result<bool>;
}

// =============================================================================
// EXTERNAL SERVICE TRAITS
// =============================================================================

/// Extracts readable text from a web page.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetch the page at `url` and return its plain text.
    async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError>;
}

/// Classifies and summarizes content with a hosted model.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, input: AnalysisInput) -> std::result::Result<Analysis, AnalysisError>;

    /// Model name, for logging.
    fn model_name(&self) -> &str;

    /// Whether a credential is configured.
    fn is_configured(&self) -> bool {
        true
    }
}
