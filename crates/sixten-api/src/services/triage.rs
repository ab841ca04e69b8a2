//! Triage controller: intake paths, status transitions and tag edits.
//!
//! Handlers stay thin and call into [`TriageService`]. Every mutation goes
//! through here so the transition table, the active-list capacity rule and
//! event emission are applied in one place.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use sixten_core::defaults::{
    FALLBACK_ESTIMATED_MINUTES, FALLBACK_SUMMARY, IMAGE_URL_SCHEME, MAX_IMAGE_BYTES,
    MAX_SUGGESTED_TAGS, MAX_TAGS_PER_LINK,
};
use sixten_core::urls::{domain_title, is_linkedin_post, is_same_link, normalize_input_url};
use sixten_core::{
    can_transition, normalize_tag, normalize_tags, suggest_tags, Analysis, AnalysisError,
    AnalysisInput, Analyzer, ContentFetcher, ContentType, Error, EventBus, FallbackReason,
    FavoriteTagRepository, Link, LinkFilter, LinkRepository, LinkStatus, NewLink, OwnerId,
    QueueStats, Result, ServerEvent, Tag, TagDraft, TagRepository, TagSuggestions, TriageLimits,
};
use sixten_inference::decode_image_data_url;

/// One way of putting something in the inbox.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum IntakeRequest {
    /// Fetch and analyze a URL.
    Url { url: String },
    /// Save a URL without analysis, after a failed fetch.
    UrlStub { url: String },
    /// Analyze text the user pasted for a URL that could not be fetched.
    UrlText { url: String, content: String },
    /// Analyze a screenshot.
    Image {
        data: String,
        #[serde(default)]
        source_url: Option<String>,
    },
    /// Save a screenshot with a title and tags entered by hand.
    ImageManual {
        data: String,
        title: String,
        #[serde(default)]
        tags: Vec<String>,
        #[serde(default)]
        source_url: Option<String>,
    },
}

impl IntakeRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            IntakeRequest::Url { .. } => "url",
            IntakeRequest::UrlStub { .. } => "url_stub",
            IntakeRequest::UrlText { .. } => "url_text",
            IntakeRequest::Image { .. } => "image",
            IntakeRequest::ImageManual { .. } => "image_manual",
        }
    }
}

/// Result of an intake attempt that did not fail outright.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum IntakeOutcome {
    Created { link: Link },
    /// Automatic intake could not finish; the client should offer the
    /// manual path that matches `reason`.
    FallbackRequired {
        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        reason: FallbackReason,
    },
}

/// Triage controller over the link store and the hosted services.
#[derive(Clone)]
pub struct TriageService {
    links: Arc<dyn LinkRepository>,
    tags: Arc<dyn TagRepository>,
    favorites: Arc<dyn FavoriteTagRepository>,
    fetcher: Arc<dyn ContentFetcher>,
    analyzer: Arc<dyn Analyzer>,
    events: EventBus,
    limits: TriageLimits,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn require_url(raw: &str) -> Result<String> {
    if raw.trim().is_empty() {
        return Err(Error::InvalidInput("A URL is required".to_string()));
    }
    Ok(normalize_input_url(raw))
}

impl TriageService {
    pub fn new(
        links: Arc<dyn LinkRepository>,
        tags: Arc<dyn TagRepository>,
        favorites: Arc<dyn FavoriteTagRepository>,
        fetcher: Arc<dyn ContentFetcher>,
        analyzer: Arc<dyn Analyzer>,
        events: EventBus,
        limits: TriageLimits,
    ) -> Self {
        Self {
            links,
            tags,
            favorites,
            fetcher,
            analyzer,
            events,
            limits,
        }
    }

    pub fn limits(&self) -> TriageLimits {
        self.limits
    }

    // =========================================================================
    // INTAKE
    // =========================================================================

    /// Run one intake path.
    ///
    /// Duplicate detection happens before any network call and fails with
    /// [`Error::Duplicate`].
    pub async fn intake(&self, owner: &OwnerId, request: IntakeRequest) -> Result<IntakeOutcome> {
        let start = Instant::now();
        let kind = request.kind();

        let outcome = match request {
            IntakeRequest::Url { url } => self.intake_url(owner, &url).await?,
            IntakeRequest::UrlStub { url } => {
                let url = self.checked_url(owner, &url).await?;
                if is_linkedin_post(&url) {
                    // Only pasted text or a screenshot can stand in for a post.
                    self.fallback(owner, Some(url), FallbackReason::LinkedInPost)
                } else {
                    let link = NewLink {
                        title: domain_title(&url),
                        summary: FALLBACK_SUMMARY.to_string(),
                        content_type: ContentType::Article,
                        estimated_minutes: FALLBACK_ESTIMATED_MINUTES,
                        image_data: None,
                        manual_content: None,
                        tags: Vec::new(),
                        url,
                    };
                    self.create(owner, link).await?
                }
            }
            IntakeRequest::UrlText { url, content } => {
                if content.trim().is_empty() {
                    return Err(Error::InvalidInput("Pasted text is empty".to_string()));
                }
                let url = self.checked_url(owner, &url).await?;
                let analysis = self.analyze_text(owner, content.clone()).await?;
                self.create(owner, analyzed_link(url, analysis, None, Some(content)))
                    .await?
            }
            IntakeRequest::Image { data, source_url } => {
                self.intake_image(owner, data, source_url).await?
            }
            IntakeRequest::ImageManual {
                data,
                title,
                tags,
                source_url,
            } => {
                let title = title.trim().to_string();
                if title.is_empty() {
                    return Err(Error::InvalidInput("A title is required".to_string()));
                }
                check_image(&data)?;
                let url = self.image_url(owner, source_url).await?;
                let link = NewLink {
                    url,
                    title,
                    summary: FALLBACK_SUMMARY.to_string(),
                    content_type: ContentType::Article,
                    estimated_minutes: FALLBACK_ESTIMATED_MINUTES,
                    image_data: Some(data),
                    manual_content: None,
                    tags: normalize_tags(tags.as_slice(), &[] as &[&str], MAX_SUGGESTED_TAGS)
                        .into_iter()
                        .map(TagDraft::manual)
                        .collect(),
                };
                self.create(owner, link).await?
            }
        };

        debug!(
            subsystem = "api",
            component = "triage",
            op = "intake",
            intake_kind = kind,
            created = matches!(outcome, IntakeOutcome::Created { .. }),
            duration_ms = start.elapsed().as_millis() as u64,
            "Intake finished"
        );

        Ok(outcome)
    }

    async fn intake_url(&self, owner: &OwnerId, raw: &str) -> Result<IntakeOutcome> {
        let url = self.checked_url(owner, raw).await?;

        if is_linkedin_post(&url) {
            return Ok(self.fallback(owner, Some(url), FallbackReason::LinkedInPost));
        }

        let content = match self.fetcher.fetch(&url).await {
            Ok(content) => content,
            Err(e) => {
                warn!(
                    subsystem = "api",
                    component = "triage",
                    op = "fetch",
                    error_code = e.code(),
                    error = %e,
                    "Content fetch failed, manual intake required"
                );
                let reason = FallbackReason::UrlUnreadable {
                    code: e.code().to_string(),
                    message: e.to_string(),
                };
                return Ok(self.fallback(owner, Some(url), reason));
            }
        };

        let analysis = self.analyze_text(owner, content).await?;

        self.create(owner, analyzed_link(url, analysis, None, None))
            .await
    }

    /// Analyze page or pasted text. An "unreadable image" verdict makes no
    /// sense for text and is treated as an unusable reply.
    async fn analyze_text(&self, owner: &OwnerId, content: String) -> Result<Analysis> {
        let input = AnalysisInput::Text {
            content,
            existing_tags: self.tags.list_names(owner).await?,
        };
        self.analyzer
            .analyze(input)
            .await
            .map_err(|e| match e {
                AnalysisError::UnreadableImage => AnalysisError::Upstream(
                    "model reported an unreadable image for text input".to_string(),
                ),
                other => other,
            })
            .map_err(Error::from)
    }

    async fn intake_image(
        &self,
        owner: &OwnerId,
        data: String,
        source_url: Option<String>,
    ) -> Result<IntakeOutcome> {
        check_image(&data)?;
        let url = self.image_url(owner, source_url).await?;

        let result = self
            .analyzer
            .analyze(AnalysisInput::Image {
                data_url: data.clone(),
                existing_tags: self.tags.list_names(owner).await?,
            })
            .await;

        match result {
            Ok(analysis) => {
                self.create(owner, analyzed_link(url, analysis, Some(data), None))
                    .await
            }
            Err(AnalysisError::InvalidImageFormat) => {
                Err(Error::Analysis(AnalysisError::InvalidImageFormat))
            }
            Err(e) => {
                let reason = FallbackReason::ImageUnanalyzed {
                    code: e.code().to_string(),
                    message: e.to_string(),
                };
                let url = (!url.starts_with(IMAGE_URL_SCHEME)).then_some(url);
                Ok(self.fallback(owner, url, reason))
            }
        }
    }

    /// Normalize a submitted URL and reject it when it is already queued.
    async fn checked_url(&self, owner: &OwnerId, raw: &str) -> Result<String> {
        let url = require_url(raw)?;
        self.ensure_not_duplicate(owner, &url).await?;
        Ok(url)
    }

    /// URL for an image link: the source URL when given, otherwise a
    /// unique `image://` placeholder.
    async fn image_url(&self, owner: &OwnerId, source_url: Option<String>) -> Result<String> {
        match non_blank(source_url) {
            Some(raw) => self.checked_url(owner, &raw).await,
            None => Ok(format!(
                "{}{}",
                IMAGE_URL_SCHEME,
                Utc::now().timestamp_millis()
            )),
        }
    }

    async fn ensure_not_duplicate(&self, owner: &OwnerId, url: &str) -> Result<()> {
        let existing = self.links.list(owner, &LinkFilter::default()).await?;
        if let Some(found) = existing.iter().find(|l| is_same_link(&l.url, url)) {
            debug!(
                subsystem = "api",
                component = "triage",
                op = "dedup",
                link_id = %found.id,
                status = %found.status,
                "Duplicate submission"
            );
            return Err(Error::Duplicate {
                status: found.status,
            });
        }
        Ok(())
    }

    async fn create(&self, owner: &OwnerId, new: NewLink) -> Result<IntakeOutcome> {
        let link = self.links.create(owner, new).await?;
        info!(
            subsystem = "api",
            component = "triage",
            op = "create",
            link_id = %link.id,
            tag_count = link.tags.len(),
            "Link added to inbox"
        );
        self.events.emit_for(
            owner.as_str(),
            ServerEvent::LinkCreated {
                link_id: link.id,
                title: link.title.clone(),
                status: link.status,
            },
        );
        Ok(IntakeOutcome::Created { link })
    }

    fn fallback(&self, owner: &OwnerId, url: Option<String>, reason: FallbackReason) -> IntakeOutcome {
        info!(
            subsystem = "api",
            component = "triage",
            op = "fallback",
            reason = reason.kind(),
            "Manual intake required"
        );
        self.events.emit_for(
            owner.as_str(),
            ServerEvent::IntakeFallbackRequired {
                url: url.clone(),
                reason: reason.clone(),
            },
        );
        IntakeOutcome::FallbackRequired { url, reason }
    }

    // =========================================================================
    // TRANSITIONS
    // =========================================================================

    /// Move a link to `target`.
    ///
    /// A note is only accepted when completing a link. Promotion to
    /// `active` is checked against the capacity limits before anything is
    /// written. Moving to `deleted` soft-deletes the link.
    pub async fn transition(
        &self,
        owner: &OwnerId,
        id: Uuid,
        target: LinkStatus,
        note: Option<String>,
    ) -> Result<Link> {
        let note = non_blank(note);
        if note.is_some() && target != LinkStatus::Done {
            return Err(Error::InvalidInput(
                "A note can only be added when marking a link as done".to_string(),
            ));
        }

        let link = self
            .links
            .get(owner, id)
            .await?
            .ok_or(Error::LinkNotFound(id))?;
        let from = link.status;

        if !can_transition(from, target) {
            return Err(Error::InvalidTransition { from, to: target });
        }

        if target == LinkStatus::Active {
            let active = self
                .links
                .list(owner, &LinkFilter::with_status(LinkStatus::Active))
                .await?;
            self.limits.check_links(&active, link.estimated_minutes)?;
        }

        let updated = if target == LinkStatus::Deleted {
            self.links.soft_delete(owner, id).await?;
            self.events
                .emit_for(owner.as_str(), ServerEvent::LinkDeleted { link_id: id });
            Link {
                status: LinkStatus::Deleted,
                updated_at: Utc::now(),
                ..link
            }
        } else {
            let updated = self
                .links
                .update_status(owner, id, target, note.as_deref())
                .await?;
            self.events.emit_for(
                owner.as_str(),
                ServerEvent::LinkStatusChanged {
                    link_id: id,
                    from,
                    to: target,
                },
            );
            updated
        };

        info!(
            subsystem = "api",
            component = "triage",
            op = "transition",
            link_id = %id,
            from = %from,
            to = %target,
            "Link status changed"
        );

        Ok(updated)
    }

    // =========================================================================
    // TAGS
    // =========================================================================

    /// Replace a link's tags with a user-curated set.
    pub async fn replace_tags(&self, owner: &OwnerId, id: Uuid, raw: &[String]) -> Result<Vec<Tag>> {
        self.editable_link(owner, id).await?;
        let names = normalize_tags(raw, &[] as &[&str], MAX_TAGS_PER_LINK);
        let tags = self.tags.replace(owner, id, &names, false).await?;
        self.emit_tags_changed(owner, id, &tags);
        Ok(tags)
    }

    /// Attach one user-entered tag.
    pub async fn add_tag(&self, owner: &OwnerId, id: Uuid, raw: &str) -> Result<Tag> {
        let name = normalize_tag(raw)
            .ok_or_else(|| Error::InvalidInput("Tag name is empty".to_string()))?;

        let link = self.editable_link(owner, id).await?;
        if link.tags.len() >= MAX_TAGS_PER_LINK {
            return Err(Error::InvalidInput(format!(
                "A link can have at most {} tags",
                MAX_TAGS_PER_LINK
            )));
        }

        let tag = self.tags.add(owner, id, &name, false).await?;
        let mut names = link.tag_names();
        names.push(tag.tag_name.clone());
        self.events.emit_for(
            owner.as_str(),
            ServerEvent::LinkTagsChanged {
                link_id: id,
                tags: names,
            },
        );
        Ok(tag)
    }

    /// Detach one tag.
    pub async fn remove_tag(&self, owner: &OwnerId, id: Uuid, tag_id: Uuid) -> Result<()> {
        self.editable_link(owner, id).await?;
        self.tags.remove(owner, id, tag_id).await?;
        if let Some(link) = self.links.get(owner, id).await? {
            self.emit_tags_changed(owner, id, &link.tags);
        }
        Ok(())
    }

    /// Load a link whose tags may still change. Deleted links are
    /// reported as missing.
    async fn editable_link(&self, owner: &OwnerId, id: Uuid) -> Result<Link> {
        match self.links.get(owner, id).await? {
            Some(link) if link.status != LinkStatus::Deleted => Ok(link),
            _ => Err(Error::LinkNotFound(id)),
        }
    }

    fn emit_tags_changed(&self, owner: &OwnerId, id: Uuid, tags: &[Tag]) {
        self.events.emit_for(
            owner.as_str(),
            ServerEvent::LinkTagsChanged {
                link_id: id,
                tags: tags.iter().map(|t| t.tag_name.clone()).collect(),
            },
        );
    }

    /// Autocomplete suggestions, excluding tags already on `link_id`.
    pub async fn suggest(
        &self,
        owner: &OwnerId,
        query: &str,
        link_id: Option<Uuid>,
    ) -> Result<TagSuggestions> {
        let all = self.tags.list_names(owner).await?;
        let favorites: Vec<String> = self
            .favorites
            .list(owner)
            .await?
            .into_iter()
            .map(|f| f.tag_name)
            .collect();
        let attached = match link_id {
            Some(id) => self
                .links
                .get(owner, id)
                .await?
                .map(|l| l.tag_names())
                .unwrap_or_default(),
            None => Vec::new(),
        };
        Ok(suggest_tags(query, &all, &favorites, &attached))
    }

    // =========================================================================
    // STATS
    // =========================================================================

    pub async fn stats(&self, owner: &OwnerId) -> Result<QueueStats> {
        let filter = LinkFilter {
            include_deleted: true,
            ..Default::default()
        };
        let links = self.links.list(owner, &filter).await?;
        Ok(QueueStats::compute(&links, Utc::now()))
    }
}

/// Validate a screenshot data URL and its decoded size.
fn check_image(data: &str) -> Result<()> {
    let payload = decode_image_data_url(data)?;
    if payload.decoded_len > MAX_IMAGE_BYTES {
        return Err(Error::InvalidInput(format!(
            "Image is too large ({} bytes, max {})",
            payload.decoded_len, MAX_IMAGE_BYTES
        )));
    }
    Ok(())
}

fn analyzed_link(
    url: String,
    analysis: Analysis,
    image_data: Option<String>,
    manual_content: Option<String>,
) -> NewLink {
    NewLink {
        url,
        title: analysis.title,
        summary: analysis.summary,
        content_type: analysis.content_type,
        estimated_minutes: analysis.estimated_minutes,
        image_data,
        manual_content,
        tags: analysis.tags.into_iter().map(TagDraft::suggested).collect(),
    }
}
