//! Centralized default constants for sixten.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates reference these constants instead of defining their own magic
//! numbers. Organized by domain area.

// =============================================================================
// OWNERSHIP
// =============================================================================

/// Owner used when no `SIXTEN_USER_ID` is configured.
pub const DEFAULT_USER_ID: &str = "user_1";

// =============================================================================
// TRIAGE
// =============================================================================

/// Maximum number of links in the active list.
pub const MAX_ACTIVE_LINKS: usize = 5;

/// Maximum summed estimate (minutes) of the active list.
pub const MAX_ACTIVE_MINUTES: i32 = 90;

/// Estimate used for links saved without analysis.
pub const FALLBACK_ESTIMATED_MINUTES: i32 = 5;

/// Summary used for links saved without analysis.
pub const FALLBACK_SUMMARY: &str = "Saved without AI analysis.";

/// Scheme prefix of the synthetic URL given to screenshot links.
pub const IMAGE_URL_SCHEME: &str = "image://";

/// Largest decoded screenshot accepted at intake (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

// =============================================================================
// TAGS
// =============================================================================

/// Cap on tags taken from one analysis or entered in the manual image fallback.
pub const MAX_SUGGESTED_TAGS: usize = 4;

/// Cap on tags attached to a single link.
pub const MAX_TAGS_PER_LINK: usize = 10;

/// Maximum characters in a tag name.
pub const MAX_TAG_LENGTH: usize = 20;

/// Suggestions returned per group by tag autocomplete.
pub const TAG_SUGGESTION_LIMIT: usize = 5;

// =============================================================================
// ANALYSIS
// =============================================================================

/// Characters of page text sent to the model.
pub const ANALYSIS_MAX_INPUT_CHARS: usize = 15_000;

/// Token budget for text analysis replies.
pub const ANALYSIS_TEXT_MAX_TOKENS: u32 = 500;

/// Token budget for image analysis replies.
pub const ANALYSIS_IMAGE_MAX_TOKENS: u32 = 1024;

/// Image media types the analyzer accepts.
pub const SUPPORTED_IMAGE_TYPES: [&str; 4] = ["image/png", "image/jpeg", "image/gif", "image/webp"];

/// Default Anthropic API base URL.
pub const ANTHROPIC_URL: &str = "https://api.anthropic.com";

/// Anthropic API version header value.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Default model for analysis.
pub const ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";

/// Default timeout for model requests, in seconds.
pub const ANTHROPIC_TIMEOUT_SECS: u64 = 60;

// =============================================================================
// CONTENT FETCHING
// =============================================================================

/// Default Jina Reader base URL.
pub const READER_URL: &str = "https://r.jina.ai";

/// Default timeout for reader requests, in seconds.
pub const READER_TIMEOUT_SECS: u64 = 30;

/// Bodies shorter than this are checked against the error fingerprints.
pub const UNREADABLE_BODY_THRESHOLD: usize = 200;

/// Substrings (lowercase) that mark a short 200 body as an error page.
pub const UNREADABLE_FINGERPRINTS: [&str; 8] = [
    "could not resolve",
    "failed to fetch",
    "unable to retrieve",
    "connection refused",
    "dns resolution failed",
    "page not found",
    "access denied",
    "err_name_not_resolved",
];

// =============================================================================
// SERVER
// =============================================================================

/// Default listen port.
pub const SERVER_PORT: u16 = 8888;

/// Default request body limit (fits a 5 MiB image as base64 plus JSON).
pub const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Event bus buffer capacity.
pub const EVENT_BUS_CAPACITY: usize = 256;

// =============================================================================
// STATS
// =============================================================================

/// Window for "this week" statistics, in days.
pub const STATS_WINDOW_DAYS: i64 = 7;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triage_limits() {
        assert_eq!(MAX_ACTIVE_LINKS, 5);
        assert_eq!(MAX_ACTIVE_MINUTES, 90);
    }

    #[test]
    fn test_tag_caps_are_ordered() {
        assert!(MAX_SUGGESTED_TAGS <= MAX_TAGS_PER_LINK);
        assert!(MAX_TAG_LENGTH > 0);
    }

    #[test]
    fn test_fingerprints_are_lowercase() {
        for fp in UNREADABLE_FINGERPRINTS {
            assert_eq!(fp, fp.to_lowercase());
        }
    }

    #[test]
    fn test_body_limit_fits_max_image() {
        // base64 inflates by 4/3
        assert!(MAX_BODY_BYTES > MAX_IMAGE_BYTES * 4 / 3);
    }
}
