//! URL helpers used at intake: input normalization, duplicate keys,
//! LinkedIn detection, stub titles and URL extraction from free text.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static SCHEME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^https?://").expect("valid scheme regex"));

static LEADING_WWW_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^www\.").expect("valid www regex"));

static URL_IN_TEXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)https?://[^\s<>"{}|\\^`\[\]]+"#).expect("valid url extraction regex")
});

static TRAILING_PUNCT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.,;:!?)]+$").expect("valid trailing punctuation regex"));

/// Normalize what a user typed into a fetchable URL.
///
/// Input that already carries an `http://` or `https://` scheme is returned
/// trimmed. Otherwise a leading `www.` is dropped and `https://` prepended,
/// so `gp.se` and `www.gp.se` both become `https://gp.se`.
pub fn normalize_input_url(input: &str) -> String {
    let trimmed = input.trim();
    if SCHEME_RE.is_match(trimmed) {
        return trimmed.to_string();
    }
    let without_www = LEADING_WWW_RE.replace(trimmed, "");
    format!("https://{}", without_www)
}

/// Key used to detect duplicate submissions.
///
/// The URL is parsed and re-serialized (lowercasing scheme and host,
/// resolving dot segments) and a single trailing slash is stripped.
/// Unparseable input falls back to a trimmed lowercase string.
pub fn normalize_for_dedup(raw: &str) -> String {
    match Url::parse(raw.trim()) {
        Ok(parsed) => {
            let href = parsed.as_str();
            href.strip_suffix('/').unwrap_or(href).to_string()
        }
        Err(_) => raw.trim().to_lowercase(),
    }
}

/// Whether two stored/submitted URLs refer to the same item.
pub fn is_same_link(a: &str, b: &str) -> bool {
    normalize_for_dedup(a) == normalize_for_dedup(b)
}

/// Whether the URL points at a LinkedIn post, which the reader cannot extract.
pub fn is_linkedin_post(raw: &str) -> bool {
    match Url::parse(raw.trim()) {
        Ok(parsed) => {
            let host_matches = parsed
                .host_str()
                .map(|h| h == "linkedin.com" || h.ends_with(".linkedin.com"))
                .unwrap_or(false);
            host_matches && parsed.path().contains("/posts/")
        }
        Err(_) => raw.contains("linkedin.com/posts/"),
    }
}

/// Title for a link saved without analysis: its host without `www.`.
pub fn domain_title(raw: &str) -> String {
    Url::parse(raw.trim())
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .map(|host| LEADING_WWW_RE.replace(&host, "").into_owned())
        .unwrap_or_else(|| raw.trim().to_string())
}

/// Pull `http(s)://` URLs out of free text.
///
/// Trailing sentence punctuation is stripped from each match and
/// duplicates are dropped, keeping first-seen order.
pub fn extract_urls(text: &str) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for m in URL_IN_TEXT_RE.find_iter(text) {
        let cleaned = TRAILING_PUNCT_RE.replace(m.as_str(), "").into_owned();
        if cleaned.is_empty() || urls.contains(&cleaned) {
            continue;
        }
        urls.push(cleaned);
    }
    urls
}
