//! Prompts and the model reply parser.
//!
//! The model is asked for a bare JSON object but routinely wraps it in prose
//! or code fences. [`parse_model_reply`] is the single boundary where that
//! text becomes a typed [`ModelReply`]; it never panics and every failure
//! is a [`ParseError`].

use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

use sixten_core::defaults::{MAX_SUGGESTED_TAGS, SUPPORTED_IMAGE_TYPES};
use sixten_core::{clamp_estimated_minutes, normalize_tags, Analysis, AnalysisError, ContentType};

// =============================================================================
// PROMPTS
// =============================================================================

const TEXT_PROMPT: &str = r#"Analyze the following content and reply ONLY with JSON (no other text):

{
  "title": "the content's title",
  "summary": "2-3 sentences describing the content",
  "type": "article" | "video" | "podcast",
  "estimatedMinutes": number,
  "tags": ["tag1", "tag2", "tag3"]
}

Rules:
- "type" is "article" for text content, "video" for YouTube/Vimeo and similar, "podcast" for podcasts and audio
- "estimatedMinutes" is a reasonable estimate of how long it takes to consume the content
- For articles, estimate from text length (about 200 words per minute)
- For video and podcasts, look for the duration in the content, otherwise estimate from the type
- "tags" holds 2-4 relevant tags describing the content
- Each tag is 1-2 words, short and descriptive
"#;

const IMAGE_PROMPT: &str = r#"Analyze this screenshot and reply ONLY with JSON (no other text):

{
  "title": "descriptive title for the image content (max 60 characters)",
  "summary": "2-3 sentences describing what the image shows, including all important text",
  "type": "article",
  "estimatedMinutes": number,
  "tags": ["tag1", "tag2", "tag3"]
}

Rules:
- Extract all text visible in the image and include it in the summary
- If the image is a screenshot of an article or post, summarize the content
- "estimatedMinutes" is how long it takes to read and understand the content (usually 1-5 minutes for a screenshot)
- "tags" holds 2-4 relevant tags describing the content
- Each tag is 1-2 words, short and descriptive
- If the image is unreadable or contains no text, reply with: {"error": "UNREADABLE_IMAGE"}
"#;

fn existing_tags_hint(existing_tags: &[String]) -> String {
    if existing_tags.is_empty() {
        return String::new();
    }
    format!(
        "- Prefer reusing these existing tags when they fit: {}\n",
        existing_tags.join(", ")
    )
}

/// Prompt for text analysis. `content` should already be truncated.
pub fn text_prompt(content: &str, existing_tags: &[String]) -> String {
    format!(
        "{}{}\nContent to analyze:\n{}",
        TEXT_PROMPT,
        existing_tags_hint(existing_tags),
        content
    )
}

/// Prompt sent alongside a screenshot.
pub fn image_prompt(existing_tags: &[String]) -> String {
    format!("{}{}", IMAGE_PROMPT, existing_tags_hint(existing_tags))
}

/// First `max_chars` characters of `s`, never splitting a code point.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

// =============================================================================
// IMAGE DATA URLS
// =============================================================================

static DATA_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^data:(image/[a-z]+);base64,(.+)$").expect("valid data url regex")
});

/// A validated `data:image/...;base64,...` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    /// Lowercase media type, one of the supported image types.
    pub media_type: String,
    /// Base64 payload as sent.
    pub data: String,
    /// Size of the decoded image.
    pub decoded_len: usize,
}

/// Validate and split an image data URL.
///
/// Fails with `InvalidImageFormat` when the URL does not match, the media
/// type is unsupported, or the payload is not valid base64.
pub fn decode_image_data_url(data_url: &str) -> Result<ImagePayload, AnalysisError> {
    let caps = DATA_URL_RE
        .captures(data_url.trim())
        .ok_or(AnalysisError::InvalidImageFormat)?;

    let media_type = caps[1].to_lowercase();
    if !SUPPORTED_IMAGE_TYPES.contains(&media_type.as_str()) {
        return Err(AnalysisError::InvalidImageFormat);
    }

    let data = caps[2].trim().to_string();
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(data.as_bytes())
        .map_err(|_| AnalysisError::InvalidImageFormat)?;

    Ok(ImagePayload {
        media_type,
        data,
        decoded_len: decoded.len(),
    })
}

// =============================================================================
// REPLY PARSING
// =============================================================================

/// What the model said, once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelReply {
    Analysis(Analysis),
    /// The model reported the image had nothing legible.
    UnreadableImage,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("reply contains no JSON object")]
    NoJsonObject,
    #[error("reply JSON is invalid: {0}")]
    InvalidJson(String),
    #[error("reply is missing required field '{0}'")]
    MissingField(&'static str),
    #[error("reply has an unusable estimate: {0}")]
    InvalidEstimate(String),
}

/// Span from the first `{` to the last `}`, inclusive.
pub fn extract_json_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

fn required_text(obj: &Map<String, Value>, key: &'static str) -> Result<String, ParseError> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or(ParseError::MissingField(key))
}

fn estimate(obj: &Map<String, Value>) -> Result<i32, ParseError> {
    let raw = match obj.get("estimatedMinutes") {
        None | Some(Value::Null) => return Err(ParseError::MissingField("estimatedMinutes")),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| ParseError::InvalidEstimate(n.to_string()))?,
        Some(Value::String(s)) if s.trim().is_empty() => {
            return Err(ParseError::MissingField("estimatedMinutes"))
        }
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ParseError::InvalidEstimate(s.clone()))?,
        Some(other) => return Err(ParseError::InvalidEstimate(other.to_string())),
    };
    clamp_estimated_minutes(raw).ok_or_else(|| ParseError::InvalidEstimate(raw.to_string()))
}

fn tags(obj: &Map<String, Value>) -> Vec<String> {
    let raw: Vec<&str> = obj
        .get("tags")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    normalize_tags(&raw, &[] as &[&str], MAX_SUGGESTED_TAGS)
}

/// Parse raw model output into a [`ModelReply`].
///
/// `title`, `summary` and `estimatedMinutes` are required. An unknown or
/// missing `type` becomes `article`, the estimate is rounded and clamped
/// to at least one minute, and tags are normalized and capped.
pub fn parse_model_reply(raw: &str) -> Result<ModelReply, ParseError> {
    let span = extract_json_span(raw).ok_or(ParseError::NoJsonObject)?;
    let value: Value =
        serde_json::from_str(span).map_err(|e| ParseError::InvalidJson(e.to_string()))?;
    let obj = value
        .as_object()
        .ok_or_else(|| ParseError::InvalidJson("not an object".to_string()))?;

    if obj.get("error").and_then(Value::as_str) == Some("UNREADABLE_IMAGE") {
        return Ok(ModelReply::UnreadableImage);
    }

    let title = required_text(obj, "title")?;
    let summary = required_text(obj, "summary")?;
    let estimated_minutes = estimate(obj)?;
    let content_type = ContentType::from_model(obj.get("type").and_then(Value::as_str));

    Ok(ModelReply::Analysis(Analysis {
        title,
        summary,
        content_type,
        estimated_minutes,
        tags: tags(obj),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(raw: &str) -> Analysis {
        match parse_model_reply(raw).expect("parses") {
            ModelReply::Analysis(a) => a,
            other => panic!("expected analysis, got {:?}", other),
        }
    }

    #[test]
    fn test_parses_bare_object() {
        let a = analysis(
            r#"{"title":"Rust 2024","summary":"About editions.","type":"article","estimatedMinutes":7,"tags":["Rust","Editions"]}"#,
        );
        assert_eq!(a.title, "Rust 2024");
        assert_eq!(a.content_type, ContentType::Article);
        assert_eq!(a.estimated_minutes, 7);
        assert_eq!(a.tags, vec!["rust", "editions"]);
    }

    #[test]
    fn test_parses_object_wrapped_in_prose_and_fences() {
        let raw = "Sure! Here you go:\n```json\n{\"title\":\"T\",\"summary\":\"S\",\"type\":\"video\",\"estimatedMinutes\":12}\n```\nHope that helps.";
        let a = analysis(raw);
        assert_eq!(a.content_type, ContentType::Video);
        assert!(a.tags.is_empty());
    }

    #[test]
    fn test_greedy_span_covers_nested_objects() {
        let raw = r#"x {"title":"T","summary":"S","estimatedMinutes":3,"meta":{"a":1}} y"#;
        assert_eq!(analysis(raw).estimated_minutes, 3);
    }

    #[test]
    fn test_two_objects_is_invalid_json() {
        let raw = r#"{"title":"A"} and {"title":"B"}"#;
        assert!(matches!(
            parse_model_reply(raw),
            Err(ParseError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_no_object() {
        assert_eq!(parse_model_reply("no json here"), Err(ParseError::NoJsonObject));
        assert_eq!(parse_model_reply("} backwards {"), Err(ParseError::NoJsonObject));
        assert_eq!(parse_model_reply(""), Err(ParseError::NoJsonObject));
    }

    #[test]
    fn test_unreadable_image_marker() {
        assert_eq!(
            parse_model_reply(r#"{"error": "UNREADABLE_IMAGE"}"#),
            Ok(ModelReply::UnreadableImage)
        );
    }

    #[test]
    fn test_missing_required_fields() {
        assert_eq!(
            parse_model_reply(r#"{"summary":"S","estimatedMinutes":3}"#),
            Err(ParseError::MissingField("title"))
        );
        assert_eq!(
            parse_model_reply(r#"{"title":"T","summary":"  ","estimatedMinutes":3}"#),
            Err(ParseError::MissingField("summary"))
        );
        assert_eq!(
            parse_model_reply(r#"{"title":"T","summary":"S"}"#),
            Err(ParseError::MissingField("estimatedMinutes"))
        );
    }

    #[test]
    fn test_estimate_rounding_and_clamping() {
        let base = |e: &str| {
            format!(r#"{{"title":"T","summary":"S","estimatedMinutes":{}}}"#, e)
        };
        assert_eq!(analysis(&base("0")).estimated_minutes, 1);
        assert_eq!(analysis(&base("-4")).estimated_minutes, 1);
        assert_eq!(analysis(&base("2.5")).estimated_minutes, 3);
        assert_eq!(analysis(&base("\"8\"")).estimated_minutes, 8);
        assert_eq!(analysis(&base("\" 4.4 \"")).estimated_minutes, 4);
        assert!(matches!(
            parse_model_reply(&base("\"soon\"")),
            Err(ParseError::InvalidEstimate(_))
        ));
        assert!(matches!(
            parse_model_reply(&base("[5]")),
            Err(ParseError::InvalidEstimate(_))
        ));
    }

    #[test]
    fn test_content_type_coercion() {
        let with_type = |t: &str| {
            format!(
                r#"{{"title":"T","summary":"S","estimatedMinutes":3,"type":"{}"}}"#,
                t
            )
        };
        assert_eq!(analysis(&with_type("podd")).content_type, ContentType::Podcast);
        assert_eq!(analysis(&with_type("Podcast")).content_type, ContentType::Podcast);
        assert_eq!(analysis(&with_type("artikel")).content_type, ContentType::Article);
        assert_eq!(analysis(&with_type("newsletter")).content_type, ContentType::Article);
    }

    #[test]
    fn test_tags_filtered_and_capped() {
        let a = analysis(
            r#"{"title":"T","summary":"S","estimatedMinutes":3,"tags":["AI",42,"","ai","Research","ML","Business","Extra"]}"#,
        );
        assert_eq!(a.tags, vec!["ai", "research", "ml", "business"]);

        let a = analysis(r#"{"title":"T","summary":"S","estimatedMinutes":3,"tags":"AI"}"#);
        assert!(a.tags.is_empty());
    }

    #[test]
    fn test_truncate_chars_respects_code_points() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
        let long = "ö".repeat(20_000);
        assert_eq!(truncate_chars(&long, 15_000).chars().count(), 15_000);
    }

    #[test]
    fn test_text_prompt_mentions_existing_tags() {
        let prompt = text_prompt("body", &["rust".into(), "ai".into()]);
        assert!(prompt.contains("rust, ai"));
        assert!(prompt.ends_with("body"));
        assert!(!text_prompt("body", &[]).contains("Prefer reusing"));
        assert!(image_prompt(&[]).contains("UNREADABLE_IMAGE"));
    }

    #[test]
    fn test_decode_image_data_url() {
        let payload = decode_image_data_url("data:image/PNG;base64,aGVsbG8=").unwrap();
        assert_eq!(payload.media_type, "image/png");
        assert_eq!(payload.data, "aGVsbG8=");
        assert_eq!(payload.decoded_len, 5);
    }

    #[test]
    fn test_decode_image_data_url_rejects_bad_input() {
        for bad in [
            "not a data url",
            "data:text/plain;base64,aGVsbG8=",
            "data:image/bmp;base64,aGVsbG8=",
            "data:image/png;base64,!!!notbase64!!!",
            "data:image/png,aGVsbG8=",
        ] {
            assert_eq!(
                decode_image_data_url(bad),
                Err(AnalysisError::InvalidImageFormat),
                "{}",
                bad
            );
        }
    }
}
