//! Router tests over the in-memory store with stubbed hosted services.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use sixten_api::{router, AppState};
use sixten_core::{
    Analysis, AnalysisError, AnalysisInput, Analyzer, ContentFetcher, ContentType, FetchError,
    LinkRepository, LinkStatus, NewLink, OwnerId, TriageLimits,
};
use sixten_db::MemoryStore;

const PNG_DATA_URL: &str = "data:image/png;base64,iVBORw0KGgo=";

struct StubFetcher {
    result: Result<String, FetchError>,
    calls: AtomicUsize,
}

#[async_trait]
impl ContentFetcher for StubFetcher {
    async fn fetch(&self, _url: &str) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

struct StubAnalyzer {
    result: Result<Analysis, AnalysisError>,
    configured: bool,
    calls: AtomicUsize,
}

#[async_trait]
impl Analyzer for StubAnalyzer {
    async fn analyze(&self, _input: AnalysisInput) -> Result<Analysis, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }

    fn model_name(&self) -> &str {
        "stub-model"
    }

    fn is_configured(&self) -> bool {
        self.configured
    }
}

fn analysis(minutes: i32) -> Analysis {
    Analysis {
        title: "Async Rust in practice".to_string(),
        summary: "How to structure async services.".to_string(),
        content_type: ContentType::Article,
        estimated_minutes: minutes,
        tags: vec!["rust".to_string(), "async".to_string()],
    }
}

struct TestApp {
    app: Router,
    state: AppState,
    store: MemoryStore,
    fetcher: Arc<StubFetcher>,
    analyzer: Arc<StubAnalyzer>,
}

impl TestApp {
    fn new() -> Self {
        Self::with_services(Ok("Article body text".to_string()), Ok(analysis(7)), true)
    }

    fn with_services(
        fetch: Result<String, FetchError>,
        analyze: Result<Analysis, AnalysisError>,
        configured: bool,
    ) -> Self {
        let store = MemoryStore::new();
        let fetcher = Arc::new(StubFetcher {
            result: fetch,
            calls: AtomicUsize::new(0),
        });
        let analyzer = Arc::new(StubAnalyzer {
            result: analyze,
            configured,
            calls: AtomicUsize::new(0),
        });
        let state = AppState::with_memory_store(
            store.clone(),
            fetcher.clone(),
            analyzer.clone(),
            TriageLimits::default(),
            OwnerId::default(),
        );
        Self {
            app: router(state.clone()),
            state,
            store,
            fetcher,
            analyzer,
        }
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    async fn set_status(&self, id: &str, status: &str) -> (StatusCode, Value) {
        self.send(
            Method::PATCH,
            &format!("/api/links/{}/status", id),
            Some(json!({ "status": status })),
        )
        .await
    }

    /// Insert a link straight into the store with a given estimate.
    async fn seed(&self, url: &str, minutes: i32) -> String {
        let link = LinkRepository::create(
            &self.store,
            &OwnerId::default(),
            NewLink {
                url: url.to_string(),
                title: url.to_string(),
                summary: String::new(),
                content_type: ContentType::Article,
                estimated_minutes: minutes,
                image_data: None,
                manual_content: None,
                tags: Vec::new(),
            },
        )
        .await
        .unwrap();
        link.id.to_string()
    }

    async fn seed_active(&self, url: &str, minutes: i32) -> String {
        let id = self.seed(url, minutes).await;
        LinkRepository::update_status(
            &self.store,
            &OwnerId::default(),
            id.parse().unwrap(),
            LinkStatus::Active,
            None,
        )
        .await
        .unwrap();
        id
    }
}

// =============================================================================
// HEALTH AND PROXIES
// =============================================================================

#[tokio::test]
async fn test_health() {
    let t = TestApp::new();
    let (status, body) = t.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["analyzer"]["model"], "stub-model");
    assert_eq!(body["analyzer"]["configured"], true);
}

#[tokio::test]
async fn test_analyze_text() {
    let t = TestApp::new();
    let (status, body) = t
        .post(
            "/api/analyze",
            json!({ "type": "url", "data": "some page text", "existingTags": ["rust"] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["title"], "Async Rust in practice");
    assert_eq!(body["contentType"], "article");
    assert_eq!(body["estimatedMinutes"], 7);
    assert_eq!(body["tags"], json!(["rust", "async"]));
}

#[tokio::test]
async fn test_analyze_legacy_content_shape() {
    let t = TestApp::new();
    let (status, body) = t.post("/api/analyze", json!({ "content": "text" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_analyze_rejects_bad_bodies() {
    let t = TestApp::new();

    let (status, body) = t.post("/api/analyze", json!({ "type": "pdf" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "INVALID_REQUEST");

    let (status, _) = t.post("/api/analyze", json!({ "content": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = t
        .post("/api/analyze", json!({ "type": "pdf", "content": "text" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_REQUEST");
    assert_eq!(t.analyzer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_analyze_unreadable_image_is_200() {
    let t = TestApp::with_services(Ok(String::new()), Err(AnalysisError::UnreadableImage), true);
    let (status, body) = t
        .post("/api/analyze", json!({ "type": "image", "data": PNG_DATA_URL }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "UNREADABLE_IMAGE");
}

#[tokio::test]
async fn test_analyze_rate_limited() {
    let t = TestApp::with_services(Ok(String::new()), Err(AnalysisError::RateLimited), true);
    let (status, body) = t.post("/api/analyze", json!({ "content": "text" })).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "RATE_LIMITED");
}

#[tokio::test]
async fn test_analyze_not_configured_checked_first() {
    let t = TestApp::with_services(Ok(String::new()), Ok(analysis(3)), false);
    let (status, body) = t.post("/api/analyze", json!({ "bogus": true })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "NOT_CONFIGURED");
}

#[tokio::test]
async fn test_fetch_content() {
    let t = TestApp::new();
    let (status, body) = t
        .post("/api/fetch-content", json!({ "url": "example.com/post" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "Article body text");
    assert_eq!(body["url"], "https://example.com/post");
}

#[tokio::test]
async fn test_fetch_content_errors() {
    let t = TestApp::with_services(Err(FetchError::Unreadable), Ok(analysis(3)), true);
    let (status, body) = t
        .post("/api/fetch-content", json!({ "url": "https://example.com" }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "UNREADABLE");

    let t = TestApp::with_services(Err(FetchError::NotFound), Ok(analysis(3)), true);
    let (status, body) = t
        .post("/api/fetch-content", json!({ "url": "https://example.com" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = t.post("/api/fetch-content", json!({ "url": " " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_email_webhook_form() {
    let t = TestApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/email-webhook")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(
            "subject=Read+https%3A%2F%2Fexample.com%2Fa&text=also+https%3A%2F%2Fexample.org%2Fb",
        ))
        .unwrap();
    let response = t.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], "Email processed");
    assert_eq!(body["urlsFound"], 2);
    assert_eq!(
        body["urls"],
        json!(["https://example.com/a", "https://example.org/b"])
    );
}

// =============================================================================
// INTAKE
// =============================================================================

#[tokio::test]
async fn test_url_intake_creates_inbox_link() {
    let t = TestApp::new();
    let mut events = t.state.event_bus.subscribe();

    let (status, body) = t
        .post("/api/links", json!({ "type": "url", "url": "example.com/post" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["url"], "https://example.com/post");
    assert_eq!(body["status"], "inbox");
    assert_eq!(body["estimated_minutes"], 7);
    assert_eq!(body["tags"].as_array().unwrap().len(), 2);
    assert_eq!(body["tags"][0]["ai_suggested"], true);

    let envelope = events.recv().await.unwrap();
    assert_eq!(envelope.event_type, "link.created");
    assert_eq!(body["id"], envelope.entity_id.unwrap());
}

#[tokio::test]
async fn test_duplicate_url_is_rejected_before_fetch() {
    let t = TestApp::new();
    let (status, _) = t
        .post("/api/links", json!({ "type": "url", "url": "https://example.com/a" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = t
        .post("/api/links", json!({ "type": "url", "url": "https://example.com/a/" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE");
    assert_eq!(body["status"], "inbox");
    assert_eq!(t.fetcher.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_linkedin_post_requires_fallback() {
    let t = TestApp::new();
    let (status, body) = t
        .post(
            "/api/links",
            json!({ "type": "url", "url": "https://www.linkedin.com/posts/someone_activity-123" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "fallback_required");
    assert_eq!(body["reason"]["kind"], "linkedin_post");
    assert_eq!(t.fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unreadable_url_requires_fallback() {
    let t = TestApp::with_services(Err(FetchError::AccessDenied), Ok(analysis(3)), true);
    let (status, body) = t
        .post("/api/links", json!({ "type": "url", "url": "https://example.com/x" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["url"], "https://example.com/x");
    assert_eq!(body["reason"]["kind"], "url_unreadable");
    assert_eq!(body["reason"]["code"], "ACCESS_DENIED");

    let (_, links) = t.get("/api/links").await;
    assert!(links.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_text_intake_unreadable_verdict_is_upstream_error() {
    let t = TestApp::with_services(
        Ok("Article body text".to_string()),
        Err(AnalysisError::UnreadableImage),
        true,
    );

    let (status, body) = t
        .post("/api/links", json!({ "type": "url", "url": "https://example.com/odd" }))
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "UPSTREAM_ERROR");

    let (status, body) = t
        .post(
            "/api/links",
            json!({ "type": "url_text", "url": "https://example.com/odd", "content": "pasted" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "UPSTREAM_ERROR");

    let (_, links) = t.get("/api/links").await;
    assert!(links.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_linkedin_post_cannot_be_saved_as_stub() {
    let t = TestApp::new();
    let (status, body) = t
        .post(
            "/api/links",
            json!({ "type": "url_stub", "url": "https://www.linkedin.com/posts/someone_activity-1" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "fallback_required");
    assert_eq!(body["reason"]["kind"], "linkedin_post");

    let (_, links) = t.get("/api/links").await;
    assert!(links.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_url_stub_and_pasted_text() {
    let t = TestApp::new();
    let (status, body) = t
        .post("/api/links", json!({ "type": "url_stub", "url": "https://www.example.com/x" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["title"], "example.com");
    assert_eq!(body["estimated_minutes"], 5);
    assert_eq!(t.analyzer.calls.load(Ordering::SeqCst), 0);

    let (status, body) = t
        .post(
            "/api/links",
            json!({ "type": "url_text", "url": "https://example.org/y", "content": "pasted" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["manual_content"], "pasted");
    assert_eq!(t.fetcher.calls.load(Ordering::SeqCst), 0);

    let (status, _) = t
        .post(
            "/api/links",
            json!({ "type": "url_text", "url": "https://example.org/z", "content": " " }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_image_intake() {
    let t = TestApp::new();
    let (status, body) = t
        .post("/api/links", json!({ "type": "image", "data": PNG_DATA_URL }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["url"].as_str().unwrap().starts_with("image://"));
    assert_eq!(body["image_data"], PNG_DATA_URL);

    let (status, body) = t
        .post("/api/links", json!({ "type": "image", "data": "data:image/svg+xml;base64,PHN2Zz4=" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_IMAGE_FORMAT");
}

#[tokio::test]
async fn test_unreadable_image_requires_fallback() {
    let t = TestApp::with_services(Ok(String::new()), Err(AnalysisError::UnreadableImage), true);
    let (status, body) = t
        .post("/api/links", json!({ "type": "image", "data": PNG_DATA_URL }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reason"]["kind"], "image_unanalyzed");
    assert!(body.get("url").is_none());
}

#[tokio::test]
async fn test_manual_image_intake() {
    let t = TestApp::new();
    let (status, _) = t
        .post("/api/links", json!({ "type": "image_manual", "data": PNG_DATA_URL, "title": " " }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = t
        .post(
            "/api/links",
            json!({
                "type": "image_manual",
                "data": PNG_DATA_URL,
                "title": "Whiteboard",
                "tags": ["One", "two", "three", "four", "five"],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["title"], "Whiteboard");
    assert_eq!(body["tags"].as_array().unwrap().len(), 4);
    assert_eq!(body["tags"][0]["tag_name"], "one");
    assert_eq!(body["tags"][0]["ai_suggested"], false);
    assert_eq!(t.analyzer.calls.load(Ordering::SeqCst), 0);
}

// =============================================================================
// TRANSITIONS
// =============================================================================

#[tokio::test]
async fn test_triage_flow_with_note() {
    let t = TestApp::new();
    let id = t.seed("https://example.com/flow", 10).await;

    let (status, body) = t.set_status(&id, "active").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "active");

    let (status, body) = t
        .send(
            Method::PATCH,
            &format!("/api/links/{}/status", id),
            Some(json!({ "status": "done", "note": "  worth it  " })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "done");
    assert_eq!(body["note"], "worth it");

    let (status, body) = t.set_status(&id, "active").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INVALID_TRANSITION");
}

#[tokio::test]
async fn test_note_only_on_done() {
    let t = TestApp::new();
    let id = t.seed("https://example.com/note", 10).await;
    let (status, _) = t
        .send(
            Method::PATCH,
            &format!("/api/links/{}/status", id),
            Some(json!({ "status": "later", "note": "nope" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_link_is_404() {
    let t = TestApp::new();
    let (status, body) = t.set_status(&Uuid::now_v7().to_string(), "active").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_active_list_count_limit() {
    let t = TestApp::new();
    for i in 0..5 {
        t.seed_active(&format!("https://example.com/{}", i), 5).await;
    }
    let id = t.seed("https://example.com/sixth", 5).await;

    let (status, body) = t.set_status(&id, "active").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ACTIVE_LIST_FULL");
}

#[tokio::test]
async fn test_active_list_minutes_limit() {
    let t = TestApp::new();
    for (i, minutes) in [25, 20, 20, 20].into_iter().enumerate() {
        t.seed_active(&format!("https://example.com/{}", i), minutes)
            .await;
    }

    let long = t.seed("https://example.com/long", 10).await;
    let (status, body) = t.set_status(&long, "active").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ACTIVE_MINUTES_EXCEEDED");
    assert_eq!(body["remainingMinutes"], 5);

    let short = t.seed("https://example.com/short", 5).await;
    let (status, _) = t.set_status(&short, "active").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_follows_transition_table() {
    let t = TestApp::new();
    let inbox = t.seed("https://example.com/gone", 5).await;
    let active = t.seed_active("https://example.com/busy", 5).await;

    let (status, _) = t
        .send(Method::DELETE, &format!("/api/links/{}", inbox), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = t
        .send(Method::DELETE, &format!("/api/links/{}", active), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, links) = t.get("/api/links").await;
    assert_eq!(links.as_array().unwrap().len(), 1);

    let (_, deleted) = t.get("/api/links?status=deleted").await;
    assert_eq!(deleted[0]["id"], inbox);
}

#[tokio::test]
async fn test_list_filters() {
    let t = TestApp::new();
    t.seed("https://example.com/1", 5).await;
    t.seed_active("https://example.com/2", 5).await;

    let (status, body) = t.get("/api/links?status=active").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = t.get("/api/links?status=archived").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// TAGS, FAVORITES, STATS
// =============================================================================

#[tokio::test]
async fn test_link_tag_edits() {
    let t = TestApp::new();
    let id = t.seed("https://example.com/tags", 5).await;
    let uri = format!("/api/links/{}/tags", id);

    let (status, body) = t
        .send(Method::PUT, &uri, Some(json!({ "tags": ["Rust", " rust ", "Databases"] })))
        .await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["tag_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["rust", "databases"]);

    let (status, tag) = t.post(&uri, json!({ "tag": "Async" })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(tag["tag_name"], "async");

    let (status, _) = t.post(&uri, json!({ "tag": "ASYNC" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = t
        .send(
            Method::DELETE,
            &format!("{}/{}", uri, tag["id"].as_str().unwrap()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, link) = t.get(&format!("/api/links/{}", id)).await;
    assert_eq!(link["tags"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_deleted_link_tags_are_frozen() {
    let t = TestApp::new();
    let id = t.seed("https://example.com/gone", 5).await;
    let uri = format!("/api/links/{}/tags", id);

    let (status, tag) = t.post(&uri, json!({ "tag": "keep" })).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = t
        .send(Method::DELETE, &format!("/api/links/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = t.post(&uri, json!({ "tag": "zombie" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = t
        .send(Method::PUT, &uri, Some(json!({ "tags": ["a", "b"] })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = t
        .send(
            Method::DELETE,
            &format!("{}/{}", uri, tag["id"].as_str().unwrap()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, deleted) = t.get("/api/links?status=deleted").await;
    let names: Vec<&str> = deleted[0]["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["tag_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["keep"]);
}

#[tokio::test]
async fn test_favorites_and_suggestions() {
    let t = TestApp::new();
    let (status, _) = t
        .post("/api/links", json!({ "type": "url", "url": "https://example.com/s" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, fav) = t.post("/api/favorite-tags", json!({ "tag": "Async" })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(fav["tag_name"], "async");

    let (_, suggestions) = t.get("/api/tags?q=s").await;
    assert_eq!(suggestions["favorites"], json!(["async"]));
    assert_eq!(suggestions["others"], json!(["rust"]));

    let (_, favorites) = t.get("/api/favorite-tags").await;
    assert_eq!(favorites.as_array().unwrap().len(), 1);

    let (status, _) = t
        .send(Method::DELETE, "/api/favorite-tags/async", None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = t
        .send(Method::DELETE, "/api/favorite-tags/async", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stats() {
    let t = TestApp::new();
    t.seed("https://example.com/1", 5).await;
    t.seed_active("https://example.com/2", 20).await;
    let done = t.seed_active("https://example.com/3", 15).await;
    let (status, _) = t.set_status(&done, "done").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = t.get("/api/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["addedThisWeek"], 3);
    assert_eq!(body["handledThisWeek"], 1);
    assert_eq!(body["queueCount"], 2);
    assert_eq!(body["activeCount"], 1);
    assert_eq!(body["activeMinutes"], 20);
    assert_eq!(body["remainingMinutes"], 70);
}

#[tokio::test]
async fn test_event_stream_headers() {
    let t = TestApp::new();
    let request = Request::builder()
        .uri("/api/events")
        .body(Body::empty())
        .unwrap();
    let response = t.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );
    assert_eq!(t.state.event_bus.subscriber_count(), 1);
}
