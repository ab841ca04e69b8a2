//! Jina Reader fetcher against a mock server.

use sixten_core::{ContentFetcher, FetchError};
use sixten_inference::reader::{JinaReader, ReaderConfig};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TARGET: &str = "https://example.com/post";
const ENCODED_PATH: &str = "/https%3A%2F%2Fexample.com%2Fpost";

fn reader(server: &MockServer, api_key: Option<&str>) -> JinaReader {
    JinaReader::new(ReaderConfig {
        base_url: server.uri(),
        api_key: api_key.map(str::to_string),
        timeout_seconds: 5,
    })
    .expect("Failed to create reader")
}

#[tokio::test]
async fn test_fetch_sends_plain_text_accept_and_bearer() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ENCODED_PATH))
        .and(header("Accept", "text/plain"))
        .and(header("Authorization", "Bearer jina-key"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Title\n\nBody of the article."))
        .expect(1)
        .mount(&server)
        .await;

    let text = reader(&server, Some("jina-key")).fetch(TARGET).await.unwrap();
    assert_eq!(text, "Title\n\nBody of the article.");
}

#[tokio::test]
async fn test_fetch_without_key_sends_no_authorization() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Some page text"))
        .mount(&server)
        .await;

    reader(&server, None).fetch(TARGET).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_status_mapping() {
    let cases = [
        (404, "NOT_FOUND"),
        (403, "ACCESS_DENIED"),
        (500, "UPSTREAM_UNAVAILABLE"),
        (451, "UPSTREAM_UNAVAILABLE"),
    ];

    for (status, code) in cases {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        let err = reader(&server, None).fetch(TARGET).await.unwrap_err();
        assert_eq!(err.code(), code, "status {}", status);
    }
}

#[tokio::test]
async fn test_short_error_body_is_unreadable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("Failed to fetch https://example.com/post"),
        )
        .mount(&server)
        .await;

    let err = reader(&server, None).fetch(TARGET).await.unwrap_err();
    assert_eq!(err, FetchError::Unreadable);
}

#[tokio::test]
async fn test_blank_body_is_empty_content() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("   \n"))
        .mount(&server)
        .await;

    let err = reader(&server, None).fetch(TARGET).await.unwrap_err();
    assert_eq!(err, FetchError::EmptyContent);
}

#[tokio::test]
async fn test_unreachable_reader_is_upstream_unavailable() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let reader = JinaReader::new(ReaderConfig {
        base_url: uri,
        api_key: None,
        timeout_seconds: 2,
    })
    .unwrap();

    let err = reader.fetch(TARGET).await.unwrap_err();
    assert!(matches!(err, FetchError::UpstreamUnavailable(_)));
}
