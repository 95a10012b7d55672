//! Tests for the remote module

use super::*;
use crate::config::{ListingConfig, RemoteConfig};
use crate::error::FetchError;
use crate::types::BackoffType;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn listing_body(names: &[&str], after: Option<&str>) -> Value {
    let children: Vec<Value> = names
        .iter()
        .map(|n| json!({ "kind": "t3", "data": { "name": n, "title": format!("title {n}") } }))
        .collect();
    json!({ "data": { "children": children, "after": after, "before": null } })
}

fn test_client(max_retries: u32) -> HttpClient {
    HttpClient::new(HttpClientConfig {
        timeout: Duration::from_millis(500),
        max_retries,
        initial_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(5),
        backoff_type: BackoffType::Constant,
        requests_per_second: 0,
        burst_size: 0,
        user_agent: "page-mediator-tests".to_string(),
    })
    .unwrap()
}

fn fetcher(base_url: &str, max_retries: u32) -> ListingFetcher {
    ListingFetcher::with_client(RemoteConfig::new(base_url), test_client(max_retries)).unwrap()
}

// ============================================================================
// Listing decoding
// ============================================================================

#[test]
fn test_decode_listing_default_layout() {
    let page = decode_listing(
        &ListingConfig::default(),
        "rust",
        &listing_body(&["a", "b"], Some("t3_b")),
    )
    .unwrap();

    let names: Vec<_> = page.items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert!(page.items.iter().all(|i| i.partition == "rust"));
    assert_eq!(page.items[0].payload["title"], "title a");
    assert_eq!(page.after.as_deref(), Some("t3_b"));
    assert!(page.before.is_none());
}

#[test]
fn test_decode_listing_flat_layout() {
    let listing = ListingConfig {
        records_path: "$.items".to_string(),
        item_path: String::new(),
        after_path: "paging.next".to_string(),
        before_path: "paging.prev".to_string(),
        name_field: "id".to_string(),
    };
    let body = json!({
        "items": [{ "id": 7 }, { "id": 8 }],
        "paging": { "next": "", "prev": "p0" }
    });

    let page = decode_listing(&listing, "feed", &body).unwrap();
    assert_eq!(page.items[0].name, "7");
    // empty cursor means end of list
    assert!(page.after.is_none());
    assert_eq!(page.before.as_deref(), Some("p0"));
}

#[test]
fn test_decode_listing_rejects_malformed() {
    let listing = ListingConfig::default();

    let err = decode_listing(&listing, "rust", &json!({ "data": {} })).unwrap_err();
    assert!(matches!(err, FetchError::InvalidResponse { .. }));

    let body = json!({ "data": { "children": [{ "data": { "title": "nameless" } }] } });
    let err = decode_listing(&listing, "rust", &body).unwrap_err();
    assert!(err.to_string().contains("'name'"));
}

#[test]
fn test_listing_url_encodes_partition() {
    let fetcher = fetcher("https://api.example.com/base/", 0);
    assert_eq!(
        fetcher.listing_url("rust").as_str(),
        "https://api.example.com/base/r/rust/hot.json"
    );
    assert_eq!(
        fetcher.listing_url("a b/c").as_str(),
        "https://api.example.com/base/r/a%20b%2Fc/hot.json"
    );
}

#[test]
fn test_backoff_calculation() {
    let mut config = HttpClientConfig {
        initial_backoff: Duration::from_millis(100),
        max_backoff: Duration::from_secs(1),
        backoff_type: BackoffType::Exponential,
        ..HttpClientConfig::default()
    };
    let client = HttpClient::new(config.clone()).unwrap();
    assert_eq!(client.calculate_backoff(0), Duration::from_millis(100));
    assert_eq!(client.calculate_backoff(2), Duration::from_millis(400));
    assert_eq!(client.calculate_backoff(10), Duration::from_secs(1));

    config.backoff_type = BackoffType::Linear;
    let client = HttpClient::new(config).unwrap();
    assert_eq!(client.calculate_backoff(2), Duration::from_millis(300));
    assert!(client.has_rate_limiter());
}

// ============================================================================
// Fetching
// ============================================================================

#[tokio::test]
async fn test_fetch_first_page_sends_no_after() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/rust/hot.json"))
        .and(query_param_is_missing("after"))
        .and(query_param("limit", "60"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_body(&["a"], Some("t1"))))
        .expect(1)
        .mount(&server)
        .await;

    let page = fetcher(&server.uri(), 0)
        .fetch_page(&FetchRequest::after("rust", None, 60))
        .await
        .unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.after.as_deref(), Some("t1"));
}

#[tokio::test]
async fn test_fetch_next_page_sends_after() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/rust/hot.json"))
        .and(query_param("after", "t1"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_body(&[], None)))
        .expect(1)
        .mount(&server)
        .await;

    let page = fetcher(&server.uri(), 0)
        .fetch_page(&FetchRequest::after("rust", Some("t1".to_string()), 20))
        .await
        .unwrap();

    assert!(page.items.is_empty());
    assert!(page.after.is_none());
}

#[tokio::test]
async fn test_fetch_remote_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_string("private"))
        .expect(1)
        .mount(&server)
        .await;

    let err = fetcher(&server.uri(), 3)
        .fetch_page(&FetchRequest::after("rust", None, 20))
        .await
        .unwrap_err();

    assert_eq!(err, FetchError::remote(403, "private"));
    assert!(err.is_remote());
}

#[tokio::test]
async fn test_fetch_retries_server_error_when_enabled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_body(&["a"], None)))
        .mount(&server)
        .await;

    let page = fetcher(&server.uri(), 1)
        .fetch_page(&FetchRequest::after("rust", None, 20))
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
}

#[tokio::test]
async fn test_fetch_single_attempt_by_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let err = fetcher(&server.uri(), 0)
        .fetch_page(&FetchRequest::after("rust", None, 20))
        .await
        .unwrap_err();
    assert_eq!(err, FetchError::remote(503, ""));
}

#[tokio::test]
async fn test_fetch_invalid_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = fetcher(&server.uri(), 0)
        .fetch_page(&FetchRequest::after("rust", None, 20))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::InvalidResponse { .. }));
}

#[tokio::test]
async fn test_fetch_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(listing_body(&["a"], None))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = fetcher(&server.uri(), 0)
        .fetch_page(&FetchRequest::after("rust", None, 20))
        .await
        .unwrap_err();
    assert_eq!(err, FetchError::Timeout { timeout_ms: 500 });
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_fetch_connection_refused() {
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };

    let err = fetcher(&uri, 0)
        .fetch_page(&FetchRequest::after("rust", None, 20))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Transport { .. }));
}
