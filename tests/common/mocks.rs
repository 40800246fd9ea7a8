//! wiremock setup for the dashboard endpoints.

use std::sync::Arc;
use std::time::Duration;

use livedash::adapters::{MemoryDom, ReqwestHttpClient};
use livedash::config::LiveConfig;
use livedash::live::ConnectionManager;
use livedash::traits::{Headers, HttpClient};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const STREAM_PATH: &str = "/api/events/stream";

/// SSE body carrying one `data:` frame per payload. A long retry hint keeps
/// the client from reconnecting while a test runs.
pub fn sse_body(payloads: &[&str]) -> String {
    let mut body = String::from("retry: 60000\n\n: connected\n\n");
    for payload in payloads {
        body.push_str("data: ");
        body.push_str(payload);
        body.push_str("\n\n");
    }
    body
}

/// Serve `html` at `page_path` on every request.
pub async fn mount_page(server: &MockServer, page_path: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html.to_string(), "text/html"))
        .mount(server)
        .await;
}

/// Serve `html` at `page_path` for the first request only.
pub async fn mount_page_once(server: &MockServer, page_path: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html.to_string(), "text/html"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(server)
        .await;
}

/// Serve an event stream body.
pub async fn mount_stream(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path(STREAM_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/event-stream"),
        )
        .mount(server)
        .await;
}

/// Requests the server has seen for `request_path`.
pub async fn hits(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == request_path)
        .count()
}

/// Test configuration: short debounce and reconnect delay.
pub fn test_config(server: &MockServer, page_path: &str) -> LiveConfig {
    LiveConfig::default()
        .with_base_url(server.uri())
        .with_page_path(page_path)
        .with_debounce(Duration::from_millis(50))
        .with_reconnect_delay(Duration::from_millis(200))
}

/// Load the page the way the binary does and build a manager on it.
pub async fn follow(config: LiveConfig) -> (ConnectionManager, Arc<MemoryDom>) {
    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    let url = config.page_url();
    let html = http
        .get(&url, &Headers::new())
        .await
        .unwrap()
        .text()
        .unwrap();
    let dom = Arc::new(MemoryDom::from_page(&url, &html, &config.selectors).unwrap());
    let manager = ConnectionManager::new(config, http, dom.clone());
    (manager, dom)
}
