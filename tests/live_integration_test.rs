//! End-to-end tests for the live client against a wiremock dashboard.
//!
//! Pages are loaded and streamed over real HTTP through the reqwest
//! adapter; the document is the in-memory one the binary uses.

mod common;

use std::time::Duration;

use common::*;
use livedash::adapters::{MemoryDom, Mutation};
use livedash::live::ConnectionState;
use livedash::traits::FocusedElement;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WAIT: Duration = Duration::from_secs(3);

// The fixture stream ends after its body, so connectivity is checked
// through the recorded writes rather than the current state.
fn label_was(dom: &MemoryDom, text: &str) -> bool {
    dom.mutations()
        .iter()
        .any(|m| matches!(m, Mutation::SetText { text: t, .. } if t == text))
}

fn flashes(dom: &MemoryDom) -> usize {
    dom.mutations()
        .iter()
        .filter(|m| matches!(m, Mutation::AddClass { class, .. } if class == "flash"))
        .count()
}

#[tokio::test]
async fn test_activity_page_shows_rows_then_refreshes() {
    let server = MockServer::start().await;
    mount_page_once(&server, "/agents/activity", &activity_page(&["older"])).await;
    mount_page(&server, "/agents/activity", &activity_page(&["server-1", "server-2"])).await;
    mount_stream(
        &server,
        &sse_body(&[
            r#"{"timestamp":"2024-01-01T00:00:00Z","agent_name":"writer","story_id":"s-1","action":"draft","detail":"ok"}"#,
            r#"{"agent_name":"reviewer","action":"review"}"#,
        ]),
    )
    .await;

    // Long enough to look at the client-side rows before the refresh lands
    let config = test_config(&server, "/agents/activity").with_debounce(Duration::from_millis(300));
    let (manager, dom) = follow(config).await;
    manager.start();

    wait_until(WAIT, "rows inserted", || {
        dom.element("#activity-table tbody")
            .map_or(false, |body| body.children.len() == 3)
    })
    .await;
    let body = dom.element("#activity-table tbody").unwrap();
    // Newest first
    assert!(body.children[0].contains("badge-reviewer"));
    assert!(body.children[1].contains(r#"<a href="/stories/s-1">s-1</a>"#));
    assert!(body.children[1].contains("2024-01-01 00:00:00"));
    assert_eq!(body.children[2], "<tr><td>older</td></tr>");

    wait_until(WAIT, "main refreshed", || {
        dom.element("main")
            .map_or(false, |main| main.inner_html().contains("server-2"))
    })
    .await;
    // The table now holds exactly what the server rendered
    assert_eq!(
        dom.element("#activity-table tbody").unwrap().children,
        ["<tr><td>server-1</td></tr>", "<tr><td>server-2</td></tr>"]
    );
    // Initial load plus one debounced refresh for the whole burst
    assert_eq!(hits(&server, "/agents/activity").await, 2);
    assert!(label_was(&dom, "Live"));
    assert_eq!(flashes(&dom), 2);

    manager.stop();
}

#[tokio::test]
async fn test_story_page_refreshes_only_for_its_story() {
    let server = MockServer::start().await;
    mount_page_once(&server, "/stories/s-1", &story_page("s-1", "draft v1")).await;
    mount_page(&server, "/stories/s-1", &story_page("s-1", "draft v2")).await;
    mount_stream(
        &server,
        &sse_body(&[
            r#"{"story_id":"s-2","action":"edit"}"#,
            r#"{"action":"heartbeat"}"#,
            r#"{"story_id":"s-1","action":"edit_complete"}"#,
        ]),
    )
    .await;

    let (manager, dom) = follow(test_config(&server, "/stories/s-1")).await;
    manager.start();

    wait_until(WAIT, "story refreshed", || {
        dom.element("main")
            .map_or(false, |main| main.inner_html().contains("draft v2"))
    })
    .await;
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(hits(&server, "/stories/s-1").await, 2);

    manager.stop();
}

#[tokio::test]
async fn test_other_story_events_never_fetch() {
    let server = MockServer::start().await;
    mount_page(&server, "/stories/s-1", &story_page("s-1", "draft")).await;
    mount_stream(&server, &sse_body(&[r#"{"story_id":"s-2","action":"edit"}"#])).await;

    let (manager, dom) = follow(test_config(&server, "/stories/s-1")).await;
    manager.start();

    wait_until(WAIT, "event received", || flashes(&dom) == 1).await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(hits(&server, "/stories/s-1").await, 1);
    assert!(dom.element("main").unwrap().inner_html().contains("draft"));
    manager.stop();
}

#[tokio::test]
async fn test_typing_blocks_refresh() {
    let server = MockServer::start().await;
    mount_page_once(&server, "/", &list_page("before")).await;
    mount_page(&server, "/", &list_page("after")).await;
    mount_stream(&server, &sse_body(&[r#"{"action":"draft"}"#])).await;

    let (manager, dom) = follow(test_config(&server, "/")).await;
    dom.set_focus(Some(FocusedElement::new("textarea")));
    manager.start();

    wait_until(WAIT, "event received", || flashes(&dom) == 1).await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(hits(&server, "/").await, 1);
    assert!(dom.element("main").unwrap().inner_html().contains("before"));
    assert_eq!(manager.refresher().fetch_count(), 0);
    manager.stop();
}

#[tokio::test]
async fn test_stream_request_headers() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &list_page("x")).await;
    Mock::given(method("GET"))
        .and(path(STREAM_PATH))
        .and(header("accept", "text/event-stream"))
        .and(header("cache-control", "no-cache"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(sse_body(&[]), "text/event-stream"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (manager, dom) = follow(test_config(&server, "/")).await;
    manager.start();

    wait_until(WAIT, "label live", || label_was(&dom, "Live")).await;
    manager.stop();
}

#[tokio::test]
async fn test_server_error_goes_offline_and_reconnects() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &list_page("x")).await;
    Mock::given(method("GET"))
        .and(path(STREAM_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let (manager, dom) = follow(test_config(&server, "/")).await;
    manager.start();

    wait_until(WAIT, "offline", || label_was(&dom, "Offline")).await;
    assert!(!label_was(&dom, "Live"));
    assert_eq!(
        dom.mutations()
            .iter()
            .filter(|m| matches!(m, Mutation::SetAttribute { value, .. } if value == "disconnected"))
            .count(),
        1
    );

    // Reconnect delay is 200ms in tests
    let deadline = tokio::time::Instant::now() + WAIT;
    while hits(&server, STREAM_PATH).await < 2 {
        assert!(tokio::time::Instant::now() < deadline, "no reconnect attempt");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    manager.stop();
    assert_eq!(manager.state(), ConnectionState::Closed);
}

#[tokio::test]
async fn test_wrong_content_type_is_terminal() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &list_page("x")).await;
    Mock::given(method("GET"))
        .and(path(STREAM_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"))
        .mount(&server)
        .await;

    let (manager, dom) = follow(test_config(&server, "/")).await;
    manager.start();

    wait_until(WAIT, "offline", || label_was(&dom, "Offline")).await;
    assert!(!label_was(&dom, "Live"));

    let deadline = tokio::time::Instant::now() + WAIT;
    while hits(&server, STREAM_PATH).await < 2 {
        assert!(tokio::time::Instant::now() < deadline, "no reconnect attempt");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    manager.stop();
}
