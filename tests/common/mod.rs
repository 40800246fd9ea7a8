//! Common test utilities for integration tests.
//!
//! Dashboard page fixtures, a polling helper, and wiremock setup for the
//! page and event stream endpoints.
//!
//! # Example
//!
//! ```ignore
//! let server = MockServer::start().await;
//! mount_page(&server, "/", &list_page("3 stories")).await;
//! mount_stream(&server, &sse_body(&[r#"{"action":"draft"}"#])).await;
//! ```

pub mod mocks;

pub use mocks::*;

use std::time::Duration;

/// Shared page chrome with the status indicator.
fn page(head: &str, main: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html><head><title>Dashboard</title>{}</head><body>
<nav><span id="sse-status" data-state="disconnected"></span><span id="sse-label">Offline</span></nav>
<main>{}</main></body></html>"#,
        head, main
    )
}

/// Story list or pipeline page.
pub fn list_page(content: &str) -> String {
    page("", &format!(r#"<div id="pipeline">{}</div>"#, content))
}

/// Story detail page for `story_id`.
pub fn story_page(story_id: &str, content: &str) -> String {
    page(
        &format!(r#"<meta name="story-id" content="{}">"#, story_id),
        &format!(r#"<article>{}</article>"#, content),
    )
}

/// Activity log page with `rows` already rendered.
pub fn activity_page(rows: &[&str]) -> String {
    let body: String = rows
        .iter()
        .map(|r| format!("<tr><td>{}</td></tr>", r))
        .collect();
    page(
        "",
        &format!(
            r#"<table id="activity-table"><thead><tr><th>Time</th></tr></thead><tbody>{}</tbody></table>"#,
            body
        ),
    )
}

/// Poll `condition` every 10ms until it holds, or panic after `timeout`.
pub async fn wait_until<F>(timeout: Duration, what: &str, mut condition: F)
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while !condition() {
        if tokio::time::Instant::now() >= deadline {
            panic!("timed out waiting for {}", what);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
