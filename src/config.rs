//! Live client configuration.
//!
//! Endpoint paths, timing constants and the DOM contract the client relies
//! on. Everything has a default matching the dashboard server; builders
//! follow the `with_*` style.

use std::time::Duration;

use thiserror::Error;

/// Default dashboard address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Page followed when none is given.
pub const DEFAULT_PAGE_PATH: &str = "/";

/// Server-sent event stream endpoint.
pub const DEFAULT_STREAM_PATH: &str = "/api/events/stream";

/// Page showing the agent activity log.
pub const DEFAULT_ACTIVITY_PATH: &str = "/agents/activity";

/// Quiet period before a refresh fires.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Delay before reconnecting after the stream closed for good.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Transport retry interval used until the server sends a `retry:` hint.
pub const DEFAULT_RETRY: Duration = Duration::from_secs(3);

/// Rows the activity log page renders server-side.
pub const DEFAULT_MAX_ACTIVITY_ROWS: usize = 200;

/// Configuration errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("path for {field} must start with '/': {value}")]
    RelativePath { field: &'static str, value: String },

    #[error("selector for {field} is empty")]
    EmptySelector { field: &'static str },
}

/// CSS selectors for the elements the live client touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomSelectors {
    /// Connection status dot
    pub status_dot: String,
    /// Connection status label ("Live"/"Offline")
    pub status_label: String,
    /// Meta element whose `content` names the story on detail pages
    pub story_meta: String,
    /// Body of the activity log table
    pub activity_body: String,
    /// Region replaced on refresh
    pub main_content: String,
}

impl Default for DomSelectors {
    fn default() -> Self {
        Self {
            status_dot: "#sse-status".to_string(),
            status_label: "#sse-label".to_string(),
            story_meta: r#"meta[name="story-id"]"#.to_string(),
            activity_body: "#activity-table tbody".to_string(),
            main_content: "main".to_string(),
        }
    }
}

impl DomSelectors {
    /// All selectors, paired with their field names.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("status_dot", self.status_dot.as_str()),
            ("status_label", self.status_label.as_str()),
            ("story_meta", self.story_meta.as_str()),
            ("activity_body", self.activity_body.as_str()),
            ("main_content", self.main_content.as_str()),
        ]
        .into_iter()
    }
}

/// Configuration for a live dashboard client.
///
/// # Example
///
/// ```
/// use livedash::config::LiveConfig;
///
/// let config = LiveConfig::default()
///     .with_base_url("http://dashboard:8000/")
///     .with_page_path("/agents/activity");
/// assert_eq!(config.stream_url(), "http://dashboard:8000/api/events/stream");
/// assert_eq!(config.page_url(), "http://dashboard:8000/agents/activity");
/// ```
#[derive(Debug, Clone)]
pub struct LiveConfig {
    pub base_url: String,
    /// Page to mirror (used by the binary for the initial load)
    pub page_path: String,
    pub stream_path: String,
    pub activity_path: String,
    pub debounce: Duration,
    pub reconnect_delay: Duration,
    pub default_retry: Duration,
    pub max_activity_rows: usize,
    pub selectors: DomSelectors,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_path: DEFAULT_PAGE_PATH.to_string(),
            stream_path: DEFAULT_STREAM_PATH.to_string(),
            activity_path: DEFAULT_ACTIVITY_PATH.to_string(),
            debounce: DEFAULT_DEBOUNCE,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            default_retry: DEFAULT_RETRY,
            max_activity_rows: DEFAULT_MAX_ACTIVITY_ROWS,
            selectors: DomSelectors::default(),
        }
    }
}

impl LiveConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_page_path(mut self, path: impl Into<String>) -> Self {
        self.page_path = path.into();
        self
    }

    pub fn with_stream_path(mut self, path: impl Into<String>) -> Self {
        self.stream_path = path.into();
        self
    }

    pub fn with_activity_path(mut self, path: impl Into<String>) -> Self {
        self.activity_path = path.into();
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn with_default_retry(mut self, retry: Duration) -> Self {
        self.default_retry = retry;
        self
    }

    pub fn with_max_activity_rows(mut self, rows: usize) -> Self {
        self.max_activity_rows = rows;
        self
    }

    pub fn with_selectors(mut self, selectors: DomSelectors) -> Self {
        self.selectors = selectors;
        self
    }

    /// Absolute URL of the event stream.
    pub fn stream_url(&self) -> String {
        self.join(&self.stream_path)
    }

    /// Absolute URL of the mirrored page.
    pub fn page_url(&self) -> String {
        self.join(&self.page_path)
    }

    fn join(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Check that URLs and selectors are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: "not a hierarchical URL".to_string(),
            });
        }

        for (field, value) in [
            ("page_path", &self.page_path),
            ("stream_path", &self.stream_path),
            ("activity_path", &self.activity_path),
        ] {
            if !value.starts_with('/') {
                return Err(ConfigError::RelativePath {
                    field,
                    value: value.clone(),
                });
            }
        }

        for (field, selector) in self.selectors.iter() {
            if selector.trim().is_empty() {
                return Err(ConfigError::EmptySelector { field });
            }
        }

        Ok(())
    }
}
