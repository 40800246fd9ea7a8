//! Client-side activity rows.
//!
//! On the activity log page each event is shown immediately as a new first
//! row, ahead of the debounced refresh that brings in the server's own
//! rendering.

use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::events::ActivityEvent;
use crate::traits::Dom;

/// Shown in cells whose value is missing.
pub const PLACEHOLDER: &str = "—";

/// Class marking a row for the new-row highlight animation.
pub const NEW_ROW_CLASS: &str = "row-new";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format an ISO-8601 instant as `YYYY-MM-DD HH:MM:SS` in UTC.
///
/// Timestamps without an offset are taken as UTC. Anything unparseable is
/// returned unchanged.
pub fn format_timestamp(raw: &str) -> String {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.with_timezone(&Utc).format(TIMESTAMP_FORMAT).to_string();
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return ts.format(TIMESTAMP_FORMAT).to_string();
    }
    raw.to_string()
}

/// The story column of a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoryCell {
    Link { href: String, label: String },
    Placeholder,
}

/// One activity table row, before it becomes markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRow {
    pub timestamp: String,
    pub agent_name: String,
    pub story: StoryCell,
    pub action: String,
    pub detail: String,
}

impl ActivityRow {
    pub fn from_event(event: &ActivityEvent) -> Self {
        Self {
            timestamp: event
                .timestamp
                .as_deref()
                .map(format_timestamp)
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            agent_name: event.agent_name.clone().unwrap_or_default(),
            story: match event.story_id.as_deref() {
                Some(id) => StoryCell::Link {
                    href: format!("/stories/{}", urlencoding::encode(id)),
                    label: id.to_string(),
                },
                None => StoryCell::Placeholder,
            },
            action: event.action.clone().unwrap_or_default(),
            detail: event.detail.clone().unwrap_or_default(),
        }
    }

    /// Visible text of the five cells, left to right.
    pub fn cell_texts(&self) -> [&str; 5] {
        let story = match &self.story {
            StoryCell::Link { label, .. } => label.as_str(),
            StoryCell::Placeholder => PLACEHOLDER,
        };
        [
            self.timestamp.as_str(),
            self.agent_name.as_str(),
            story,
            self.action.as_str(),
            self.detail.as_str(),
        ]
    }

    /// Markup for the row, with every value escaped.
    pub fn to_html(&self) -> String {
        let story = match &self.story {
            StoryCell::Link { href, label } => {
                format!(r#"<a href="{}">{}</a>"#, escape_html(href), escape_html(label))
            }
            StoryCell::Placeholder => PLACEHOLDER.to_string(),
        };
        format!(
            concat!(
                r#"<tr class="{}">"#,
                r#"<td class="timestamp">{}</td>"#,
                r#"<td><span class="badge badge-{}">{}</span></td>"#,
                r#"<td>{}</td>"#,
                r#"<td>{}</td>"#,
                r#"<td class="detail">{}</td>"#,
                "</tr>"
            ),
            NEW_ROW_CLASS,
            escape_html(&self.timestamp),
            badge_modifier(&self.agent_name),
            escape_html(&self.agent_name),
            story,
            escape_html(&self.action),
            escape_html(&self.detail),
        )
    }
}

/// Escape text for use in element content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Agent name reduced to characters safe in a class name.
fn badge_modifier(agent_name: &str) -> String {
    let modifier: String = agent_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if modifier.is_empty() {
        "unknown".to_string()
    } else {
        modifier
    }
}

/// Inserts activity rows at the top of the activity table.
pub struct ActivityRowRenderer {
    dom: Arc<dyn Dom>,
    body: String,
    max_rows: usize,
}

impl ActivityRowRenderer {
    pub fn new(dom: Arc<dyn Dom>, body: impl Into<String>, max_rows: usize) -> Self {
        Self {
            dom,
            body: body.into(),
            max_rows,
        }
    }

    /// Render `event` as the table's new first row.
    ///
    /// Returns `false` if the page has no activity table body.
    pub fn insert(&self, event: &ActivityEvent) -> bool {
        let row = ActivityRow::from_event(event);
        if !self.dom.prepend_html(&self.body, &row.to_html()) {
            return false;
        }
        if self.max_rows > 0 {
            self.dom.truncate_children(&self.body, self.max_rows);
        }
        true
    }
}
