//! SSE stream parsing logic
//!
//! Contains the stateful SseParser for accumulating lines and emitting
//! messages, and the single-line classifier it is built on.

use std::time::Duration;

use crate::sse::events::{SseFrame, SseLine, SseMessage};

/// Event type used when a frame has no `event:` line.
pub const DEFAULT_EVENT_TYPE: &str = "message";

/// Parse a single SSE line into its component type
pub fn parse_sse_line(line: &str) -> SseLine {
    if line.is_empty() {
        return SseLine::Empty;
    }

    if let Some(stripped) = line.strip_prefix(':') {
        return SseLine::Comment(stripped.trim().to_string());
    }

    // A line without a colon is a field name with an empty value
    let (field, value) = match line.split_once(':') {
        Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
        None => (line, ""),
    };

    match field {
        "event" => SseLine::Event(value.to_string()),
        "data" => SseLine::Data(value.to_string()),
        "id" => SseLine::Id(value.to_string()),
        "retry" => SseLine::Retry(
            value
                .bytes()
                .all(|b| b.is_ascii_digit())
                .then(|| value.parse().ok())
                .flatten(),
        ),
        _ => SseLine::Unknown(line.to_string()),
    }
}

/// Stateful SSE parser that accumulates lines and emits complete messages
#[derive(Debug, Default)]
pub struct SseParser {
    /// Current event type being accumulated
    current_event_type: Option<String>,
    /// Accumulated data lines (SSE allows multiple data: lines)
    data_buffer: Vec<String>,
    /// Last event id seen; persists across frames
    last_event_id: Option<String>,
}

impl SseParser {
    /// Create a new SSE parser
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a line (without its line terminator) to the parser.
    ///
    /// Returns a message when the line completes an event or carries a
    /// `retry:` hint, `None` otherwise.
    pub fn feed_line(&mut self, line: &str) -> Option<SseMessage> {
        match parse_sse_line(line) {
            SseLine::Event(event_type) => {
                self.current_event_type = Some(event_type);
                None
            }
            SseLine::Data(data) => {
                self.data_buffer.push(data);
                None
            }
            SseLine::Id(id) => {
                // Ids containing NUL are ignored
                if !id.contains('\0') {
                    self.last_event_id = Some(id);
                }
                None
            }
            SseLine::Retry(Some(ms)) => Some(SseMessage::Retry(Duration::from_millis(ms))),
            SseLine::Retry(None) | SseLine::Comment(_) | SseLine::Unknown(_) => None,
            SseLine::Empty => self.try_emit_event(),
        }
    }

    /// Emit the accumulated frame, if it carried any data.
    fn try_emit_event(&mut self) -> Option<SseMessage> {
        let event_type = self.current_event_type.take();
        if self.data_buffer.is_empty() {
            return None;
        }

        let data = self.data_buffer.join("\n");
        self.data_buffer.clear();

        Some(SseMessage::Event(SseFrame {
            event_type: event_type
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_EVENT_TYPE.to_string()),
            data,
            id: self.last_event_id.clone(),
        }))
    }

    /// Last event id received on this stream.
    pub fn last_event_id(&self) -> Option<&str> {
        self.last_event_id.as_deref()
    }

    /// Reset the parser state
    pub fn reset(&mut self) {
        self.current_event_type = None;
        self.data_buffer.clear();
        self.last_event_id = None;
    }
}
