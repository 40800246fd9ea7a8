//! Activity events pushed by the dashboard server.
//!
//! Each event-stream message carries one JSON object describing something an
//! agent did. Every field is optional: the server forwards whatever was
//! published on its activity channel, and non-JSON payloads arrive wrapped as
//! `{"raw": "..."}`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One decoded activity event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ActivityEvent {
    /// ISO-8601 instant the activity happened
    #[serde(default, deserialize_with = "lenient_string")]
    pub timestamp: Option<String>,
    /// Story the activity concerns
    #[serde(default, deserialize_with = "lenient_string")]
    pub story_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub agent_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub action: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub detail: Option<String>,
}

impl ActivityEvent {
    /// True if the event names `story_id`. Surrounding whitespace on
    /// either side is ignored, matching how the page's story marker is read.
    pub fn concerns_story(&self, story_id: &str) -> bool {
        let wanted = story_id.trim();
        !wanted.is_empty() && self.story_id.as_deref().map(str::trim) == Some(wanted)
    }
}

/// Result of decoding one message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    Event(ActivityEvent),
    /// The body is not a JSON object; carries the reason for logging.
    Invalid(String),
}

/// Decode a message body into an [`ActivityEvent`].
///
/// Only JSON objects are events. Scalars, arrays and malformed text decode
/// to [`Decoded::Invalid`].
pub fn decode_event(data: &str) -> Decoded {
    let value: Value = match serde_json::from_str(data) {
        Ok(value) => value,
        Err(e) => return Decoded::Invalid(e.to_string()),
    };

    if !value.is_object() {
        return Decoded::Invalid(format!("expected a JSON object, got {}", kind_of(&value)));
    }

    match ActivityEvent::deserialize(value) {
        Ok(event) => Decoded::Event(event),
        Err(e) => Decoded::Invalid(e.to_string()),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Accept strings, numbers and booleans; map null, empty strings and
/// structured values to `None`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}
