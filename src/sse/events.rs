//! SSE line and message types.

use std::time::Duration;

/// Represents a parsed SSE line
#[derive(Debug, Clone, PartialEq)]
pub enum SseLine {
    /// Event type declaration (e.g., "event: update")
    Event(String),
    /// Data payload (e.g., "data: {\"agent_name\": \"writer\"}")
    Data(String),
    /// Last event id
    Id(String),
    /// Reconnection interval hint in milliseconds; `None` if not a number
    Retry(Option<u64>),
    /// Empty line - signals end of event
    Empty,
    /// Comment line (starts with ':'), e.g. heartbeats
    Comment(String),
    /// Field this client does not understand
    Unknown(String),
}

/// A complete event, dispatched on the blank line that ends it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    /// Event type; `message` when the server names none
    pub event_type: String,
    /// Data lines joined with `\n`
    pub data: String,
    pub id: Option<String>,
}

/// Items produced while reading an event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseMessage {
    /// Server asked for a different reconnection interval
    Retry(Duration),
    Event(SseFrame),
}
