//! SSE (Server-Sent Events) stream parser
//!
//! Parses the dashboard's event stream. SSE format consists of:
//! - `data: <json>` - data payload line(s)
//! - `event: <type>` / `id: <id>` - optional frame metadata
//! - `retry: <ms>` - reconnection interval hint
//! - Empty line - signals end of event
//! - Lines starting with `:` - comments such as heartbeats (ignored)
//!
//! # Module structure
//! - `events` - Line and message types
//! - `parser` - Stateful line parser
//! - `stream` - Byte stream to message stream adapter

mod events;
mod parser;
mod stream;

pub use events::{SseFrame, SseLine, SseMessage};
pub use parser::{parse_sse_line, SseParser, DEFAULT_EVENT_TYPE};
pub use stream::sse_messages;
