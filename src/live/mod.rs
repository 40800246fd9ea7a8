//! Live dashboard client.
//!
//! Keeps a dashboard page current by listening to the server's activity
//! event stream:
//!
//! - [`ConnectionManager`] owns the stream and dispatches each event
//! - [`PageContextResolver`] decides what an event means for this page
//! - [`ActivityRowRenderer`] shows activity rows immediately
//! - [`DebouncedRefresher`] re-fetches the main region after a burst
//! - [`TypingGuard`] keeps refreshes away from an operator who is typing
//! - [`StatusIndicator`] shows connectivity and flashes on activity

pub mod activity;
pub mod connection;
pub mod context;
pub mod refresh;
pub mod status;
pub mod typing;

pub use activity::{format_timestamp, ActivityRow, ActivityRowRenderer, StoryCell};
pub use connection::{ConnectionManager, ConnectionState, Dispatch, Recovery};
pub use context::{PageContext, PageContextResolver};
pub use refresh::{DebouncedRefresher, RefreshError, RefreshOutcome};
pub use status::StatusIndicator;
pub use typing::{is_text_entry, TypingGuard};
