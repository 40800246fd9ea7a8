//! livedash - live updates for the agent dashboard
//!
//! Follows the dashboard's activity event stream and keeps a page current:
//! connectivity indicator, instant activity rows, and debounced refreshes of
//! the main region that never interrupt typing.
//!
//! The browser document is reached through the [`traits::Dom`] seam and all
//! network access through [`traits::HttpClient`], so the whole client runs
//! against [`adapters::MemoryDom`] and [`adapters::MockHttpClient`] in tests.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod events;
pub mod live;
pub mod page;
pub mod sse;
pub mod traits;
