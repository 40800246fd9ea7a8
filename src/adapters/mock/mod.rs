//! Mock implementations for testing.
//!
//! - [`MockHttpClient`] - HTTP client with configurable responses
//!
//! The document side needs no mock: [`MemoryDom`](crate::adapters::MemoryDom)
//! records every mutation.

pub mod http;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
