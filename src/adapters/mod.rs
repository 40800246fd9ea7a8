//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`ReqwestHttpClient`] - HTTP client using reqwest
//! - [`MemoryDom`] - In-memory document seeded from a fetched page
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::MockHttpClient`] - Configurable HTTP responses and event streams

pub mod memory_dom;
pub mod mock;
pub mod reqwest_http;

pub use memory_dom::{ElementState, MemoryDom, Mutation};
pub use mock::MockHttpClient;
pub use reqwest_http::ReqwestHttpClient;
