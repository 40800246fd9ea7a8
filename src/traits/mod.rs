//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`HttpClient`] - HTTP GET and streaming GET
//! - [`Dom`] - The document kept in sync by the live client

pub mod dom;
pub mod http;

pub use dom::{Dom, FocusedElement};
pub use http::{media_type, ByteStream, Headers, HttpClient, HttpError, Response, EVENT_STREAM_MIME};
