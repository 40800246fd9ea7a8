//! HTTP seam of the live client.
//!
//! Two requests reach the network: the page re-fetch behind every refresh,
//! and the long-lived event stream. Both go through [`HttpClient`] so tests
//! can script them with the mock adapter.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::collections::HashMap;
use std::pin::Pin;

/// Header name to value. Names are compared case-insensitively by
/// [`Response::header`].
pub type Headers = HashMap<String, String>;

/// Streaming response body, as delivered by [`HttpClient::get_stream`].
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, HttpError>> + Send>>;

/// MIME type of a server-sent event stream.
pub const EVENT_STREAM_MIME: &str = "text/event-stream";

/// A fully buffered page response.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: Headers,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: u16, body: Bytes) -> Self {
        Self::with_headers(status, HashMap::new(), body)
    }

    pub fn with_headers(status: u16, headers: Headers, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// 2xx only; redirects are followed before a `Response` exists.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Value of header `name`, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Media type without parameters, lowercased.
    pub fn content_type(&self) -> Option<String> {
        self.header("content-type").map(media_type)
    }

    /// Body decoded as UTF-8.
    pub fn text(&self) -> Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.body.to_vec())
    }
}

/// `text/event-stream; charset=utf-8` -> `text/event-stream`
pub fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// HTTP client errors.
#[derive(Debug, Clone, PartialEq)]
pub enum HttpError {
    /// Connection failed
    ConnectionFailed(String),
    /// Request timeout
    Timeout(String),
    /// Server returned an error status
    ServerError { status: u16, message: String },
    /// Request was cancelled
    Cancelled,
    /// IO error while reading a body
    Io(String),
    /// Invalid URL
    InvalidUrl(String),
    /// Other error
    Other(String),
}

impl HttpError {
    /// Whether the failure closes an event stream for good.
    ///
    /// An event-stream transport keeps retrying network-level failures on its
    /// own; an error status or an unusable URL ends the connection and only a
    /// fresh `connect` will try again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            HttpError::ServerError { .. } | HttpError::InvalidUrl(_) | HttpError::Cancelled
        )
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            HttpError::Timeout(msg) => write!(f, "Request timeout: {}", msg),
            HttpError::ServerError { status, message } => {
                write!(f, "Server error ({}): {}", status, message)
            }
            HttpError::Cancelled => write!(f, "Request cancelled"),
            HttpError::Io(msg) => write!(f, "IO error: {}", msg),
            HttpError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            HttpError::Other(msg) => write!(f, "HTTP error: {}", msg),
        }
    }
}

impl std::error::Error for HttpError {}

/// Trait for HTTP client operations.
///
/// The live client needs exactly two things from the network: a plain GET of
/// the page it is showing, and a long-lived GET of the event stream.
///
/// # Example
///
/// ```ignore
/// use livedash::traits::{HttpClient, Headers, HttpError};
///
/// async fn fetch_page<C: HttpClient>(client: &C, url: &str) -> Result<String, HttpError> {
///     let response = client.get(url, &Headers::new()).await?;
///     response.text().map_err(|e| HttpError::Other(e.to_string()))
/// }
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Perform a GET request and buffer the whole body.
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError>;

    /// Perform a GET request and return the body as it arrives.
    ///
    /// Used for the server-sent event stream. Implementations must return
    /// [`HttpError::ServerError`] for non-2xx statuses instead of a stream.
    async fn get_stream(&self, url: &str, headers: &Headers) -> Result<ByteStream, HttpError>;
}
