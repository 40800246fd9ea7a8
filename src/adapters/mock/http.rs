//! Mock HTTP client for testing.
//!
//! Provides a configurable mock HTTP client that can return predefined
//! responses, errors or event streams for testing purposes.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use futures_util::StreamExt;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::traits::{ByteStream, Headers, HttpClient, HttpError, Response};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// `GET` or `GET-STREAM`
    pub method: String,
    /// Request URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a successful response
    Success(Response),
    /// Return an error
    Error(HttpError),
    /// Wait (on the tokio clock) before answering with the inner response
    Delayed {
        delay: Duration,
        response: Box<MockResponse>,
    },
    /// Stream these chunks, then end the stream
    Stream(Vec<Bytes>),
    /// Stream these chunks, then stay open forever
    OpenStream(Vec<Bytes>),
}

impl MockResponse {
    /// 200 response with an HTML body.
    pub fn html(body: impl Into<String>) -> Self {
        MockResponse::Success(Response::new(200, Bytes::from(body.into())))
    }

    /// This response, answered after `delay`.
    pub fn delayed(self, delay: Duration) -> Self {
        MockResponse::Delayed {
            delay,
            response: Box::new(self),
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    /// Consumed first, in order, per URL
    queued: HashMap<String, VecDeque<MockResponse>>,
    /// Returned every time once the queue for the URL is empty
    responses: HashMap<String, MockResponse>,
    default_response: Option<MockResponse>,
    requests: Vec<RecordedRequest>,
}

/// Mock HTTP client for testing.
///
/// URLs are matched exactly. Queued responses win over fixed ones, and
/// the default response is used when neither exists.
///
/// # Example
///
/// ```ignore
/// use livedash::adapters::mock::{MockHttpClient, MockResponse};
///
/// let client = MockHttpClient::new();
/// client.set_response("http://dash/", MockResponse::html("<main>hi</main>"));
/// let response = client.get("http://dash/", &Headers::new()).await?;
/// assert_eq!(client.request_count("http://dash/"), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    state: Arc<Mutex<MockState>>,
}

impl MockHttpClient {
    /// Create a new mock HTTP client.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Set the response returned for `url` every time.
    pub fn set_response(&self, url: &str, response: MockResponse) {
        self.lock().responses.insert(url.to_string(), response);
    }

    /// Queue a one-shot response for `url`.
    pub fn push_response(&self, url: &str, response: MockResponse) {
        self.lock()
            .queued
            .entry(url.to_string())
            .or_default()
            .push_back(response);
    }

    /// Set a default response for URLs without specific matches.
    pub fn set_default_response(&self, response: MockResponse) {
        self.lock().default_response = Some(response);
    }

    /// Get all recorded requests.
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Number of requests (of any kind) made to `url`.
    pub fn request_count(&self, url: &str) -> usize {
        self.lock().requests.iter().filter(|r| r.url == url).count()
    }

    /// Clear all recorded requests.
    pub fn clear_requests(&self) {
        self.lock().requests.clear();
    }

    /// Record a request and pick its response.
    fn respond(&self, method: &str, url: &str, headers: &Headers) -> Option<MockResponse> {
        let mut state = self.lock();
        state.requests.push(RecordedRequest {
            method: method.to_string(),
            url: url.to_string(),
            headers: headers.clone(),
        });

        if let Some(response) = state.queued.get_mut(url).and_then(VecDeque::pop_front) {
            return Some(response);
        }
        state
            .responses
            .get(url)
            .cloned()
            .or_else(|| state.default_response.clone())
    }
}

/// Wait out any `Delayed` wrappers.
async fn settle(mut response: MockResponse) -> MockResponse {
    loop {
        match response {
            MockResponse::Delayed { delay, response: inner } => {
                tokio::time::sleep(delay).await;
                response = *inner;
            }
            other => return other,
        }
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        let Some(response) = self.respond("GET", url, headers) else {
            return Err(HttpError::Other(format!("No mock response for URL: {}", url)));
        };

        match settle(response).await {
            MockResponse::Success(response) => Ok(response),
            MockResponse::Error(err) => Err(err),
            MockResponse::Stream(_) | MockResponse::OpenStream(_) => Err(HttpError::Other(
                "Stream response on non-stream request".to_string(),
            )),
            MockResponse::Delayed { .. } => unreachable!("settled above"),
        }
    }

    async fn get_stream(&self, url: &str, headers: &Headers) -> Result<ByteStream, HttpError> {
        let Some(response) = self.respond("GET-STREAM", url, headers) else {
            return Err(HttpError::Other(format!("No mock response for URL: {}", url)));
        };

        match settle(response).await {
            MockResponse::Stream(chunks) => Ok(Box::pin(stream::iter(
                chunks.into_iter().map(Ok::<Bytes, HttpError>),
            ))),
            MockResponse::OpenStream(chunks) => Ok(Box::pin(
                stream::iter(chunks.into_iter().map(Ok::<Bytes, HttpError>)).chain(stream::pending()),
            )),
            MockResponse::Error(err) => Err(err),
            MockResponse::Success(response) if !response.is_success() => {
                Err(HttpError::ServerError {
                    status: response.status,
                    message: response.text().unwrap_or_default(),
                })
            }
            MockResponse::Success(response) => {
                Ok(Box::pin(stream::iter(vec![Ok::<Bytes, HttpError>(response.body)])))
            }
            MockResponse::Delayed { .. } => unreachable!("settled above"),
        }
    }
}
