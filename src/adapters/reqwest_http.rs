//! Production [`HttpClient`] on reqwest.
//!
//! Page fetches get an overall timeout. The event stream only gets a connect
//! timeout: it is expected to stay open for hours, and the server keeps it
//! alive with heartbeat comments.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;

use crate::traits::{media_type, ByteStream, Headers, HttpClient, HttpError, Response, EVENT_STREAM_MIME};

const PAGE_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Map a reqwest failure onto the transient/terminal split of [`HttpError`].
fn convert_error(err: reqwest::Error) -> HttpError {
    let message = err.to_string();
    if err.is_timeout() {
        HttpError::Timeout(message)
    } else if err.is_connect() {
        HttpError::ConnectionFailed(message)
    } else if err.is_builder() {
        HttpError::InvalidUrl(message)
    } else if err.is_body() || err.is_decode() || err.is_request() {
        HttpError::Io(message)
    } else {
        HttpError::Other(message)
    }
}

fn convert_headers(headers: &reqwest::header::HeaderMap) -> Headers {
    headers
        .iter()
        .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string())))
        .collect()
}

/// Reject responses that cannot carry an event stream.
///
/// Both cases close the connection for good, the same way a browser's
/// event source gives up on them.
fn check_stream_response(status: u16, content_type: Option<&str>) -> Result<(), HttpError> {
    if !(200..300).contains(&status) {
        return Err(HttpError::ServerError {
            status,
            message: format!("event stream answered {}", status),
        });
    }
    let media = content_type.map(media_type).unwrap_or_default();
    if media != EVENT_STREAM_MIME {
        return Err(HttpError::ServerError {
            status,
            message: format!("unexpected content type '{}'", media),
        });
    }
    Ok(())
}

/// reqwest-backed client shared by the page refresher and the stream.
///
/// # Example
///
/// ```ignore
/// use livedash::adapters::ReqwestHttpClient;
/// use livedash::traits::{Headers, HttpClient};
///
/// let client = ReqwestHttpClient::new();
/// let page = client.get("http://localhost:8000/stories", &Headers::new()).await?;
/// assert!(page.is_success());
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }

    /// Wrap a preconfigured client (proxies, TLS roots).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn inner(&self) -> &reqwest::Client {
        &self.client
    }

    fn request(&self, url: &str, headers: &Headers) -> reqwest::RequestBuilder {
        headers
            .iter()
            .fold(self.client.get(url), |builder, (key, value)| builder.header(key, value))
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        let response = self
            .request(url, headers)
            .timeout(PAGE_TIMEOUT)
            .send()
            .await
            .map_err(convert_error)?;

        let status = response.status().as_u16();
        let headers = convert_headers(response.headers());
        let body = response.bytes().await.map_err(convert_error)?;
        Ok(Response::with_headers(status, headers, body))
    }

    async fn get_stream(&self, url: &str, headers: &Headers) -> Result<ByteStream, HttpError> {
        let response = self
            .request(url, headers)
            .header(reqwest::header::ACCEPT, EVENT_STREAM_MIME)
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(convert_error)?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());
        check_stream_response(response.status().as_u16(), content_type)?;

        Ok(Box::pin(response.bytes_stream().map(|chunk| chunk.map_err(convert_error))))
    }
}
