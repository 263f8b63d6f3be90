//! Bounded response type

use bytes::Bytes;
use reqwest::header::HeaderMap;
use url::Url;

/// Result of a completed exchange
///
/// The body is a prefix of what the server sent, never longer than the
/// `max_response_bytes` in force when the request started.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    request_url: Url,
    final_url: Url,
    status: u16,
    headers: HeaderMap,
    body: Bytes,
    truncated: bool,
}

impl FetchResponse {
    pub(crate) fn new(
        request_url: Url,
        final_url: Url,
        status: u16,
        headers: HeaderMap,
        body: Bytes,
        truncated: bool,
    ) -> Self {
        Self {
            request_url,
            final_url,
            status,
            headers,
            body,
            truncated,
        }
    }

    /// URL the caller asked for
    pub fn request_url(&self) -> &Url {
        &self.request_url
    }

    /// URL the body came from after redirects
    pub fn final_url(&self) -> &Url {
        &self.final_url
    }

    /// Whether any redirect was followed
    pub fn was_redirected(&self) -> bool {
        self.request_url != self.final_url
    }

    /// Get the HTTP status code
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Check if the response status is a success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if the response status is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Check if the response status is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    /// Response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// `Content-Type` header, if present and valid text
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    /// Body bytes kept from the response
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Consume the response, returning the body
    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// `true` when the body may be shorter than what the server sent
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}
