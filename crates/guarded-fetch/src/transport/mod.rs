//! HTTP transport seam
//!
//! [`BoundedFetcher`](crate::BoundedFetcher) drives a [`Transport`] one
//! attempt at a time. The transport follows redirects itself, validating
//! every hop with the guard it is handed, and returns the head of the final
//! response together with an unread body stream.

use std::fmt;
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use reqwest::header::HeaderMap;
use reqwest::Method;
use url::Url;

use crate::error::FetchError;
use crate::guard::UriGuard;
use crate::limits::RequestLimits;

pub mod reqwest_backend;

pub use reqwest_backend::ReqwestTransport;

/// Response body chunks as they arrive
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, FetchError>> + Send>>;

/// One attempt of a request
#[derive(Debug)]
pub struct Exchange<'a> {
    /// `GET` or `POST`
    pub method: Method,
    /// Initial target; already accepted by the guard
    pub url: &'a Url,
    /// Complete header set for this attempt
    pub headers: HeaderMap,
    /// Request body
    pub body: Option<Bytes>,
    /// Limits snapshot taken when the request started
    pub limits: &'a RequestLimits,
    /// Guard applied to every redirect target
    pub guard: &'a UriGuard,
}

/// Head of a response plus its unread body
///
/// Any status, including 4xx and 5xx, is a response and not an error.
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// URL the response came from after redirects
    pub url: Url,
    /// Response headers
    pub headers: HeaderMap,
    /// `Content-Length` declared by the server
    pub content_length: Option<u64>,
    /// Body stream; dropping it releases the connection
    pub body: BodyStream,
}

impl fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("url", &self.url.as_str())
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Performs a single HTTP attempt
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Send the request and return once the response head has arrived
    ///
    /// Implementations must honour `exchange.limits` for redirects and
    /// connect timeouts, and must reject any redirect hop the guard refuses.
    async fn send(&self, exchange: Exchange<'_>) -> Result<TransportResponse, FetchError>;
}
