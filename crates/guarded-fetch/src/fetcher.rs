//! Bounded fetcher

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::instrument;

use crate::error::FetchError;
use crate::guard::UriGuard;
use crate::limits::{LimitsHandle, RequestLimits};
use crate::read::read_bounded;
use crate::request::{parse_url, ExpectContinue, FetchRequest};
use crate::response::FetchResponse;
use crate::settings::FetchSettings;
use crate::transport::{Exchange, ReqwestTransport, Transport, TransportResponse};

const EXPECTATION_FAILED: u16 = 417;

/// Guarded HTTP client for URLs supplied by untrusted parties
///
/// Every call checks the URL with a [`UriGuard`], snapshots the current
/// [`RequestLimits`] and runs one logical request under those limits.
/// Fetchers are cheap to clone; clones share the transport, the guard and
/// the limits.
#[derive(Debug)]
pub struct BoundedFetcher<T = ReqwestTransport> {
    transport: Arc<T>,
    guard: Arc<UriGuard>,
    limits: LimitsHandle,
}

impl<T> Clone for BoundedFetcher<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            guard: Arc::clone(&self.guard),
            limits: self.limits.clone(),
        }
    }
}

impl Default for BoundedFetcher<ReqwestTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl BoundedFetcher<ReqwestTransport> {
    /// Fetcher with default limits, the default guard and a reqwest transport
    pub fn new() -> Self {
        Self::with_transport(ReqwestTransport::new())
    }

    /// Fetcher configured from deserialized settings
    pub fn from_settings(settings: &FetchSettings) -> Result<Self, FetchError> {
        let limits = RequestLimits::try_from(settings)?;
        Ok(Self::new()
            .with_limits(LimitsHandle::new(limits))
            .with_guard(settings.uri_guard()))
    }
}

impl<T> BoundedFetcher<T>
where
    T: Transport,
{
    /// Fetcher using a custom transport
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
            guard: Arc::new(UriGuard::default()),
            limits: LimitsHandle::default(),
        }
    }

    /// Replace the guard
    #[must_use]
    pub fn with_guard(mut self, guard: UriGuard) -> Self {
        self.guard = Arc::new(guard);
        self
    }

    /// Share an existing limits handle
    #[must_use]
    pub fn with_limits(mut self, limits: LimitsHandle) -> Self {
        self.limits = limits;
        self
    }

    /// Transport in use
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Guard in use
    pub fn uri_guard(&self) -> &UriGuard {
        &self.guard
    }

    /// Current limits
    pub fn limits(&self) -> RequestLimits {
        self.limits.snapshot()
    }

    /// Handle to the shared limits
    pub fn limits_handle(&self) -> &LimitsHandle {
        &self.limits
    }

    /// Set the response cap for requests started from now on
    pub fn set_max_response_bytes(&self, bytes: usize) -> Result<(), FetchError> {
        self.limits.set_max_response_bytes(bytes)
    }

    /// Set the redirect cap for requests started from now on
    pub fn set_max_redirects(&self, redirects: usize) -> Result<(), FetchError> {
        self.limits.set_max_redirects(redirects)
    }

    /// Set the per-operation timeout for requests started from now on
    pub fn set_read_write_timeout(&self, timeout: Duration) -> Result<(), FetchError> {
        self.limits.set_read_write_timeout(timeout)
    }

    /// Set the whole-exchange timeout for requests started from now on
    pub fn set_total_timeout(&self, timeout: Duration) -> Result<(), FetchError> {
        self.limits.set_total_timeout(timeout)
    }

    /// GET `url`
    pub async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        self.execute(FetchRequest::get(parse_url(url)?)).await
    }

    /// POST a form-encoded `body` to `url`
    pub async fn post(
        &self,
        url: &str,
        body: impl Into<Bytes>,
    ) -> Result<FetchResponse, FetchError> {
        self.execute(FetchRequest::post(parse_url(url)?, body)).await
    }

    /// GET or POST `url` depending on `body`, optionally restricting `Accept`
    pub async fn fetch_with(
        &self,
        url: &str,
        body: Option<Bytes>,
        accept_types: Option<Vec<String>>,
    ) -> Result<FetchResponse, FetchError> {
        let mut request = FetchRequest::get(parse_url(url)?);
        if let Some(body) = body {
            request = request.with_body(body);
        }
        if let Some(accept_types) = accept_types {
            request = request.with_accept_types(accept_types);
        }
        self.execute(request).await
    }

    /// Run a request
    ///
    /// Fails with [`FetchError::UnsafeUrl`] before any I/O when the guard
    /// rejects the URL. Any HTTP status is returned as a response.
    #[instrument(skip(self, request), fields(url = %request.url(), method = %request.method()))]
    pub async fn execute(&self, request: FetchRequest) -> Result<FetchResponse, FetchError> {
        if let Err(reason) = self.guard.check(request.url()) {
            tracing::warn!("Rejected unsafe URL {}: {}", request.url(), reason);
            return Err(FetchError::UnsafeUrl {
                url: request.url().to_string(),
                reason,
            });
        }

        let limits = self.limits.snapshot();

        tokio::time::timeout(limits.total_timeout(), self.exchange(&request, &limits))
            .await
            .map_err(|_| {
                tracing::debug!(
                    "Exchange exceeded {} ms",
                    limits.total_timeout().as_millis()
                );
                FetchError::Timeout
            })?
    }

    async fn exchange(
        &self,
        request: &FetchRequest,
        limits: &RequestLimits,
    ) -> Result<FetchResponse, FetchError> {
        let mut expect = ExpectContinue::default();

        let response = loop {
            let response = self
                .transport
                .send(Exchange {
                    method: request.method(),
                    url: request.url(),
                    headers: request.headers(expect)?,
                    body: request.body().cloned(),
                    limits,
                    guard: &self.guard,
                })
                .await?;

            // Only a request that sent the preamble can have it refused
            if response.status == EXPECTATION_FAILED && request.body().is_some() {
                if let Some(next) = expect.after_expectation_failed() {
                    tracing::debug!("Expectation failed, retrying without Expect: 100-continue");
                    drop(response);
                    expect = next;
                    continue;
                }
            }

            break response;
        };

        let TransportResponse {
            status,
            url,
            headers,
            content_length,
            body,
        } = response;

        let body = read_bounded(
            body,
            content_length,
            limits.max_response_bytes(),
            limits.read_write_timeout(),
        )
        .await?;

        if body.truncated {
            tracing::debug!(
                "Response from {} cut at {} bytes",
                url,
                limits.max_response_bytes()
            );
        }

        Ok(FetchResponse::new(
            request.url().clone(),
            url,
            status,
            headers,
            body.bytes,
            body.truncated,
        ))
    }
}
