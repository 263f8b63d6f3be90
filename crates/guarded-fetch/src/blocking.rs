//! Blocking facade over [`BoundedFetcher`]

use std::time::Duration;

use bytes::Bytes;
use tokio::runtime::{Builder, Runtime};

use crate::error::FetchError;
use crate::fetcher::BoundedFetcher;
use crate::guard::UriGuard;
use crate::limits::{LimitsHandle, RequestLimits};
use crate::request::FetchRequest;
use crate::response::FetchResponse;
use crate::settings::FetchSettings;

/// Synchronous fetcher
///
/// Each call blocks the calling thread until the exchange finishes. Share
/// one instance between threads behind an `Arc`; calls on different threads
/// run independently. Must not be used, or dropped, from within an async
/// runtime.
#[derive(Debug)]
pub struct BlockingFetcher {
    inner: BoundedFetcher,
    runtime: Runtime,
}

impl BlockingFetcher {
    /// Blocking fetcher with default limits and guard
    pub fn new() -> Result<Self, FetchError> {
        Self::from_fetcher(BoundedFetcher::new())
    }

    /// Blocking fetcher configured from deserialized settings
    pub fn from_settings(settings: &FetchSettings) -> Result<Self, FetchError> {
        Self::from_fetcher(BoundedFetcher::from_settings(settings)?)
    }

    /// Wrap an existing async fetcher
    pub fn from_fetcher(inner: BoundedFetcher) -> Result<Self, FetchError> {
        let runtime = Builder::new_multi_thread()
            .enable_all()
            .thread_name("guarded-fetch")
            .build()
            .map_err(|e| FetchError::Transport(format!("failed to start runtime: {e}")))?;

        Ok(Self { inner, runtime })
    }

    /// Async fetcher this one drives
    pub fn inner(&self) -> &BoundedFetcher {
        &self.inner
    }

    /// Guard in use
    pub fn uri_guard(&self) -> &UriGuard {
        self.inner.uri_guard()
    }

    /// Current limits
    pub fn limits(&self) -> RequestLimits {
        self.inner.limits()
    }

    /// Handle to the shared limits
    pub fn limits_handle(&self) -> &LimitsHandle {
        self.inner.limits_handle()
    }

    /// See [`BoundedFetcher::set_max_response_bytes`]
    pub fn set_max_response_bytes(&self, bytes: usize) -> Result<(), FetchError> {
        self.inner.set_max_response_bytes(bytes)
    }

    /// See [`BoundedFetcher::set_max_redirects`]
    pub fn set_max_redirects(&self, redirects: usize) -> Result<(), FetchError> {
        self.inner.set_max_redirects(redirects)
    }

    /// See [`BoundedFetcher::set_read_write_timeout`]
    pub fn set_read_write_timeout(&self, timeout: Duration) -> Result<(), FetchError> {
        self.inner.set_read_write_timeout(timeout)
    }

    /// See [`BoundedFetcher::set_total_timeout`]
    pub fn set_total_timeout(&self, timeout: Duration) -> Result<(), FetchError> {
        self.inner.set_total_timeout(timeout)
    }

    /// GET `url`
    pub fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        self.runtime.block_on(async { self.inner.fetch(url).await })
    }

    /// POST a form-encoded `body` to `url`
    pub fn post(&self, url: &str, body: impl Into<Bytes>) -> Result<FetchResponse, FetchError> {
        let body = body.into();
        self.runtime.block_on(async { self.inner.post(url, body).await })
    }

    /// See [`BoundedFetcher::fetch_with`]
    pub fn fetch_with(
        &self,
        url: &str,
        body: Option<Bytes>,
        accept_types: Option<Vec<String>>,
    ) -> Result<FetchResponse, FetchError> {
        self.runtime
            .block_on(async { self.inner.fetch_with(url, body, accept_types).await })
    }

    /// See [`BoundedFetcher::execute`]
    pub fn execute(&self, request: FetchRequest) -> Result<FetchResponse, FetchError> {
        self.runtime
            .block_on(async { self.inner.execute(request).await })
    }
}
