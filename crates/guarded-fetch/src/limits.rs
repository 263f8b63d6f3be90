//! Request limits
//!
//! [`RequestLimits`] is a plain `Copy` value. [`LimitsHandle`] shares one
//! between a fetcher and whoever administers it; every fetch takes a
//! snapshot when it starts, so a later change never reaches a request that
//! is already in flight.

use std::sync::{Arc, RwLock as StdRwLock};
use std::time::Duration;

use crate::error::FetchError;

/// Smallest accepted response cap in bytes
pub const MIN_RESPONSE_BYTES: usize = 2048;

/// Default response cap (1 MiB)
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 1024 * 1024;

/// Default redirect cap
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Default per-operation timeout
#[cfg(not(debug_assertions))]
pub const DEFAULT_READ_WRITE_TIMEOUT: Duration = Duration::from_millis(500);

/// Default per-operation timeout, relaxed for debug builds
#[cfg(debug_assertions)]
pub const DEFAULT_READ_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Default budget for the whole exchange
pub const DEFAULT_TOTAL_TIMEOUT: Duration = Duration::from_secs(10);

/// Bounds applied to every outbound request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLimits {
    max_response_bytes: usize,
    max_redirects: usize,
    read_write_timeout: Duration,
    total_timeout: Duration,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            read_write_timeout: DEFAULT_READ_WRITE_TIMEOUT,
            total_timeout: DEFAULT_TOTAL_TIMEOUT,
        }
    }
}

impl RequestLimits {
    /// Maximum number of body bytes kept from a response
    pub fn max_response_bytes(&self) -> usize {
        self.max_response_bytes
    }

    /// Maximum number of redirects followed
    pub fn max_redirects(&self) -> usize {
        self.max_redirects
    }

    /// Timeout for each connect or read
    pub fn read_write_timeout(&self) -> Duration {
        self.read_write_timeout
    }

    /// Timeout for the whole exchange, retries and body read included
    pub fn total_timeout(&self) -> Duration {
        self.total_timeout
    }

    /// Set the response cap; must be at least [`MIN_RESPONSE_BYTES`]
    pub fn set_max_response_bytes(&mut self, bytes: usize) -> Result<(), FetchError> {
        if bytes < MIN_RESPONSE_BYTES {
            return Err(FetchError::InvalidConfiguration(format!(
                "max_response_bytes must be at least {MIN_RESPONSE_BYTES}, got {bytes}"
            )));
        }
        self.max_response_bytes = bytes;
        Ok(())
    }

    /// Set the redirect cap
    pub fn set_max_redirects(&mut self, redirects: usize) -> Result<(), FetchError> {
        self.max_redirects = redirects;
        Ok(())
    }

    /// Set the per-operation timeout; zero is rejected
    pub fn set_read_write_timeout(&mut self, timeout: Duration) -> Result<(), FetchError> {
        self.read_write_timeout = non_zero("read_write_timeout", timeout)?;
        Ok(())
    }

    /// Set the total exchange timeout; zero is rejected
    pub fn set_total_timeout(&mut self, timeout: Duration) -> Result<(), FetchError> {
        self.total_timeout = non_zero("total_timeout", timeout)?;
        Ok(())
    }
}

fn non_zero(name: &str, timeout: Duration) -> Result<Duration, FetchError> {
    if timeout.is_zero() {
        return Err(FetchError::InvalidConfiguration(format!(
            "{name} must be greater than zero"
        )));
    }
    Ok(timeout)
}

/// Shared, mutable [`RequestLimits`]
///
/// Cloning the handle shares the underlying value.
#[derive(Debug, Clone, Default)]
pub struct LimitsHandle {
    inner: Arc<StdRwLock<RequestLimits>>,
}

impl LimitsHandle {
    /// Wrap a set of limits
    pub fn new(limits: RequestLimits) -> Self {
        Self {
            inner: Arc::new(StdRwLock::new(limits)),
        }
    }

    /// Copy of the current limits
    pub fn snapshot(&self) -> RequestLimits {
        // RequestLimits is always valid, so a poisoned lock still holds a usable value
        *self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Apply a validated change; the stored value is untouched on error
    pub fn update<F>(&self, change: F) -> Result<(), FetchError>
    where
        F: FnOnce(&mut RequestLimits) -> Result<(), FetchError>,
    {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut next = *guard;
        change(&mut next)?;
        *guard = next;
        Ok(())
    }

    /// See [`RequestLimits::set_max_response_bytes`]
    pub fn set_max_response_bytes(&self, bytes: usize) -> Result<(), FetchError> {
        self.update(|limits| limits.set_max_response_bytes(bytes))
    }

    /// See [`RequestLimits::set_max_redirects`]
    pub fn set_max_redirects(&self, redirects: usize) -> Result<(), FetchError> {
        self.update(|limits| limits.set_max_redirects(redirects))
    }

    /// See [`RequestLimits::set_read_write_timeout`]
    pub fn set_read_write_timeout(&self, timeout: Duration) -> Result<(), FetchError> {
        self.update(|limits| limits.set_read_write_timeout(timeout))
    }

    /// See [`RequestLimits::set_total_timeout`]
    pub fn set_total_timeout(&self, timeout: Duration) -> Result<(), FetchError> {
        self.update(|limits| limits.set_total_timeout(timeout))
    }
}
