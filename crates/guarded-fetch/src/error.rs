//! Fetch error types

use std::error::Error as StdError;

use thiserror::Error;

use crate::guard::RejectReason;
use crate::transport::reqwest_backend::RedirectRejected;

/// Errors surfaced by a fetch
///
/// Non-2xx HTTP statuses are not errors; they come back as ordinary
/// [`FetchResponse`](crate::FetchResponse) values.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL was empty or could not be parsed, or a header value was invalid
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// The URL (or a redirect hop) failed a guard rule
    #[error("Unsafe URL {url}: {reason}")]
    UnsafeUrl {
        /// Rejected URL
        url: String,
        /// Rule that rejected it
        reason: RejectReason,
    },
    /// A limit setter received an out-of-range value
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// Per-operation or total time budget exceeded
    #[error("Request timeout")]
    Timeout,
    /// Redirect chain longer than the configured cap
    #[error("Too many redirects (limit {limit})")]
    TooManyRedirects {
        /// Configured redirect cap
        limit: usize,
    },
    /// Connection-level failure with no usable response
    #[error("Transport error: {0}")]
    Transport(String),
}

impl FetchError {
    /// Whether a higher layer may reasonably try the same URL again later
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Timeout | FetchError::Transport(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return FetchError::Timeout;
        }

        if err.is_redirect() {
            let mut source = err.source();
            while let Some(inner) = source {
                if let Some(rejected) = inner.downcast_ref::<RedirectRejected>() {
                    return rejected.clone().into();
                }
                source = inner.source();
            }
        }

        if err.is_builder() {
            return FetchError::InvalidArgument(err.to_string());
        }

        FetchError::Transport(err.to_string())
    }
}

impl From<RedirectRejected> for FetchError {
    fn from(rejected: RedirectRejected) -> Self {
        match rejected {
            RedirectRejected::TooMany { limit } => FetchError::TooManyRedirects { limit },
            RedirectRejected::Unsafe { url, reason } => FetchError::UnsafeUrl { url, reason },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_unsafe_url_display() {
        let error = FetchError::UnsafeUrl {
            url: "ftp://example.com/".to_string(),
            reason: RejectReason::UnsupportedScheme("ftp".to_string()),
        };
        assert_eq!(
            format!("{}", error),
            "Unsafe URL ftp://example.com/: unsupported scheme `ftp`"
        );
    }

    #[test]
    fn test_fetch_error_timeout_display() {
        let error = FetchError::Timeout;
        assert_eq!(format!("{}", error), "Request timeout");
    }

    #[test]
    fn test_fetch_error_too_many_redirects_display() {
        let error = FetchError::TooManyRedirects { limit: 3 };
        assert_eq!(format!("{}", error), "Too many redirects (limit 3)");
    }

    #[test]
    fn test_fetch_error_invalid_configuration_display() {
        let error = FetchError::InvalidConfiguration("too small".to_string());
        assert_eq!(format!("{}", error), "Invalid configuration: too small");
    }

    #[test]
    fn test_fetch_error_transport_display() {
        let error = FetchError::Transport("connection refused".to_string());
        assert_eq!(format!("{}", error), "Transport error: connection refused");
    }

    #[test]
    fn test_redirect_rejection_conversion() {
        let error: FetchError = RedirectRejected::TooMany { limit: 2 }.into();
        assert!(matches!(error, FetchError::TooManyRedirects { limit: 2 }));

        let error: FetchError = RedirectRejected::Unsafe {
            url: "http://10.0.0.1/".to_string(),
            reason: RejectReason::BlockedIpv4("10.0.0.1".parse().expect("valid ip")),
        }
        .into();
        assert!(matches!(
            error,
            FetchError::UnsafeUrl {
                reason: RejectReason::BlockedIpv4(_),
                ..
            }
        ));
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(FetchError::Timeout.is_retryable());
        assert!(FetchError::Transport("reset".to_string()).is_retryable());
        assert!(!FetchError::TooManyRedirects { limit: 1 }.is_retryable());
        assert!(!FetchError::InvalidArgument("empty".to_string()).is_retryable());
    }
}
