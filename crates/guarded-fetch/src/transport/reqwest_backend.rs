//! reqwest-based transport

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::redirect::Policy;
use thiserror::Error;

use super::{Exchange, Transport, TransportResponse};
use crate::error::FetchError;
use crate::guard::{RejectReason, UriGuard};
use crate::limits::RequestLimits;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Reason the redirect policy stopped a chain
///
/// Handed to reqwest as the policy error and recovered from the error's
/// source chain when converting into [`FetchError`].
#[derive(Debug, Clone, Error)]
pub(crate) enum RedirectRejected {
    #[error("redirect limit of {limit} exceeded")]
    TooMany { limit: usize },
    #[error("redirect to unsafe URL {url}: {reason}")]
    Unsafe { url: String, reason: RejectReason },
}

/// Transport backed by a fresh [`reqwest::Client`] per exchange
///
/// Nothing is pooled between exchanges: no idle connections, no proxy
/// discovered from the environment, no cookies.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    _private: (),
}

impl ReqwestTransport {
    /// Create a new transport
    pub fn new() -> Self {
        Self::default()
    }

    fn client(limits: &RequestLimits, guard: &UriGuard) -> Result<reqwest::Client, FetchError> {
        reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(redirect_policy(limits.max_redirects(), guard.clone()))
            // No per-write timeout exists; request body uploads are bounded by `timeout` alone
            .timeout(limits.total_timeout())
            .connect_timeout(limits.read_write_timeout())
            .read_timeout(limits.read_write_timeout())
            .pool_max_idle_per_host(0)
            .no_proxy()
            .build()
            .map_err(|e| FetchError::Transport(format!("failed to build client: {e}")))
    }
}

fn redirect_policy(max_redirects: usize, guard: UriGuard) -> Policy {
    Policy::custom(move |attempt| {
        // previous() includes the original URL, so its length is the hop count
        if attempt.previous().len() > max_redirects {
            return attempt.error(RedirectRejected::TooMany {
                limit: max_redirects,
            });
        }

        match guard.check(attempt.url()) {
            Ok(()) => attempt.follow(),
            Err(reason) => {
                let url = attempt.url().to_string();
                attempt.error(RedirectRejected::Unsafe { url, reason })
            }
        }
    })
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, exchange: Exchange<'_>) -> Result<TransportResponse, FetchError> {
        let client = Self::client(exchange.limits, exchange.guard)?;

        let mut request = client
            .request(exchange.method, exchange.url.clone())
            .headers(exchange.headers);
        if let Some(body) = exchange.body {
            request = request.body(body);
        }

        let response = request.send().await?;

        Ok(TransportResponse {
            status: response.status().as_u16(),
            url: response.url().clone(),
            headers: response.headers().clone(),
            content_length: response.content_length(),
            body: Box::pin(
                response
                    .bytes_stream()
                    .map(|chunk| chunk.map_err(FetchError::from)),
            ),
        })
    }
}
