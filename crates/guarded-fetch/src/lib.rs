//! Guarded outbound HTTP fetching
//!
//! Dereferences URLs that arrive from untrusted parties (identity provider
//! endpoints, discovery documents, callbacks) without letting them reach
//! internal hosts or tie up the caller. A [`UriGuard`] rejects unsafe URLs
//! before any I/O, and a [`BoundedFetcher`] runs the exchange under
//! timeouts, a redirect cap and a response size cap.
//!
//! # Example
//!
//! ```no_run
//! use guarded_fetch::{BoundedFetcher, FetchError};
//!
//! async fn example() -> Result<(), FetchError> {
//!     let fetcher = BoundedFetcher::new();
//!     fetcher.set_max_response_bytes(64 * 1024)?;
//!
//!     let response = fetcher
//!         .post("https://op.example.com/openid", "openid.mode=check_authentication")
//!         .await?;
//!
//!     if response.is_success() && !response.is_truncated() {
//!         println!("{}", response.text_lossy());
//!     }
//!     Ok(())
//! }
//! ```

mod blocking;
mod error;
mod fetcher;
mod guard;
mod limits;
mod read;
mod request;
mod response;
mod settings;
pub mod transport;

pub use blocking::BlockingFetcher;
pub use error::FetchError;
pub use fetcher::BoundedFetcher;
pub use guard::{GuardPolicy, RejectReason, UriGuard};
pub use limits::{
    LimitsHandle, RequestLimits, DEFAULT_MAX_REDIRECTS, DEFAULT_MAX_RESPONSE_BYTES,
    DEFAULT_READ_WRITE_TIMEOUT, DEFAULT_TOTAL_TIMEOUT, MIN_RESPONSE_BYTES,
};
pub use request::{ExpectContinue, FetchRequest, ACCEPT_ANY, FORM_CONTENT_TYPE};
pub use response::FetchResponse;
pub use settings::FetchSettings;
pub use transport::{ReqwestTransport, Transport};
