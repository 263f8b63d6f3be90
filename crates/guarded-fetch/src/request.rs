//! Outbound request description

use bytes::Bytes;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, CONNECTION, CONTENT_LENGTH, CONTENT_TYPE, EXPECT,
};
use reqwest::Method;
use url::Url;

use crate::error::FetchError;

/// Content type sent with every request body
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// `Accept` value sent when no accept types are given
pub const ACCEPT_ANY: &str = "*/*";

/// Expect-Continue handling for a single logical request
///
/// Threaded through the retry loop by value; it never touches client-wide or
/// per-host state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpectContinue {
    /// First attempt; POSTs carry `Expect: 100-continue`
    #[default]
    Initial,
    /// The server rejected the preamble once; it is no longer sent
    RetriedWithoutExpectContinue,
}

impl ExpectContinue {
    /// Whether a request with a body sends the preamble in this state
    pub fn sends_preamble(self) -> bool {
        matches!(self, ExpectContinue::Initial)
    }

    /// State to retry in after a 417, or `None` when the retry is spent
    pub fn after_expectation_failed(self) -> Option<Self> {
        match self {
            ExpectContinue::Initial => Some(ExpectContinue::RetriedWithoutExpectContinue),
            ExpectContinue::RetriedWithoutExpectContinue => None,
        }
    }
}

/// A fetch to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    url: Url,
    body: Option<Bytes>,
    accept_types: Option<Vec<String>>,
}

impl FetchRequest {
    /// GET request for `url`
    pub fn get(url: Url) -> Self {
        Self {
            url,
            body: None,
            accept_types: None,
        }
    }

    /// POST request for `url` with a form-encoded body
    pub fn post(url: Url, body: impl Into<Bytes>) -> Self {
        Self::get(url).with_body(body)
    }

    /// GET request for a URL string
    pub fn parse(url: &str) -> Result<Self, FetchError> {
        Ok(Self::get(parse_url(url)?))
    }

    /// Attach a body, turning the request into a POST
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Media types sent in the `Accept` header
    #[must_use]
    pub fn with_accept_types<I, S>(mut self, accept_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accept_types = Some(accept_types.into_iter().map(Into::into).collect());
        self
    }

    /// Target URL
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Request body, if any
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Accepted media types, if any
    pub fn accept_types(&self) -> Option<&[String]> {
        self.accept_types.as_deref()
    }

    /// `POST` when a body is present, `GET` otherwise
    pub fn method(&self) -> Method {
        if self.body.is_some() {
            Method::POST
        } else {
            Method::GET
        }
    }

    /// Headers for one attempt of this request
    pub fn headers(&self, expect: ExpectContinue) -> Result<HeaderMap, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONNECTION, HeaderValue::from_static("close"));

        let accept = match self.accept_types.as_ref().filter(|t| !t.is_empty()) {
            Some(accept_types) => HeaderValue::from_str(&accept_types.join(",")).map_err(|_| {
                FetchError::InvalidArgument("accept types contain invalid characters".to_string())
            })?,
            None => HeaderValue::from_static(ACCEPT_ANY),
        };
        headers.insert(ACCEPT, accept);

        if let Some(body) = &self.body {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
            headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
            if expect.sends_preamble() {
                headers.insert(EXPECT, HeaderValue::from_static("100-continue"));
            }
        }

        Ok(headers)
    }
}

/// Parse a caller supplied URL string
pub(crate) fn parse_url(input: &str) -> Result<Url, FetchError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(FetchError::InvalidArgument("url must not be empty".to_string()));
    }
    Url::parse(input).map_err(|e| FetchError::InvalidArgument(format!("invalid url: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("https://example.com/openid").expect("valid url")
    }

    #[test]
    fn test_get_headers() {
        let request = FetchRequest::get(url());
        assert_eq!(request.method(), Method::GET);

        let headers = request
            .headers(ExpectContinue::Initial)
            .expect("valid headers");
        assert_eq!(headers.get(CONNECTION).expect("connection"), "close");
        assert!(headers.get(CONTENT_TYPE).is_none());
        assert!(headers.get(EXPECT).is_none());
        assert_eq!(headers.get(ACCEPT).expect("accept"), ACCEPT_ANY);
    }

    #[test]
    fn test_post_headers() {
        let request = FetchRequest::post(url(), "openid.mode=check_authentication");
        assert_eq!(request.method(), Method::POST);

        let headers = request
            .headers(ExpectContinue::Initial)
            .expect("valid headers");
        assert_eq!(
            headers.get(CONTENT_TYPE).expect("content type"),
            FORM_CONTENT_TYPE
        );
        assert_eq!(headers.get(CONTENT_LENGTH).expect("content length"), "32");
        assert_eq!(headers.get(EXPECT).expect("expect"), "100-continue");

        let retry = request
            .headers(ExpectContinue::RetriedWithoutExpectContinue)
            .expect("valid headers");
        assert!(retry.get(EXPECT).is_none());
        assert_eq!(retry.get(CONTENT_LENGTH).expect("content length"), "32");
    }

    #[test]
    fn test_accept_header_joined() {
        let request = FetchRequest::get(url())
            .with_accept_types(["application/xrds+xml", "text/html"]);
        let headers = request
            .headers(ExpectContinue::Initial)
            .expect("valid headers");
        assert_eq!(
            headers.get(ACCEPT).expect("accept"),
            "application/xrds+xml,text/html"
        );

        let empty = FetchRequest::get(url()).with_accept_types(Vec::<String>::new());
        let headers = empty
            .headers(ExpectContinue::Initial)
            .expect("valid headers");
        assert_eq!(headers.get(ACCEPT).expect("accept"), ACCEPT_ANY);
    }

    #[test]
    fn test_accept_header_rejects_control_characters() {
        let request = FetchRequest::get(url()).with_accept_types(["text/html\r\nX-Injected: 1"]);
        assert!(matches!(
            request.headers(ExpectContinue::Initial),
            Err(FetchError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_expect_continue_transitions() {
        let state = ExpectContinue::default();
        assert!(state.sends_preamble());

        let retried = state
            .after_expectation_failed()
            .expect("first 417 allows a retry");
        assert_eq!(retried, ExpectContinue::RetriedWithoutExpectContinue);
        assert!(!retried.sends_preamble());
        assert!(retried.after_expectation_failed().is_none());
    }

    #[test]
    fn test_parse_url() {
        assert!(matches!(
            FetchRequest::parse(""),
            Err(FetchError::InvalidArgument(_))
        ));
        assert!(matches!(
            FetchRequest::parse("   "),
            Err(FetchError::InvalidArgument(_))
        ));
        assert!(matches!(
            FetchRequest::parse("not a url"),
            Err(FetchError::InvalidArgument(_))
        ));

        let request = FetchRequest::parse(" https://example.com/ ").expect("valid url");
        assert_eq!(request.url().as_str(), "https://example.com/");
    }
}
