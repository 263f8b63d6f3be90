//! Deserializable fetch settings

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::guard::{GuardPolicy, UriGuard};
use crate::limits::{
    RequestLimits, DEFAULT_MAX_REDIRECTS, DEFAULT_MAX_RESPONSE_BYTES, DEFAULT_READ_WRITE_TIMEOUT,
    DEFAULT_TOTAL_TIMEOUT,
};

/// Settings as they appear in a config file
///
/// Every field is optional in the source; missing ones take the library
/// defaults. Values are validated when converted into [`RequestLimits`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Response cap in bytes
    pub max_response_bytes: usize,
    /// Redirect cap
    pub max_redirects: usize,
    /// Per-operation timeout in milliseconds
    pub read_write_timeout_ms: u64,
    /// Whole-exchange timeout in milliseconds
    pub total_timeout_ms: u64,
    /// URL guard rules
    pub guard: GuardPolicy,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            read_write_timeout_ms: DEFAULT_READ_WRITE_TIMEOUT.as_millis() as u64,
            total_timeout_ms: DEFAULT_TOTAL_TIMEOUT.as_millis() as u64,
            guard: GuardPolicy::default(),
        }
    }
}

impl FetchSettings {
    /// Guard built from [`FetchSettings::guard`]
    pub fn uri_guard(&self) -> UriGuard {
        UriGuard::new(self.guard.clone())
    }
}

impl TryFrom<&FetchSettings> for RequestLimits {
    type Error = FetchError;

    fn try_from(settings: &FetchSettings) -> Result<Self, Self::Error> {
        let mut limits = RequestLimits::default();
        limits.set_max_response_bytes(settings.max_response_bytes)?;
        limits.set_max_redirects(settings.max_redirects)?;
        limits.set_read_write_timeout(Duration::from_millis(settings.read_write_timeout_ms))?;
        limits.set_total_timeout(Duration::from_millis(settings.total_timeout_ms))?;
        Ok(limits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_match_default_limits() {
        let limits = RequestLimits::try_from(&FetchSettings::default()).expect("defaults are valid");
        assert_eq!(limits, RequestLimits::default());
    }

    #[test]
    fn test_partial_settings() {
        let settings: FetchSettings = serde_json::from_str(
            r#"{"max_response_bytes": 4096, "total_timeout_ms": 2500, "guard": {"require_dotted_hostname": false}}"#,
        )
        .expect("valid settings");

        let limits = RequestLimits::try_from(&settings).expect("valid limits");
        assert_eq!(limits.max_response_bytes(), 4096);
        assert_eq!(limits.max_redirects(), DEFAULT_MAX_REDIRECTS);
        assert_eq!(limits.total_timeout(), Duration::from_millis(2500));

        let guard = settings.uri_guard();
        assert!(!guard.policy().require_dotted_hostname);
        assert_eq!(guard.policy().blocked_ipv4_first_octets, vec![127, 10]);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = FetchSettings {
            max_response_bytes: 512,
            ..Default::default()
        };
        assert!(matches!(
            RequestLimits::try_from(&settings),
            Err(FetchError::InvalidConfiguration(_))
        ));

        let settings = FetchSettings {
            read_write_timeout_ms: 0,
            ..Default::default()
        };
        assert!(RequestLimits::try_from(&settings).is_err());
    }
}
