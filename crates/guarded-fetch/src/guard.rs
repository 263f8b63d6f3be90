//! URL guard
//!
//! Decides whether a URL handed to us by a third party may be dereferenced.
//! The checks are purely syntactic: no DNS lookups happen here, so a dotted
//! hostname that resolves to an internal address still passes.

use std::net::{Ipv4Addr, Ipv6Addr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::{Host, Url};

/// Why a URL was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    /// Scheme other than `http` or `https`
    #[error("unsupported scheme `{0}`")]
    UnsupportedScheme(String),
    /// IPv4 literal in a blocked block
    #[error("blocked IPv4 address {0}")]
    BlockedIpv4(Ipv4Addr),
    /// The IPv6 loopback literal `::1`
    #[error("IPv6 loopback address")]
    Ipv6Loopback,
    /// Host missing or not recognised as a name or address
    #[error("unrecognized host address")]
    UnrecognizedAddress,
    /// Hostname without a `.`, typically an internal short name
    #[error("hostname `{0}` is not fully qualified")]
    UndottedHostname(String),
}

/// Tunable rule parameters for [`UriGuard`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardPolicy {
    /// IPv4 literals whose first octet is listed here are rejected
    pub blocked_ipv4_first_octets: Vec<u8>,
    /// Reject the `::1` literal
    pub block_ipv6_loopback: bool,
    /// Reject hostnames that contain no `.`
    pub require_dotted_hostname: bool,
}

impl Default for GuardPolicy {
    /// Loopback and `10/8` blocked. `172.16/12` and `192.168/16` are not.
    fn default() -> Self {
        Self {
            blocked_ipv4_first_octets: vec![127, 10],
            block_ipv6_loopback: true,
            require_dotted_hostname: true,
        }
    }
}

/// Validates URLs before any network I/O
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UriGuard {
    policy: GuardPolicy,
}

impl UriGuard {
    /// Create a guard with the given policy
    pub fn new(policy: GuardPolicy) -> Self {
        Self { policy }
    }

    /// Policy in use
    pub fn policy(&self) -> &GuardPolicy {
        &self.policy
    }

    /// Check a URL; the first failing rule wins
    pub fn check(&self, url: &Url) -> Result<(), RejectReason> {
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(RejectReason::UnsupportedScheme(other.to_string())),
        }

        match url.host() {
            Some(Host::Ipv4(addr)) => self.check_ipv4(addr),
            Some(Host::Ipv6(addr)) => self.check_ipv6(addr),
            Some(Host::Domain(name)) => self.check_domain(name),
            None => Err(RejectReason::UnrecognizedAddress),
        }
    }

    /// `true` when [`check`](Self::check) passes
    pub fn is_safe(&self, url: &Url) -> bool {
        self.check(url).is_ok()
    }

    fn check_ipv4(&self, addr: Ipv4Addr) -> Result<(), RejectReason> {
        if self
            .policy
            .blocked_ipv4_first_octets
            .contains(&addr.octets()[0])
        {
            return Err(RejectReason::BlockedIpv4(addr));
        }
        Ok(())
    }

    fn check_ipv6(&self, addr: Ipv6Addr) -> Result<(), RejectReason> {
        let octets = addr.octets();
        let loopback = octets[..15].iter().all(|b| *b == 0) && octets[15] == 1;
        if loopback && self.policy.block_ipv6_loopback {
            return Err(RejectReason::Ipv6Loopback);
        }
        Ok(())
    }

    fn check_domain(&self, name: &str) -> Result<(), RejectReason> {
        if name.is_empty() {
            return Err(RejectReason::UnrecognizedAddress);
        }
        if self.policy.require_dotted_hostname && !name.contains('.') {
            return Err(RejectReason::UndottedHostname(name.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(url: &str) -> Result<(), RejectReason> {
        UriGuard::default().check(&Url::parse(url).expect("valid url"))
    }

    #[test]
    fn test_rejects_non_http_schemes() {
        for url in [
            "file:///etc/passwd",
            "ftp://example.com/file",
            "gopher://example.com/",
            "openid+custom://example.com/",
            "data:text/plain,hello",
        ] {
            assert!(
                matches!(check(url), Err(RejectReason::UnsupportedScheme(_))),
                "{url} should be rejected"
            );
        }
    }

    #[test]
    fn test_accepts_http_and_https() {
        assert!(check("http://example.com/").is_ok());
        assert!(check("https://example.com/path?q=1").is_ok());
        assert!(check("HTTPS://EXAMPLE.COM/").is_ok());
    }

    #[test]
    fn test_rejects_loopback_and_ten_block() {
        assert_eq!(
            check("http://127.0.0.1/"),
            Err(RejectReason::BlockedIpv4(Ipv4Addr::new(127, 0, 0, 1)))
        );
        assert!(check("http://127.255.1.2:8080/").is_err());
        assert!(check("https://10.0.0.1/").is_err());
        assert!(check("https://10.200.3.4/admin").is_err());
    }

    #[test]
    fn test_rejects_alternate_ipv4_notations() {
        // The URL parser normalises these to 127.0.0.1
        assert!(check("http://2130706433/").is_err());
        assert!(check("http://0x7f.1/").is_err());
    }

    #[test]
    fn test_accepts_public_ipv4() {
        assert!(check("http://8.8.8.8/").is_ok());
        assert!(check("https://93.184.216.34/").is_ok());
    }

    #[test]
    fn test_other_private_ranges_pass_default_policy() {
        assert!(check("http://192.168.1.1/").is_ok());
        assert!(check("http://172.16.0.1/").is_ok());
    }

    #[test]
    fn test_ipv6_loopback() {
        assert_eq!(check("http://[::1]/"), Err(RejectReason::Ipv6Loopback));
        assert_eq!(
            check("http://[0:0:0:0:0:0:0:1]:8080/"),
            Err(RejectReason::Ipv6Loopback)
        );
        assert!(check("http://[::2]/").is_ok());
        assert!(check("http://[2001:db8::1]/").is_ok());
    }

    #[test]
    fn test_undotted_hostnames() {
        assert_eq!(
            check("http://intranet/"),
            Err(RejectReason::UndottedHostname("intranet".to_string()))
        );
        assert!(check("http://localhost:3000/").is_err());
        assert!(check("http://example.com/").is_ok());
        assert!(check("http://sub.example.co.uk/").is_ok());
    }

    #[test]
    fn test_custom_policy() {
        let guard = UriGuard::new(GuardPolicy {
            blocked_ipv4_first_octets: vec![10, 127, 172, 192],
            block_ipv6_loopback: false,
            require_dotted_hostname: false,
        });

        let url = |s: &str| Url::parse(s).expect("valid url");
        assert!(!guard.is_safe(&url("http://192.168.1.1/")));
        assert!(!guard.is_safe(&url("http://172.16.0.1/")));
        assert!(guard.is_safe(&url("http://[::1]/")));
        assert!(guard.is_safe(&url("http://intranet/")));
        assert!(!guard.is_safe(&url("ftp://intranet/")));
    }

    #[test]
    fn test_policy_deserializes_with_defaults() {
        let policy: GuardPolicy =
            serde_json::from_str(r#"{"blocked_ipv4_first_octets": [127, 10, 192]}"#)
                .expect("valid policy");
        assert_eq!(policy.blocked_ipv4_first_octets, vec![127, 10, 192]);
        assert!(policy.block_ipv6_loopback);
        assert!(policy.require_dotted_hostname);
    }
}
