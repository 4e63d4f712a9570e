//! Domain allow-list for outbound fetches
//!
//! Every URL the relay hands out or the proxy fetches must pass
//! [`AllowList::is_allowed`]. This is what keeps `/image` from being used
//! as an open relay to arbitrary hosts.

use url::Url;

/// Domains permitted by default
pub const DEFAULT_ALLOWED_DOMAINS: &[&str] = &["pinimg.com", "i.pinimg.com", "pinterest.com"];

/// Immutable set of permitted host suffixes
///
/// A host is allowed when it equals one of the domains or is a subdomain
/// of one (`sub.pinimg.com` matches `pinimg.com`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    domains: Vec<String>,
}

impl AllowList {
    /// Create an allow-list from the given domains
    ///
    /// Entries are trimmed and lower-cased; blank entries are dropped.
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let domains = domains
            .into_iter()
            .map(|d| d.as_ref().trim().trim_matches('.').to_ascii_lowercase())
            .filter(|d| !d.is_empty())
            .collect();
        Self { domains }
    }

    /// The configured domains
    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// Check whether a raw URL string points at an allowed host
    ///
    /// Fails closed: unparseable URLs and URLs without a host are rejected.
    pub fn is_allowed(&self, raw_url: &str) -> bool {
        let Ok(parsed) = Url::parse(raw_url) else {
            return false;
        };

        match parsed.host_str() {
            Some(host) if !host.is_empty() => self.is_allowed_host(host),
            _ => false,
        }
    }

    /// Check a bare host name against the list
    pub fn is_allowed_host(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        self.domains.iter().any(|domain| {
            host == *domain
                || host
                    .strip_suffix(domain.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}

impl Default for AllowList {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_DOMAINS)
    }
}
