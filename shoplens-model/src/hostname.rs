use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Label pattern for an acceptable hostname: an alphanumeric first label
/// (hyphens allowed inside, max 63 chars) followed by at least one
/// alphabetic TLD-style label of two or more characters.
static DOMAIN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9][a-z0-9-]{0,61}[a-z0-9](?:\.[a-z]{2,})+$")
        .expect("domain pattern compiles")
});

/// Errors produced when normalizing a submission into a [`Hostname`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostnameError {
    Empty,
    InvalidDomain(String),
    InvalidUrl(String),
    UnsupportedScheme(String),
}

impl fmt::Display for HostnameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostnameError::Empty => write!(f, "submission is empty"),
            HostnameError::InvalidDomain(raw) => {
                write!(f, "not a valid domain name: {raw}")
            }
            HostnameError::InvalidUrl(raw) => {
                write!(f, "not a valid URL: {raw}")
            }
            HostnameError::UnsupportedScheme(scheme) => {
                write!(f, "only http and https URLs are allowed, got {scheme}")
            }
        }
    }
}

impl std::error::Error for HostnameError {}

/// Normalized, validated hostname used as the subject key for checks.
///
/// Values are always lowercase, scheme-less and free of a leading `www.`
/// label; construction goes through [`Hostname::parse`] only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Hostname(String);

impl Hostname {
    /// Normalize a raw user submission into a hostname.
    ///
    /// Accepts bare domains (`shop.example`), full URLs
    /// (`https://shop.example/cart`) and mixed-case input. Inputs without
    /// an http/https scheme are validated directly as domains; anything
    /// else goes through URL parsing and the host component is taken.
    pub fn parse(input: &str) -> Result<Self, HostnameError> {
        let lowered = input.trim().to_ascii_lowercase();
        if lowered.is_empty() {
            return Err(HostnameError::Empty);
        }

        if !lowered.starts_with("http://") && !lowered.starts_with("https://")
        {
            return Self::validated(&lowered);
        }

        let parsed = Url::parse(&lowered)
            .map_err(|_| HostnameError::InvalidUrl(lowered.clone()))?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => {
                return Err(HostnameError::UnsupportedScheme(other.to_owned()));
            }
        }
        let host = parsed
            .host_str()
            .ok_or_else(|| HostnameError::InvalidUrl(lowered.clone()))?;
        Self::validated(host)
    }

    fn validated(candidate: &str) -> Result<Self, HostnameError> {
        let candidate = candidate.strip_prefix("www.").unwrap_or(candidate);
        if DOMAIN_PATTERN.is_match(candidate) {
            Ok(Self(candidate.to_owned()))
        } else {
            Err(HostnameError::InvalidDomain(candidate.to_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Hostname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Hostname {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bare_domain() {
        let host = Hostname::parse("shop.example").unwrap();
        assert_eq!(host.as_str(), "shop.example");
    }

    #[test]
    fn lowercases_and_trims() {
        let host = Hostname::parse("  Shop.Example  ").unwrap();
        assert_eq!(host.as_str(), "shop.example");
    }

    #[test]
    fn strips_www_from_bare_domain() {
        let host = Hostname::parse("www.shop.example").unwrap();
        assert_eq!(host.as_str(), "shop.example");
    }

    #[test]
    fn extracts_host_from_url() {
        let host =
            Hostname::parse("HTTPS://WWW.Shop.Example/cart?ref=1").unwrap();
        assert_eq!(host.as_str(), "shop.example");
    }

    #[test]
    fn accepts_http_scheme() {
        let host = Hostname::parse("http://store.example").unwrap();
        assert_eq!(host.as_str(), "store.example");
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(Hostname::parse("   "), Err(HostnameError::Empty));
    }

    #[test]
    fn rejects_single_label() {
        assert!(matches!(
            Hostname::parse("localhost"),
            Err(HostnameError::InvalidDomain(_))
        ));
    }

    #[test]
    fn rejects_non_http_scheme_via_domain_check() {
        // `ftp://x.example` never reaches URL parsing; the scheme makes it
        // fail domain validation outright.
        assert!(Hostname::parse("ftp://x.example").is_err());
    }

    #[test]
    fn rejects_hyphen_at_label_edge() {
        assert!(Hostname::parse("-shop.example").is_err());
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = Hostname::parse("https://www.Shop.Example/x").unwrap();
        let twice = Hostname::parse(once.as_str()).unwrap();
        assert_eq!(once, twice);
    }
}
