//! Normalized IP address literals.
//!
//! Allow-list equality is exact value equality after normalization: an
//! `Address` always holds the canonical dotted-quad rendering of an IPv4
//! address, so two addresses are equal iff their strings are equal. There is
//! no CIDR or prefix matching anywhere in the system.

use std::borrow::Borrow;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{CoreError, Result};

/// A normalized IPv4 address literal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Parse an address from provider-reported text.
    ///
    /// Surrounding whitespace is trimmed and the result is stored in the
    /// canonical `Ipv4Addr` rendering, collapsing variants like leading
    /// zeros.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidAddress` for empty input or anything that
    /// is not an IPv4 literal (IPv6 included; the allow-list targets only
    /// carry IPv4 rules).
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let parsed: Ipv4Addr = trimmed
            .parse()
            .map_err(|_| CoreError::invalid_address(trimmed))?;
        Ok(Self(parsed.to_string()))
    }

    /// The canonical string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Lets `BTreeSet<Address>` be probed with a plain `&str` (rule addresses come
// back from providers as strings).
impl Borrow<str> for Address {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl FromStr for Address {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_parse_trims_whitespace() {
        let addr = Address::parse("  10.0.0.5 ").unwrap();
        assert_eq!(addr.as_str(), "10.0.0.5");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(Address::parse("").is_err());
        assert!(Address::parse("   ").is_err());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Address::parse("not-an-ip").is_err());
        assert!(Address::parse("1.2.3").is_err());
        assert!(Address::parse("1.2.3.4.5").is_err());
        assert!(Address::parse("256.1.1.1").is_err());
    }

    #[test]
    fn test_parse_rejects_ipv6() {
        assert!(Address::parse("2001:db8::1").is_err());
    }

    #[test]
    fn test_equality_is_exact_after_normalization() {
        let a = Address::parse("1.2.3.4").unwrap();
        let b = Address::parse(" 1.2.3.4").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_set_lookup_by_str() {
        let mut set = BTreeSet::new();
        set.insert(Address::parse("5.6.7.8").unwrap());
        assert!(set.contains("5.6.7.8"));
        assert!(!set.contains("5.6.7.9"));
    }

    #[test]
    fn test_from_str() {
        let addr: Address = "9.9.9.9".parse().unwrap();
        assert_eq!(addr.to_string(), "9.9.9.9");
    }
}
