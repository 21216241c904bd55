//! IP allow-list for debug access.
//!
//! Entries are literal addresses (`10.0.0.7`, `::1`) or CIDR networks
//! (`192.168.0.0/16`, `fd00::/8`). IPv4-mapped IPv6 addresses are
//! canonicalised before matching, so `::ffff:10.0.0.7` matches `10.0.0.7`.
//! Mapped networks (`::ffff:10.0.0.0/104`) are stored as their IPv4 form.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use crate::error::BootstrapError;

/// A single allow-list entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpPattern {
    Exact(IpAddr),
    Network { network: IpAddr, prefix: u8 },
}

impl IpPattern {
    pub fn matches(&self, addr: IpAddr) -> bool {
        let addr = addr.to_canonical();
        match *self {
            Self::Exact(expected) => expected.to_canonical() == addr,
            Self::Network { network, prefix } => match (network, addr) {
                (IpAddr::V4(net), IpAddr::V4(ip)) => {
                    let mask = u32::MAX.checked_shl(32 - u32::from(prefix)).unwrap_or(0);
                    u32::from(net) & mask == u32::from(ip) & mask
                }
                (IpAddr::V6(net), IpAddr::V6(ip)) => {
                    let mask = u128::MAX.checked_shl(128 - u32::from(prefix)).unwrap_or(0);
                    u128::from(net) & mask == u128::from(ip) & mask
                }
                _ => false,
            },
        }
    }
}

impl FromStr for IpPattern {
    type Err = BootstrapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || BootstrapError::InvalidIpPattern(s.to_string());

        match s.split_once('/') {
            None => s
                .parse::<IpAddr>()
                .map(|addr| Self::Exact(addr.to_canonical()))
                .map_err(|_| invalid()),
            Some((addr, prefix)) => {
                let network: IpAddr = addr.parse().map_err(|_| invalid())?;
                let prefix: u8 = prefix.parse().map_err(|_| invalid())?;
                let max = if network.is_ipv4() { 32 } else { 128 };
                if prefix > max {
                    return Err(invalid());
                }
                // Requests are canonicalised to IPv4, so mapped networks must be too.
                if let IpAddr::V6(v6) = network
                    && let Some(v4) = v6.to_ipv4_mapped()
                {
                    if prefix < 96 {
                        return Err(invalid());
                    }
                    return Ok(Self::Network {
                        network: IpAddr::V4(v4),
                        prefix: prefix - 96,
                    });
                }
                Ok(Self::Network { network, prefix })
            }
        }
    }
}

impl fmt::Display for IpPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(addr) => write!(f, "{addr}"),
            Self::Network { network, prefix } => write!(f, "{network}/{prefix}"),
        }
    }
}

/// Ordered list of allowed addresses. An empty list allows every address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpAllowList {
    patterns: Vec<IpPattern>,
}

impl IpAllowList {
    pub fn new(patterns: Vec<IpPattern>) -> Self {
        Self { patterns }
    }

    /// Parses every entry, failing on the first invalid one.
    pub fn parse<I, S>(entries: I) -> Result<Self, BootstrapError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = entries
            .into_iter()
            .map(|entry| entry.as_ref().parse())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn patterns(&self) -> &[IpPattern] {
        &self.patterns
    }

    /// Whether `addr` passes the list.
    ///
    /// An unknown address only passes an empty list.
    pub fn permits(&self, addr: Option<IpAddr>) -> bool {
        if self.patterns.is_empty() {
            return true;
        }
        addr.is_some_and(|addr| self.patterns.iter().any(|p| p.matches(addr)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_exact_match() {
        let pattern: IpPattern = "10.0.0.7".parse().unwrap();
        assert!(pattern.matches(ip("10.0.0.7")));
        assert!(!pattern.matches(ip("10.0.0.8")));
    }

    #[test]
    fn test_ipv4_network() {
        let pattern: IpPattern = "192.168.0.0/16".parse().unwrap();
        assert!(pattern.matches(ip("192.168.44.1")));
        assert!(!pattern.matches(ip("192.169.0.1")));
        assert!(!pattern.matches(ip("::1")));
    }

    #[test]
    fn test_zero_prefix_matches_family() {
        let v4: IpPattern = "0.0.0.0/0".parse().unwrap();
        assert!(v4.matches(ip("8.8.8.8")));
        assert!(!v4.matches(ip("2001:db8::1")));

        let v6: IpPattern = "::/0".parse().unwrap();
        assert!(v6.matches(ip("2001:db8::1")));
    }

    #[test]
    fn test_ipv6_network() {
        let pattern: IpPattern = "fd00::/8".parse().unwrap();
        assert!(pattern.matches(ip("fd12:3456::1")));
        assert!(!pattern.matches(ip("fe80::1")));
    }

    #[test]
    fn test_ipv4_mapped_address_is_canonicalised() {
        let pattern: IpPattern = "10.0.0.7".parse().unwrap();
        assert!(pattern.matches(ip("::ffff:10.0.0.7")));
    }

    #[test]
    fn test_ipv4_mapped_network_is_canonicalised() {
        let pattern: IpPattern = "::ffff:10.0.0.0/104".parse().unwrap();
        assert_eq!(pattern.to_string(), "10.0.0.0/8");
        assert!(pattern.matches(ip("10.0.0.7")));
        assert!(pattern.matches(ip("::ffff:10.0.0.7")));
        assert!(!pattern.matches(ip("11.0.0.1")));

        let list = IpAllowList::parse(["::ffff:192.168.0.0/112"]).unwrap();
        assert!(list.permits(Some(ip("192.168.4.4"))));
    }

    #[test]
    fn test_ipv4_mapped_network_shorter_than_mapping_is_rejected() {
        assert!("::ffff:0.0.0.0/80".parse::<IpPattern>().is_err());
    }

    #[test]
    fn test_invalid_patterns() {
        for input in ["", "localhost", "10.0.0.0/33", "::/129", "10.0.0.0/x"] {
            assert!(
                input.parse::<IpPattern>().is_err(),
                "{input:?} should not parse"
            );
        }
    }

    #[test]
    fn test_display_round_trips_input() {
        let pattern: IpPattern = "10.1.0.0/16".parse().unwrap();
        assert_eq!(pattern.to_string(), "10.1.0.0/16");
    }

    #[test]
    fn test_empty_list_permits_everything() {
        let list = IpAllowList::default();
        assert!(list.permits(Some(ip("1.2.3.4"))));
        assert!(list.permits(None));
    }

    #[test]
    fn test_non_empty_list() {
        let list = IpAllowList::parse(["127.0.0.1", "10.0.0.0/8"]).unwrap();
        assert!(list.permits(Some(ip("127.0.0.1"))));
        assert!(list.permits(Some(ip("10.20.30.40"))));
        assert!(!list.permits(Some(ip("192.168.1.1"))));
        assert!(!list.permits(None));
    }
}
