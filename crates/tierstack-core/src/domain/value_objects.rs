//! Domain value objects: DbEngine, Region, SubnetType, PortRange, Peer.
//!
//! # Design
//!
//! These are pure value types: equality-by-value, no identity. Engine
//! properties (ports, versions, log exports) are NOT held here; they live in
//! `engines.rs` so that each engine is described exactly once.
//!
//! # Adding an Engine
//!
//! 1. Add the `DbEngine` variant here (plus `as_str` and `FromStr` arms)
//! 2. Add an `EngineDef` in `engines.rs`
//! 3. Done

use crate::domain::error::{ConfigError, DomainError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

// ── DbEngine ─────────────────────────────────────────────────────────────────

/// A managed relational engine family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbEngine {
    #[serde(rename = "mysql")]
    MySql,
    #[serde(rename = "postgresql")]
    PostgreSql,
}

impl DbEngine {
    pub const ALL: [DbEngine; 2] = [DbEngine::MySql, DbEngine::PostgreSql];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::PostgreSql => "postgresql",
        }
    }
}

impl fmt::Display for DbEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DbEngine {
    type Err = DomainError;

    /// Exact match only: the configuration surface accepts the two engine
    /// names verbatim, anything else is `UnsupportedEngine`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mysql" => Ok(Self::MySql),
            "postgresql" => Ok(Self::PostgreSql),
            other => Err(DomainError::UnsupportedEngine {
                engine: other.to_string(),
            }),
        }
    }
}

// ── Region ───────────────────────────────────────────────────────────────────

/// A provisioning region name such as `eu-west-2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Region(String);

impl Region {
    /// The region a CDN viewer certificate must be issued in.
    pub const CDN_HOME: &'static str = "us-east-1";

    pub fn cdn_home() -> Self {
        Self(Self::CDN_HOME.to_string())
    }

    pub fn parse(field: &'static str, raw: &str) -> Result<Self, ConfigError> {
        let parts: Vec<&str> = raw.split('-').collect();
        let well_formed = parts.len() >= 3
            && parts
                .iter()
                .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()))
            && parts
                .last()
                .is_some_and(|p| p.chars().all(|c| c.is_ascii_digit()));

        if well_formed {
            Ok(Self(raw.to_string()))
        } else {
            Err(ConfigError::InvalidValue {
                field,
                reason: format!("'{raw}' is not a region name (expected e.g. us-east-1)"),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── SubnetType ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SubnetType {
    Public,
    Private,
}

impl SubnetType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "Public",
            Self::Private => "Private",
        }
    }
}

// ── Ports ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    All,
}

/// An inclusive port range on a protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortRange {
    pub protocol: Protocol,
    pub from: u16,
    pub to: u16,
}

impl PortRange {
    pub const fn tcp(port: u16) -> Self {
        Self {
            protocol: Protocol::Tcp,
            from: port,
            to: port,
        }
    }

    pub const fn all_traffic() -> Self {
        Self {
            protocol: Protocol::All,
            from: 0,
            to: u16::MAX,
        }
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.protocol {
            Protocol::All => f.write_str("all traffic"),
            Protocol::Tcp if self.from == self.to => write!(f, "tcp{}", self.from),
            Protocol::Tcp => write!(f, "tcp{}-{}", self.from, self.to),
        }
    }
}

// ── Peer ─────────────────────────────────────────────────────────────────────

/// A network entity permitted to open connections.
///
/// Parsed from the `dbIngressSources` entries:
/// - `10.0.0.0/16`, `2001:db8::/32` → CIDR blocks
/// - `sg-…` → security group id
/// - `pl-…` → managed prefix list id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Peer {
    Ipv4(String),
    Ipv6(String),
    SecurityGroupId(String),
    PrefixList(String),
}

impl Peer {
    /// Any IPv4 address.
    pub fn any_ipv4() -> Self {
        Self::Ipv4("0.0.0.0/0".into())
    }

    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidValue {
            field: "dbIngressSources",
            reason,
        };

        let raw = raw.trim();
        if let Some(rest) = raw.strip_prefix("sg-") {
            return if is_resource_suffix(rest) {
                Ok(Self::SecurityGroupId(raw.to_string()))
            } else {
                Err(invalid(format!("'{raw}' is not a security group id")))
            };
        }
        if let Some(rest) = raw.strip_prefix("pl-") {
            return if is_resource_suffix(rest) {
                Ok(Self::PrefixList(raw.to_string()))
            } else {
                Err(invalid(format!("'{raw}' is not a prefix list id")))
            };
        }

        let (addr, prefix) = raw
            .split_once('/')
            .ok_or_else(|| invalid(format!("'{raw}' is not a CIDR block, sg- or pl- id")))?;
        let prefix: u8 = prefix
            .parse()
            .map_err(|_| invalid(format!("'{raw}' has an invalid prefix length")))?;

        if addr.parse::<Ipv4Addr>().is_ok() && prefix <= 32 {
            Ok(Self::Ipv4(raw.to_string()))
        } else if addr.parse::<Ipv6Addr>().is_ok() && prefix <= 128 {
            Ok(Self::Ipv6(raw.to_string()))
        } else {
            Err(invalid(format!("'{raw}' is not a valid CIDR block")))
        }
    }
}

fn is_resource_suffix(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_hexdigit())
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ipv4(v) | Self::Ipv6(v) | Self::SecurityGroupId(v) | Self::PrefixList(v) => {
                f.write_str(v)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_parses_exact_names_only() {
        assert_eq!("mysql".parse::<DbEngine>().unwrap(), DbEngine::MySql);
        assert_eq!(
            "postgresql".parse::<DbEngine>().unwrap(),
            DbEngine::PostgreSql
        );
        assert!(matches!(
            "oracle".parse::<DbEngine>(),
            Err(DomainError::UnsupportedEngine { .. })
        ));
        assert!("MySQL".parse::<DbEngine>().is_err());
    }

    #[test]
    fn engine_display_round_trips() {
        for engine in DbEngine::ALL {
            assert_eq!(engine.to_string().parse::<DbEngine>().unwrap(), engine);
        }
    }

    #[test]
    fn region_accepts_provider_names() {
        assert!(Region::parse("region", "us-east-1").is_ok());
        assert!(Region::parse("region", "eu-central-2").is_ok());
        assert!(Region::parse("region", "us-gov-west-1").is_ok());
    }

    #[test]
    fn region_rejects_garbage() {
        assert!(Region::parse("region", "").is_err());
        assert!(Region::parse("region", "US-EAST-1").is_err());
        assert!(Region::parse("region", "mars").is_err());
        assert!(Region::parse("region", "us-east-x").is_err());
    }

    #[test]
    fn peer_parses_all_source_kinds() {
        assert_eq!(
            Peer::parse("10.0.0.0/16").unwrap(),
            Peer::Ipv4("10.0.0.0/16".into())
        );
        assert_eq!(
            Peer::parse("2001:db8::/32").unwrap(),
            Peer::Ipv6("2001:db8::/32".into())
        );
        assert_eq!(
            Peer::parse("sg-0abc123").unwrap(),
            Peer::SecurityGroupId("sg-0abc123".into())
        );
        assert_eq!(
            Peer::parse("pl-63a5400a").unwrap(),
            Peer::PrefixList("pl-63a5400a".into())
        );
    }

    #[test]
    fn peer_rejects_invalid_sources() {
        assert!(Peer::parse("10.0.0.0").is_err());
        assert!(Peer::parse("10.0.0.0/33").is_err());
        assert!(Peer::parse("sg-").is_err());
        assert!(Peer::parse("hello/8").is_err());
    }

    #[test]
    fn port_range_display() {
        assert_eq!(PortRange::tcp(5432).to_string(), "tcp5432");
        assert_eq!(PortRange::all_traffic().to_string(), "all traffic");
    }
}
