//! Provider source addresses.
//!
//! A provider is identified by `hostname/namespace/name`. Users may abbreviate
//! it to `namespace/name` or just `name`; missing parts take the defaults below.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ScaffoldError;

/// Registry hostname assumed when a source string omits it.
pub const DEFAULT_PROVIDER_HOST: &str = "registry.hemmer.io";

/// Namespace assumed when a source string omits it.
pub const DEFAULT_PROVIDER_NAMESPACE: &str = "hemmer";

/// A fully qualified provider identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProviderAddress {
    /// Registry hostname.
    pub hostname: String,
    /// Organisation namespace.
    pub namespace: String,
    /// Provider type name.
    pub name: String,
}

impl ProviderAddress {
    /// Build an address from its three parts.
    pub fn new(
        hostname: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// The provider implied by a bare local name, in the default registry
    /// and namespace.
    pub fn implied(name: impl Into<String>) -> Self {
        Self::new(DEFAULT_PROVIDER_HOST, DEFAULT_PROVIDER_NAMESPACE, name)
    }

    /// Parse a `[hostname/][namespace/]name` source string.
    ///
    /// Parts are case-folded to lowercase.
    pub fn parse(source: &str) -> Result<Self, ScaffoldError> {
        let invalid = |reason: String| ScaffoldError::InvalidProvider {
            input: source.to_string(),
            reason,
        };

        let parts: Vec<&str> = source.split('/').collect();
        let (hostname, namespace, name) = match parts.as_slice() {
            [name] => (DEFAULT_PROVIDER_HOST, DEFAULT_PROVIDER_NAMESPACE, *name),
            [namespace, name] => (DEFAULT_PROVIDER_HOST, *namespace, *name),
            [hostname, namespace, name] => (*hostname, *namespace, *name),
            _ => return Err(invalid(format!("expected 1 to 3 parts, got {}", parts.len()))),
        };

        validate_hostname(hostname).map_err(invalid)?;
        validate_label("namespace", namespace).map_err(invalid)?;
        validate_label("name", name).map_err(invalid)?;

        Ok(Self::new(
            hostname.to_ascii_lowercase(),
            namespace.to_ascii_lowercase(),
            name.to_ascii_lowercase(),
        ))
    }
}

impl fmt::Display for ProviderAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.hostname, self.namespace, self.name)
    }
}

impl FromStr for ProviderAddress {
    type Err = ScaffoldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ProviderAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ProviderAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Self::parse(&source).map_err(serde::de::Error::custom)
    }
}

fn validate_label(kind: &str, label: &str) -> Result<(), String> {
    if label.is_empty() {
        return Err(format!("the {kind} part is empty"));
    }
    if label.starts_with('-') || label.ends_with('-') {
        return Err(format!("the {kind} {label:?} may not start or end with a dash"));
    }
    if let Some(c) = label
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-'))
    {
        return Err(format!("the {kind} {label:?} contains invalid character {c:?}"));
    }
    Ok(())
}

fn validate_hostname(hostname: &str) -> Result<(), String> {
    let (host, port) = match hostname.rsplit_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (hostname, None),
    };
    if let Some(port) = port {
        if port.is_empty() || !port.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!("the hostname {hostname:?} has an invalid port"));
        }
    }
    if host.is_empty() {
        return Err("the hostname part is empty".to_string());
    }
    for label in host.split('.') {
        validate_label("hostname", label)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_source() {
        let provider = ProviderAddress::parse("example.com/happycorp/test").unwrap();
        assert_eq!(provider, ProviderAddress::new("example.com", "happycorp", "test"));
        assert_eq!(provider.to_string(), "example.com/happycorp/test");
    }

    #[test]
    fn test_parse_applies_defaults() {
        let provider = ProviderAddress::parse("test").unwrap();
        assert_eq!(provider, ProviderAddress::implied("test"));

        let provider = ProviderAddress::parse("HappyCorp/Test").unwrap();
        assert_eq!(provider.hostname, DEFAULT_PROVIDER_HOST);
        assert_eq!(provider.namespace, "happycorp");
        assert_eq!(provider.name, "test");
    }

    #[test]
    fn test_parse_hostname_with_port() {
        let provider = ProviderAddress::parse("localhost:8443/acme/widgets").unwrap();
        assert_eq!(provider.hostname, "localhost:8443");
    }

    #[test]
    fn test_rejects_malformed_sources() {
        for source in [
            "",
            "/this/isn't/quite/correct",
            "a/b/c/d",
            "acme//widgets",
            "-acme/widgets",
            "acme/wid_gets",
            "host:/acme/widgets",
        ] {
            let err = ProviderAddress::parse(source).unwrap_err();
            assert!(
                matches!(err, ScaffoldError::InvalidProvider { .. }),
                "expected provider error for {source:?}"
            );
        }
    }

    #[test]
    fn test_serde_as_string() {
        let provider: ProviderAddress = serde_json::from_str("\"acme/widgets\"").unwrap();
        assert_eq!(provider.namespace, "acme");
        let json = serde_json::to_string(&provider).unwrap();
        assert_eq!(json, "\"registry.hemmer.io/acme/widgets\"");
    }
}
