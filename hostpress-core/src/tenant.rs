//! Core multi-tenant types for hostpress.
//!
//! A tenant is a blog identified by the raw host string of the request,
//! port suffix included: `example.com` and `example.com:8080` are two
//! different tenants.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The partition key for every post and domain record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct HostKey(pub String);

impl HostKey {
    pub fn new<S: Into<String>>(host: S) -> Self {
        Self(host.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hosts the admin endpoints trust when local-only mode is on.
    pub fn is_local(&self) -> bool {
        self.0.contains("localhost") || self.0.contains("127.0.0.1")
    }
}

impl fmt::Display for HostKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HostKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for HostKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Context carried with every hostpress operation.
///
/// Passed into services, hooks and stores so that all logic is
/// explicitly tenant-aware. Built per request, never shared.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub host: HostKey,
}

impl TenantContext {
    /// Convenience constructor from a string.
    pub fn new<S: Into<String>>(host: S) -> Self {
        Self {
            host: HostKey::new(host),
        }
    }

    /// Tenant for a request's `Host` header; a missing header is the empty host.
    pub fn from_host_header(host: Option<&str>) -> Self {
        Self::new(host.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_suffix_is_part_of_the_key() {
        assert_ne!(HostKey::from("example.com"), HostKey::from("example.com:8080"));
    }

    #[test]
    fn missing_host_header_is_empty_tenant() {
        assert_eq!(TenantContext::from_host_header(None).host.as_str(), "");
    }

    #[test]
    fn local_hosts() {
        assert!(HostKey::from("localhost:3000").is_local());
        assert!(HostKey::from("127.0.0.1:3000").is_local());
        assert!(!HostKey::from("blog1.example.com").is_local());
    }
}
