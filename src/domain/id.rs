//! Peer identity and address types

use serde::{Deserialize, Serialize};

/// Unique, immutable identity of a cluster peer
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(String);

impl PeerId {
    /// Create a peer ID from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PeerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PeerId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PeerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Network location of a peer's report endpoint (`host:port`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerAddress(String);

impl PeerAddress {
    /// Create an address without validation
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Get the address as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Host portion of the address
    pub fn host(&self) -> &str {
        self.split().0
    }

    /// Port portion of the address, if present and numeric
    pub fn port(&self) -> Option<u16> {
        self.split().1.and_then(|p| p.parse().ok())
    }

    fn split(&self) -> (&str, Option<&str>) {
        // Bracketed IPv6 literals keep their colons
        if let Some(rest) = self.0.strip_prefix('[')
            && let Some((host, tail)) = rest.split_once(']')
        {
            return (host, tail.strip_prefix(':'));
        }
        match self.0.rsplit_once(':') {
            Some((host, port)) if !host.contains(':') => (host, Some(port)),
            _ => (&self.0, None),
        }
    }
}

impl std::fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PeerAddress {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let address = Self::new(s.trim());
        if address.host().is_empty() {
            return Err(format!("Invalid peer address: '{}' (expected host:port)", s));
        }
        match address.split().1 {
            Some(_) if address.port().is_none() => Err(format!("Invalid port in peer address: '{}'", s)),
            _ => Ok(address),
        }
    }
}
