//! Report poller configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::PeerAddress;
use crate::poller::PollerConfig;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scheduling and admission settings
    pub poller: PollerConfig,

    /// Report transport settings
    pub transport: TransportConfig,

    /// Peers to register at startup
    pub peers: Vec<PeerEntry>,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Call this early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        self.poller.validate()?;

        if self.transport.timeout_ms == 0 {
            return Err(eyre::eyre!("transport.timeout-ms must be positive"));
        }
        if !matches!(self.transport.scheme.as_str(), "http" | "https") {
            return Err(eyre::eyre!(
                "Unsupported transport scheme: '{}'. Use http or https",
                self.transport.scheme
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for peer in &self.peers {
            peer.address
                .parse::<PeerAddress>()
                .map_err(|e| eyre::eyre!("Peer '{}': {}", peer.id, e))?;
            if !seen.insert(peer.id.as_str()) {
                return Err(eyre::eyre!("Peer '{}' is listed more than once", peer.id));
            }
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .reportpoller.yml
        let local_config = PathBuf::from(".reportpoller.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/reportpoller/reportpoller.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("reportpoller").join("reportpoller.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Report transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// URL scheme used to reach peers
    pub scheme: String,

    /// Path of the report endpoint on every peer
    #[serde(rename = "report-path")]
    pub report_path: String,

    /// Whole-request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Connection establishment timeout in milliseconds
    #[serde(rename = "connect-timeout-ms")]
    pub connect_timeout_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            report_path: "/api/v1/resource-report".to_string(),
            timeout_ms: 5_000,
            connect_timeout_ms: 1_000,
        }
    }
}

impl TransportConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// One statically configured peer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerEntry {
    pub id: String,
    pub address: String,
}

impl std::str::FromStr for PeerEntry {
    type Err = String;

    /// Parse `id=host:port`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, address) = s
            .split_once('=')
            .ok_or_else(|| format!("Invalid peer '{}': expected id=host:port", s))?;
        let id = id.trim();
        if id.is_empty() {
            return Err(format!("Invalid peer '{}': empty id", s));
        }
        let address = address.parse::<PeerAddress>()?;
        Ok(Self {
            id: id.to_string(),
            address: address.to_string(),
        })
    }
}
