//! Poller configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::error::PollerError;

/// What happens to a peer whose report request failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// The peer leaves the rotation until it is re-registered
    #[default]
    Drop,
    /// The peer goes back to the end of the queue, due one poll period later
    Requeue,
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Drop => write!(f, "drop"),
            Self::Requeue => write!(f, "requeue"),
        }
    }
}

impl std::str::FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "drop" => Ok(Self::Drop),
            "requeue" => Ok(Self::Requeue),
            _ => Err(format!("Unknown failure policy: {}. Use: drop or requeue", s)),
        }
    }
}

/// Poller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Max report requests in flight at once, across all peers
    #[serde(rename = "max-concurrent-pulls", default = "default_max_concurrent_pulls")]
    pub max_concurrent_pulls: usize,

    /// Minimum gap between two successful pulls of the same peer
    #[serde(rename = "poll-period-ms", default = "default_poll_period_ms")]
    pub poll_period_ms: u64,

    /// How often the scheduler looks for due peers
    #[serde(rename = "tick-interval-ms", default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Handling of peers whose pull failed
    #[serde(rename = "failure-policy", default)]
    pub failure_policy: FailurePolicy,

    /// Channel buffer size for pull completions
    #[serde(rename = "completion-buffer", default = "default_completion_buffer")]
    pub completion_buffer: usize,
}

fn default_max_concurrent_pulls() -> usize {
    100
}

fn default_poll_period_ms() -> u64 {
    100
}

fn default_tick_interval_ms() -> u64 {
    100
}

fn default_completion_buffer() -> usize {
    1000
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_pulls: 100,
            poll_period_ms: 100,
            tick_interval_ms: 100,
            failure_policy: FailurePolicy::Drop,
            completion_buffer: 1000,
        }
    }
}

impl PollerConfig {
    /// Get the poll period as a Duration
    pub fn poll_period(&self) -> Duration {
        Duration::from_millis(self.poll_period_ms)
    }

    /// Get the scheduler tick interval as a Duration
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Reject settings the scheduler cannot run with
    pub fn validate(&self) -> Result<(), PollerError> {
        if self.max_concurrent_pulls == 0 {
            return Err(PollerError::InvalidConfig(
                "max-concurrent-pulls must be at least 1".to_string(),
            ));
        }
        if self.poll_period_ms == 0 {
            return Err(PollerError::InvalidConfig("poll-period-ms must be positive".to_string()));
        }
        if self.tick_interval_ms == 0 {
            return Err(PollerError::InvalidConfig("tick-interval-ms must be positive".to_string()));
        }
        if self.completion_buffer == 0 {
            return Err(PollerError::InvalidConfig("completion-buffer must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PollerConfig::default();
        assert_eq!(config.max_concurrent_pulls, 100);
        assert_eq!(config.poll_period_ms, 100);
        assert_eq!(config.tick_interval_ms, 100);
        assert_eq!(config.failure_policy, FailurePolicy::Drop);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_durations() {
        let config = PollerConfig {
            poll_period_ms: 1500,
            tick_interval_ms: 250,
            ..Default::default()
        };
        assert_eq!(config.poll_period(), Duration::from_millis(1500));
        assert_eq!(config.tick_interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let config = PollerConfig {
            max_concurrent_pulls: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(PollerError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_zero_period() {
        let config = PollerConfig {
            poll_period_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_kebab_case() {
        let yaml = r#"
max-concurrent-pulls: 4
poll-period-ms: 1000
failure-policy: requeue
"#;
        let config: PollerConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.max_concurrent_pulls, 4);
        assert_eq!(config.poll_period_ms, 1000);
        assert_eq!(config.tick_interval_ms, 100);
        assert_eq!(config.failure_policy, FailurePolicy::Requeue);
    }

    #[test]
    fn test_failure_policy_parse() {
        assert_eq!("DROP".parse::<FailurePolicy>().unwrap(), FailurePolicy::Drop);
        assert_eq!("requeue".parse::<FailurePolicy>().unwrap(), FailurePolicy::Requeue);
        assert!("retry".parse::<FailurePolicy>().is_err());
    }
}
