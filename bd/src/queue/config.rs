//! Queue configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Queue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Minimum time between two successful dispatches, in milliseconds
    #[serde(rename = "dispatch-interval-ms", default = "default_dispatch_interval_ms")]
    pub dispatch_interval_ms: u64,
}

fn default_dispatch_interval_ms() -> u64 {
    5000
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            dispatch_interval_ms: default_dispatch_interval_ms(),
        }
    }
}

impl QueueConfig {
    /// Get the dispatch interval as a Duration
    pub fn dispatch_interval(&self) -> Duration {
        Duration::from_millis(self.dispatch_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = QueueConfig::default();
        assert_eq!(config.dispatch_interval_ms, 5000);
        assert_eq!(config.dispatch_interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_yaml_missing_field_uses_default() {
        let config: QueueConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.dispatch_interval_ms, 5000);

        let config: QueueConfig = serde_yaml::from_str("dispatch-interval-ms: 250").unwrap();
        assert_eq!(config.dispatch_interval(), Duration::from_millis(250));
    }
}
