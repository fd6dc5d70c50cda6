//! Processor configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Latency bounds for the simulated item processor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProcessorConfig {
    /// Lower bound of simulated per-item latency
    pub min_latency_ms: u64,

    /// Upper bound of simulated per-item latency
    pub max_latency_ms: u64,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            min_latency_ms: 500,
            max_latency_ms: 1500,
        }
    }
}

impl ProcessorConfig {
    pub fn min_latency(&self) -> Duration {
        Duration::from_millis(self.min_latency_ms)
    }

    pub fn max_latency(&self) -> Duration {
        Duration::from_millis(self.max_latency_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProcessorConfig::default();
        assert_eq!(config.min_latency(), Duration::from_millis(500));
        assert_eq!(config.max_latency(), Duration::from_millis(1500));
    }

    #[test]
    fn test_partial_yaml() {
        let config: ProcessorConfig = serde_yaml::from_str("max-latency-ms: 20").unwrap();
        assert_eq!(config.min_latency_ms, 500);
        assert_eq!(config.max_latency_ms, 20);
    }
}
