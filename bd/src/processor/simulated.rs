//! Simulated external processor
//!
//! Stands in for a remote call: sleeps a random latency, then reports the id
//! as processed.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::debug;

use crate::domain::{ItemId, ItemResult};

use super::config::ProcessorConfig;
use super::traits::ItemProcessor;

/// Result payload reported for every simulated item
pub const PROCESSED: &str = "processed";

/// Processor that sleeps for a random latency within configured bounds
#[derive(Debug, Clone)]
pub struct SimulatedProcessor {
    min_latency: Duration,
    max_latency: Duration,
}

impl SimulatedProcessor {
    pub fn new(config: &ProcessorConfig) -> Self {
        let min_latency = config.min_latency();
        // Inverted bounds collapse to a fixed latency
        let max_latency = config.max_latency().max(min_latency);
        Self {
            min_latency,
            max_latency,
        }
    }

    fn pick_latency(&self) -> Duration {
        let min = self.min_latency.as_millis() as u64;
        let max = self.max_latency.as_millis() as u64;
        Duration::from_millis(rand::rng().random_range(min..=max))
    }
}

#[async_trait]
impl ItemProcessor for SimulatedProcessor {
    async fn process(&self, id: &ItemId) -> eyre::Result<ItemResult> {
        let latency = self.pick_latency();
        debug!(%id, ?latency, "SimulatedProcessor::process: called");
        tokio::time::sleep(latency).await;
        Ok(ItemResult::new(id.clone(), PROCESSED))
    }

    fn name(&self) -> &str {
        "simulated"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_within_bounds() {
        let processor = SimulatedProcessor::new(&ProcessorConfig {
            min_latency_ms: 10,
            max_latency_ms: 20,
        });
        for _ in 0..100 {
            let latency = processor.pick_latency();
            assert!(latency >= Duration::from_millis(10));
            assert!(latency <= Duration::from_millis(20));
        }
    }

    #[test]
    fn test_inverted_bounds_collapse() {
        let processor = SimulatedProcessor::new(&ProcessorConfig {
            min_latency_ms: 30,
            max_latency_ms: 5,
        });
        assert_eq!(processor.pick_latency(), Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_process_returns_processed() {
        let processor = SimulatedProcessor::new(&ProcessorConfig {
            min_latency_ms: 0,
            max_latency_ms: 1,
        });
        let result = processor.process(&ItemId::Int(7)).await.unwrap();
        assert_eq!(result, ItemResult::new(ItemId::Int(7), PROCESSED));
    }
}
