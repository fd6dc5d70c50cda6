//! Per-item processing capability

use async_trait::async_trait;

use crate::domain::{ItemId, ItemResult};

/// Performs the unit of work for a single item id.
///
/// Implementations are called concurrently for every id in a batch and must
/// not assume any ordering between those calls.
#[async_trait]
pub trait ItemProcessor: Send + Sync {
    /// Process one id and return its result
    async fn process(&self, id: &ItemId) -> eyre::Result<ItemResult>;

    /// Name used in logs
    fn name(&self) -> &str {
        "item-processor"
    }
}
