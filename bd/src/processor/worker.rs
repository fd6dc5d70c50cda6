//! Batch worker
//!
//! Drives one dequeued batch through `triggered` and `completed`, fanning the
//! per-item work out concurrently in between.

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, error, info, warn};

use crate::domain::{Batch, ItemResult};
use crate::state::{StateError, StateManager, StateResponse};

use super::traits::ItemProcessor;

/// Outcome of processing one batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// All items processed; results are in input order
    Completed(Vec<ItemResult>),
    /// Processing failed; the batch is left as it was last persisted
    Failed(String),
}

impl BatchOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

/// Processes dequeued batches and records their status transitions
#[derive(Clone)]
pub struct BatchWorker {
    state: StateManager,
    processor: Arc<dyn ItemProcessor>,
}

impl BatchWorker {
    pub fn new(state: StateManager, processor: Arc<dyn ItemProcessor>) -> Self {
        debug!(processor = processor.name(), "BatchWorker::new: called");
        Self { state, processor }
    }

    /// Process one batch: persist `triggered`, run every id, persist `completed`.
    ///
    /// Item failures are not retried; they yield [`BatchOutcome::Failed`] and
    /// leave the batch `triggered`. Store failures are returned as errors.
    pub async fn process_batch(&self, mut batch: Batch) -> StateResponse<BatchOutcome> {
        debug!(batch_id = %batch.batch_id, ids = batch.ids.len(), "BatchWorker::process_batch: called");

        batch.mark_triggered();
        match self.state.update_batch(batch.clone()).await {
            Ok(()) => {}
            Err(e @ (StateError::Immutable(_) | StateError::InvalidTransition { .. })) => {
                warn!(batch_id = %batch.batch_id, error = %e, "Batch cannot be triggered, skipping");
                return Ok(BatchOutcome::Failed(e.to_string()));
            }
            Err(e) => return Err(e),
        }

        let work = batch.ids.iter().map(|id| self.processor.process(id));
        let results = match try_join_all(work).await {
            Ok(results) => results,
            Err(e) => {
                error!(batch_id = %batch.batch_id, error = %e, "Error processing batch, leaving it triggered");
                return Ok(BatchOutcome::Failed(e.to_string()));
            }
        };

        batch.mark_completed(results.clone());
        self.state.update_batch(batch.clone()).await?;

        info!(
            batch_id = %batch.batch_id,
            ingestion_id = %batch.ingestion_id,
            priority = %batch.priority,
            items = results.len(),
            "Processed batch"
        );
        Ok(BatchOutcome::Completed(results))
    }
}
