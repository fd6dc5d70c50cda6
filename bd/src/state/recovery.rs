//! Startup recovery scan
//!
//! Reports batches left behind by a previous run. Nothing is re-queued or
//! reset: a `triggered` batch whose processing failed or was interrupted stays
//! `triggered`, and the scan only makes that visible in the log.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::domain::{Batch, BatchStatus};

use super::StateManager;

/// Recovery statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecoveryStats {
    /// Batch records still queued
    pub queued: usize,
    /// Batch records stuck in triggered
    pub triggered: usize,
    /// Batch records completed
    pub completed: usize,
    /// Queued records that are missing from the restored pending sequence
    pub orphaned: usize,
}

impl std::fmt::Display for RecoveryStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "queued: {}, triggered: {}, completed: {}, orphaned: {}",
            self.queued, self.triggered, self.completed, self.orphaned
        )
    }
}

/// Scan batch records and report stalled or orphaned work.
///
/// `pending` is the batch ids of the restored queue; a queued record outside it
/// was dequeued by a previous run that stopped before marking it triggered.
pub async fn scan_for_recovery(state: &StateManager, pending: &[Batch]) -> eyre::Result<RecoveryStats> {
    debug!(pending = pending.len(), "scan_for_recovery: called");
    let batches = state
        .list_batches(None)
        .await
        .map_err(|e| eyre::eyre!("Failed to list batches: {}", e))?;

    let pending_ids: HashSet<&str> = pending.iter().map(|b| b.batch_id.as_str()).collect();
    let mut stats = RecoveryStats::default();

    for batch in &batches {
        match batch.status {
            BatchStatus::Queued => {
                stats.queued += 1;
                if !pending_ids.contains(batch.batch_id.as_str()) {
                    stats.orphaned += 1;
                    warn!(batch_id = %batch.batch_id, ingestion_id = %batch.ingestion_id, "Queued batch is not in the pending queue");
                }
            }
            BatchStatus::Triggered => {
                stats.triggered += 1;
                warn!(batch_id = %batch.batch_id, ingestion_id = %batch.ingestion_id, "Batch left in triggered state");
            }
            BatchStatus::Completed => stats.completed += 1,
        }
    }

    info!(%stats, "Recovery scan complete");
    Ok(stats)
}
