//! Ingestion status report

use serde::{Deserialize, Serialize};

use crate::domain::{Batch, BatchStatus, Ingestion, IngestionStatus, ItemId};

/// One batch as shown in a status report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub batch_id: String,
    pub ids: Vec<ItemId>,
    pub status: BatchStatus,
}

impl From<&Batch> for BatchSummary {
    fn from(batch: &Batch) -> Self {
        Self {
            batch_id: batch.batch_id.clone(),
            ids: batch.ids.clone(),
            status: batch.status,
        }
    }
}

/// Aggregate status of an ingestion with its batches in creation order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionReport {
    pub ingestion_id: String,
    pub status: IngestionStatus,
    pub batches: Vec<BatchSummary>,
}

impl IngestionReport {
    pub fn new(ingestion: &Ingestion, batches: &[Batch]) -> Self {
        Self {
            ingestion_id: ingestion.ingestion_id.clone(),
            status: IngestionStatus::aggregate(batches.iter().map(|b| b.status)),
            batches: batches.iter().map(BatchSummary::from).collect(),
        }
    }
}
