//! Ingestion service
//!
//! Accepts a list of ids with a priority label, persists the ingestion and its
//! batches, then hands the batches to the queue in a single call.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{Ingestion, ItemId, Priority};
use crate::queue::PriorityQueue;
use crate::state::{StateError, StateManager};

use super::chunk::build_batches;
use super::config::IngestConfig;
use super::report::IngestionReport;

/// Errors from ingestion and status requests
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("ids must be a non-empty list")]
    EmptyIds,

    #[error("Invalid priority {0:?}, expected HIGH, MEDIUM or LOW")]
    InvalidPriority(String),

    #[error("Ingestion not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    State(#[from] StateError),
}

/// Front door for ingestion and status queries
#[derive(Clone)]
pub struct IngestService {
    config: IngestConfig,
    state: StateManager,
    queue: Arc<PriorityQueue>,
}

impl IngestService {
    pub fn new(config: IngestConfig, state: StateManager, queue: Arc<PriorityQueue>) -> Self {
        debug!(?config, "IngestService::new: called");
        Self { config, state, queue }
    }

    /// Validate and persist an ingestion, enqueue its batches, return its id.
    ///
    /// Validation failures leave nothing behind. Records are written before the
    /// batches become visible to the dispatcher.
    pub async fn ingest(&self, ids: Vec<ItemId>, priority: &str) -> Result<String, IngestError> {
        debug!(ids = ids.len(), %priority, "IngestService::ingest: called");
        if ids.is_empty() {
            return Err(IngestError::EmptyIds);
        }
        let priority: Priority = priority
            .parse()
            .map_err(|_| IngestError::InvalidPriority(priority.to_string()))?;

        let mut ingestion = Ingestion::new(ids, priority);
        let batches = build_batches(
            &ingestion.ingestion_id,
            &ingestion.ids,
            priority,
            self.config.batch_size,
        );
        ingestion.batch_ids = batches.iter().map(|b| b.batch_id.clone()).collect();

        let ingestion_id = self.state.create_ingestion(ingestion, batches.clone()).await?;
        let batch_count = batches.len();
        self.queue.enqueue(batches).await?;

        info!(%ingestion_id, %priority, batches = batch_count, "Ingestion accepted");
        Ok(ingestion_id)
    }

    /// Aggregate status of an ingestion and its batches
    pub async fn status(&self, ingestion_id: &str) -> Result<IngestionReport, IngestError> {
        debug!(%ingestion_id, "IngestService::status: called");
        let ingestion = self
            .state
            .get_ingestion(ingestion_id)
            .await?
            .ok_or_else(|| IngestError::NotFound(ingestion_id.to_string()))?;

        let batches = self.state.batches_for_ingestion(&ingestion).await?;
        Ok(IngestionReport::new(&ingestion, &batches))
    }
}
