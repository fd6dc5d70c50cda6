//! StateManager - actor that owns the Store
//!
//! Processes commands via channels for thread-safe access to persistent state.
//! Every durable write in the daemon goes through this single actor, which is
//! also where batch status transitions are enforced.

use std::path::Path;

use batchstore::Store;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::domain::{Batch, BatchStatus, Ingestion};
use crate::queue::{QueueSnapshot, SNAPSHOT_ID};

use super::messages::{StateCommand, StateError, StateResponse};

/// Handle to send commands to the StateManager
#[derive(Clone)]
pub struct StateManager {
    tx: mpsc::Sender<StateCommand>,
}

impl StateManager {
    /// Spawn a new StateManager actor
    pub fn spawn(store_path: impl AsRef<Path>) -> eyre::Result<Self> {
        debug!(store_path = %store_path.as_ref().display(), "spawn: called");
        let store = Store::open(store_path.as_ref())?;

        let (tx, rx) = mpsc::channel(256);

        // Spawn the actor task
        tokio::spawn(actor_loop(store, rx));

        info!("StateManager spawned");

        Ok(Self { tx })
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<StateResponse<T>>) -> StateCommand,
    ) -> StateResponse<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(make(reply_tx))
            .await
            .map_err(|_| StateError::ChannelError)?;
        reply_rx.await.map_err(|_| StateError::ChannelError)?
    }

    // === Ingestion operations ===

    /// Persist a new ingestion together with all of its batches
    pub async fn create_ingestion(&self, ingestion: Ingestion, batches: Vec<Batch>) -> StateResponse<String> {
        debug!(ingestion_id = %ingestion.ingestion_id, batch_count = batches.len(), "create_ingestion: called");
        self.request(|reply| StateCommand::CreateIngestion {
            ingestion,
            batches,
            reply,
        })
        .await
    }

    /// Get an Ingestion by ID
    pub async fn get_ingestion(&self, id: &str) -> StateResponse<Option<Ingestion>> {
        debug!(%id, "get_ingestion: called");
        self.request(|reply| StateCommand::GetIngestion {
            id: id.to_string(),
            reply,
        })
        .await
    }

    // === Batch operations ===

    /// Get a Batch by ID
    pub async fn get_batch(&self, id: &str) -> StateResponse<Option<Batch>> {
        debug!(%id, "get_batch: called");
        self.request(|reply| StateCommand::GetBatch {
            id: id.to_string(),
            reply,
        })
        .await
    }

    /// Write a batch, enforcing forward-only status transitions.
    ///
    /// A batch with no stored record is written as-is.
    pub async fn update_batch(&self, batch: Batch) -> StateResponse<()> {
        debug!(batch_id = %batch.batch_id, status = %batch.status, "update_batch: called");
        self.request(|reply| StateCommand::UpdateBatch { batch, reply }).await
    }

    /// List Batch records, optionally filtered by status
    pub async fn list_batches(&self, status_filter: Option<BatchStatus>) -> StateResponse<Vec<Batch>> {
        debug!(?status_filter, "list_batches: called");
        self.request(|reply| StateCommand::ListBatches { status_filter, reply })
            .await
    }

    /// Load the batches owned by an ingestion, in chunk order
    pub async fn batches_for_ingestion(&self, ingestion: &Ingestion) -> StateResponse<Vec<Batch>> {
        debug!(ingestion_id = %ingestion.ingestion_id, "batches_for_ingestion: called");
        let mut batches = Vec::with_capacity(ingestion.batch_ids.len());
        for batch_id in &ingestion.batch_ids {
            let batch = self
                .get_batch(batch_id)
                .await?
                .ok_or_else(|| StateError::NotFound(format!("Batch {}", batch_id)))?;
            batches.push(batch);
        }
        Ok(batches)
    }

    // === Queue snapshot operations ===

    /// Atomically replace the persisted queue snapshot
    pub async fn save_queue(&self, snapshot: QueueSnapshot) -> StateResponse<()> {
        debug!(
            pending = snapshot.pending.len(),
            last_dispatched_at = snapshot.last_dispatched_at,
            "save_queue: called"
        );
        self.request(|reply| StateCommand::SaveQueue { snapshot, reply }).await
    }

    /// Load the persisted queue snapshot, if one was ever written
    pub async fn load_queue(&self) -> StateResponse<Option<QueueSnapshot>> {
        debug!("load_queue: called");
        self.request(|reply| StateCommand::LoadQueue { reply }).await
    }

    /// Stop the actor; returns once the store has been closed
    pub async fn shutdown(&self) -> StateResponse<()> {
        debug!("shutdown: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(StateCommand::Shutdown { reply: reply_tx })
            .await
            .map_err(|_| StateError::ChannelError)?;
        reply_rx.await.map_err(|_| StateError::ChannelError)
    }
}

fn store_err(e: batchstore::StoreError) -> StateError {
    StateError::StoreError(e.to_string())
}

fn apply_batch_update(store: &Store, batch: Batch) -> StateResponse<()> {
    if let Some(current) = store.get::<Batch>(&batch.batch_id).map_err(store_err)? {
        if current.is_terminal() {
            warn!(batch_id = %batch.batch_id, "Rejected write to completed batch");
            return Err(StateError::Immutable(batch.batch_id));
        }
        if !current.status.can_transition_to(batch.status) {
            warn!(batch_id = %batch.batch_id, from = %current.status, to = %batch.status, "Rejected backward transition");
            return Err(StateError::InvalidTransition {
                id: batch.batch_id,
                from: current.status,
                to: batch.status,
            });
        }
    }
    store.put(&batch).map_err(store_err)
}

fn create_ingestion(store: &Store, ingestion: Ingestion, batches: Vec<Batch>) -> StateResponse<String> {
    // Batches first so a readable ingestion never points at missing batches
    for batch in &batches {
        store.put(batch).map_err(store_err)?;
    }
    store.put(&ingestion).map_err(store_err)?;
    Ok(ingestion.ingestion_id)
}

/// The actor loop that owns the Store and processes commands
async fn actor_loop(store: Store, mut rx: mpsc::Receiver<StateCommand>) {
    debug!("StateManager actor started");

    while let Some(cmd) = rx.recv().await {
        match cmd {
            StateCommand::CreateIngestion {
                ingestion,
                batches,
                reply,
            } => {
                debug!(ingestion_id = %ingestion.ingestion_id, "actor_loop: CreateIngestion command");
                let _ = reply.send(create_ingestion(&store, ingestion, batches));
            }

            StateCommand::GetIngestion { id, reply } => {
                debug!(%id, "actor_loop: GetIngestion command");
                let _ = reply.send(store.get(&id).map_err(store_err));
            }

            StateCommand::GetBatch { id, reply } => {
                debug!(%id, "actor_loop: GetBatch command");
                let _ = reply.send(store.get(&id).map_err(store_err));
            }

            StateCommand::UpdateBatch { batch, reply } => {
                debug!(batch_id = %batch.batch_id, "actor_loop: UpdateBatch command");
                let _ = reply.send(apply_batch_update(&store, batch));
            }

            StateCommand::ListBatches { status_filter, reply } => {
                debug!(?status_filter, "actor_loop: ListBatches command");
                let result = store.list::<Batch>().map_err(store_err).map(|batches| {
                    batches
                        .into_iter()
                        .filter(|b| status_filter.is_none_or(|s| b.status == s))
                        .collect()
                });
                let _ = reply.send(result);
            }

            StateCommand::SaveQueue { snapshot, reply } => {
                debug!(pending = snapshot.pending.len(), "actor_loop: SaveQueue command");
                let _ = reply.send(store.put(&snapshot).map_err(store_err));
            }

            StateCommand::LoadQueue { reply } => {
                debug!("actor_loop: LoadQueue command");
                let _ = reply.send(store.get(SNAPSHOT_ID).map_err(store_err));
            }

            StateCommand::Shutdown { reply } => {
                debug!("actor_loop: Shutdown command");
                drop(store);
                let _ = reply.send(());
                info!("StateManager actor shutting down");
                return;
            }
        }
    }

    debug!("StateManager actor channel closed");
}
