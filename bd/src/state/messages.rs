//! State manager messages
//!
//! Commands and responses for the actor pattern.

use thiserror::Error;
use tokio::sync::oneshot;

use crate::domain::{Batch, BatchStatus, Ingestion};
use crate::queue::QueueSnapshot;

/// Errors from state operations
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Invalid status transition for batch {id}: {from} -> {to}")]
    InvalidTransition {
        id: String,
        from: BatchStatus,
        to: BatchStatus,
    },

    #[error("Batch {0} is completed and cannot be modified")]
    Immutable(String),

    #[error("Channel error")]
    ChannelError,
}

/// Response from state operations
pub type StateResponse<T> = Result<T, StateError>;

/// Commands sent to the StateManager actor
#[derive(Debug)]
pub enum StateCommand {
    // Ingestion operations
    CreateIngestion {
        ingestion: Ingestion,
        batches: Vec<Batch>,
        reply: oneshot::Sender<StateResponse<String>>,
    },
    GetIngestion {
        id: String,
        reply: oneshot::Sender<StateResponse<Option<Ingestion>>>,
    },

    // Batch operations
    GetBatch {
        id: String,
        reply: oneshot::Sender<StateResponse<Option<Batch>>>,
    },
    UpdateBatch {
        batch: Batch,
        reply: oneshot::Sender<StateResponse<()>>,
    },
    ListBatches {
        status_filter: Option<BatchStatus>,
        reply: oneshot::Sender<StateResponse<Vec<Batch>>>,
    },

    // Queue snapshot operations
    SaveQueue {
        snapshot: QueueSnapshot,
        reply: oneshot::Sender<StateResponse<()>>,
    },
    LoadQueue {
        reply: oneshot::Sender<StateResponse<Option<QueueSnapshot>>>,
    },

    // Shutdown, replied once the store has been closed
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}
