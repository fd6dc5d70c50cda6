//! Domain types for BatchDaemon
//!
//! Core domain types: Ingestion, Batch and the item ids they carry.
//! Ingestion and Batch implement the Record trait for BatchStore persistence.

mod batch;
mod id;
mod ingestion;
mod item;
pub mod priority;

pub use batch::{Batch, BatchStatus};
pub use id::generate_id;
pub use ingestion::{Ingestion, IngestionStatus};
pub use item::{ItemId, ItemResult};
pub use priority::Priority;

// Re-export batchstore types for convenience
pub use batchstore::{Record, Store, now_ms};
