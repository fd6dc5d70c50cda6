//! Ingestion and status queries
//!
//! An ingestion is split into batches of at most `batch-size` ids, recorded,
//! and enqueued. Status is derived on demand from the batch records.

mod chunk;
mod config;
mod report;
mod service;

pub use chunk::{build_batches, chunk_ids};
pub use config::IngestConfig;
pub use report::{BatchSummary, IngestionReport};
pub use service::{IngestError, IngestService};
