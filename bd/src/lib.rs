//! BatchDaemon - durable priority batch queue with rate-limited dispatch
//!
//! Ingestions are split into small batches, persisted, and placed on a single
//! priority queue. A dispatch loop releases at most one batch per dispatch
//! interval and processes its items concurrently.
//!
//! # Core Concepts
//!
//! - **Priority first**: higher priority batches always dispatch first; ties
//!   go to the older batch
//! - **Rate limited**: one dispatch per interval, regardless of backlog
//! - **Durable**: every queue mutation and status transition is on disk
//!   before the call returns
//!
//! # Modules
//!
//! - [`domain`] - Ingestion, Batch and item types
//! - [`state`] - Actor owning the record store
//! - [`queue`] - Priority queue with rate-limited dequeue
//! - [`processor`] - Per-item work and batch status bookkeeping
//! - [`dispatch`] - Polling loop feeding the processor
//! - [`ingest`] - Ingestion and status queries
//! - [`ipc`] - Unix socket protocol between CLI and daemon
//! - [`daemon`] - Runtime wiring
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod daemon;
pub mod dispatch;
pub mod domain;
pub mod ingest;
pub mod ipc;
pub mod processor;
pub mod queue;
pub mod state;

// Re-export commonly used types
pub use config::Config;
pub use daemon::{VERSION, run_daemon};
pub use dispatch::{DispatchStats, Dispatcher, DispatcherConfig};
pub use domain::{Batch, BatchStatus, Ingestion, IngestionStatus, ItemId, ItemResult, Priority, Record, Store};
pub use ingest::{IngestError, IngestService, IngestionReport};
pub use processor::{BatchOutcome, BatchWorker, ItemProcessor, SimulatedProcessor};
pub use queue::{PriorityQueue, QueueConfig, QueueSnapshot};
pub use state::{StateError, StateManager};
