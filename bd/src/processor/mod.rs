//! Batch processing
//!
//! The [`BatchWorker`] owns the status bookkeeping for a dispatched batch; the
//! per-item work itself is delegated to an [`ItemProcessor`].

mod config;
mod simulated;
mod traits;
mod worker;

pub use config::ProcessorConfig;
pub use simulated::{PROCESSED, SimulatedProcessor};
pub use traits::ItemProcessor;
pub use worker::{BatchOutcome, BatchWorker};
