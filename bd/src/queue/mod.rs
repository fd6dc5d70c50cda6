//! Priority queue with rate-limited extraction
//!
//! Pending batches are kept in `(priority desc, created_at asc)` order and the
//! whole sequence is persisted after every mutation.

mod config;
mod core;
mod snapshot;

pub use config::QueueConfig;
pub use self::core::PriorityQueue;
pub use snapshot::{QueueSnapshot, SNAPSHOT_ID, dispatch_order};
