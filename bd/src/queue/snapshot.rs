//! Persisted queue state and dispatch ordering

use std::cmp::Ordering;

use batchstore::{Record, now_ms};
use serde::{Deserialize, Serialize};

use crate::domain::Batch;

/// Store id of the single queue snapshot record
pub const SNAPSHOT_ID: &str = "state";

/// Dispatch order: higher priority first, then earlier creation.
///
/// Equal keys compare equal, so a stable sort keeps their insertion order.
pub fn dispatch_order(a: &Batch, b: &Batch) -> Ordering {
    b.priority.cmp(&a.priority).then_with(|| a.created_at.cmp(&b.created_at))
}

/// Full pending sequence plus the last successful dispatch time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    /// Pending batches in dispatch order
    pub pending: Vec<Batch>,

    /// Last successful dispatch (Unix milliseconds, 0 = never)
    pub last_dispatched_at: i64,

    /// Last update timestamp (Unix milliseconds)
    #[serde(default)]
    pub updated_at: i64,
}

impl QueueSnapshot {
    pub fn new(pending: Vec<Batch>, last_dispatched_at: i64) -> Self {
        Self {
            pending,
            last_dispatched_at,
            updated_at: now_ms(),
        }
    }
}

impl Record for QueueSnapshot {
    fn id(&self) -> &str {
        SNAPSHOT_ID
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn collection_name() -> &'static str {
        "queue"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ItemId, Priority};

    fn batch(id: &str, priority: Priority, created_at: i64) -> Batch {
        Batch::with_id(id, "ing", vec![ItemId::Int(1)], priority).with_created_at(created_at)
    }

    #[test]
    fn test_higher_priority_first() {
        let low = batch("low", Priority::Low, 0);
        let high = batch("high", Priority::High, 1);
        assert_eq!(dispatch_order(&high, &low), Ordering::Less);
        assert_eq!(dispatch_order(&low, &high), Ordering::Greater);
    }

    #[test]
    fn test_same_priority_fifo() {
        let first = batch("first", Priority::Medium, 5);
        let second = batch("second", Priority::Medium, 6);
        assert_eq!(dispatch_order(&first, &second), Ordering::Less);
    }

    #[test]
    fn test_equal_keys_are_ties() {
        let a = batch("a", Priority::Low, 5);
        let b = batch("b", Priority::Low, 5);
        assert_eq!(dispatch_order(&a, &b), Ordering::Equal);
    }

    #[test]
    fn test_snapshot_default_never_dispatched() {
        let snapshot = QueueSnapshot::default();
        assert!(snapshot.pending.is_empty());
        assert_eq!(snapshot.last_dispatched_at, 0);
    }
}
