//! Batch record
//!
//! A Batch is a bounded slice of an ingestion's ids and the unit of queuing and
//! dispatch. Its status only moves forward: `queued -> triggered -> completed`.

use batchstore::{Record, now_ms};
use serde::{Deserialize, Serialize};

use super::id::generate_id;
use super::item::{ItemId, ItemResult};
use super::priority::Priority;

/// Lifecycle status of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// Waiting in the pending sequence
    #[default]
    Queued,
    /// Dispatched, work in flight (or stalled after a processing failure)
    Triggered,
    /// Work finished and results attached; immutable from here on
    Completed,
}

impl BatchStatus {
    /// Status that follows this one, if any
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Queued => Some(Self::Triggered),
            Self::Triggered => Some(Self::Completed),
            Self::Completed => None,
        }
    }

    /// Whether a record currently in `self` may be rewritten with status `to`.
    ///
    /// Rewrites in the same status are allowed except for `completed`.
    pub fn can_transition_to(self, to: Self) -> bool {
        match self {
            Self::Completed => false,
            _ => to == self || self.next() == Some(to),
        }
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Queued => write!(f, "queued"),
            Self::Triggered => write!(f, "triggered"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// A dispatchable slice of an ingestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    /// Unique identifier
    pub batch_id: String,

    /// Owning ingestion (back-reference)
    pub ingestion_id: String,

    /// Item ids in submission order
    pub ids: Vec<ItemId>,

    /// Dispatch priority
    pub priority: Priority,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,

    /// Current lifecycle status
    pub status: BatchStatus,

    /// When processing finished (Unix milliseconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<i64>,

    /// Per-id results, in the same order as `ids`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<ItemResult>>,

    /// Last update timestamp (Unix milliseconds)
    pub updated_at: i64,
}

impl Batch {
    /// Create a queued batch with a generated id
    pub fn new(ingestion_id: impl Into<String>, ids: Vec<ItemId>, priority: Priority) -> Self {
        Self::with_id(generate_id(), ingestion_id, ids, priority)
    }

    /// Create a queued batch with a specific id (for testing or recovery)
    pub fn with_id(
        batch_id: impl Into<String>,
        ingestion_id: impl Into<String>,
        ids: Vec<ItemId>,
        priority: Priority,
    ) -> Self {
        let now = now_ms();
        Self {
            batch_id: batch_id.into(),
            ingestion_id: ingestion_id.into(),
            ids,
            priority,
            created_at: now,
            status: BatchStatus::Queued,
            processed_at: None,
            results: None,
            updated_at: now,
        }
    }

    /// Override the creation timestamp
    pub fn with_created_at(mut self, created_at: i64) -> Self {
        self.created_at = created_at;
        self
    }

    /// Move to `triggered`
    pub fn mark_triggered(&mut self) {
        self.status = BatchStatus::Triggered;
        self.updated_at = now_ms();
    }

    /// Move to `completed` with results attached
    pub fn mark_completed(&mut self, results: Vec<ItemResult>) {
        let now = now_ms();
        self.status = BatchStatus::Completed;
        self.processed_at = Some(now);
        self.results = Some(results);
        self.updated_at = now;
    }

    /// Check if the batch can no longer change
    pub fn is_terminal(&self) -> bool {
        self.status == BatchStatus::Completed
    }
}

impl Record for Batch {
    fn id(&self) -> &str {
        &self.batch_id
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn collection_name() -> &'static str {
        "batches"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_new_is_queued() {
        let batch = Batch::new("ing-1", vec![ItemId::Int(1)], Priority::High);
        assert_eq!(batch.status, BatchStatus::Queued);
        assert_eq!(batch.ingestion_id, "ing-1");
        assert!(batch.processed_at.is_none());
        assert!(batch.results.is_none());
        assert!(!batch.batch_id.is_empty());
    }

    #[test]
    fn test_status_transitions() {
        use BatchStatus::*;

        assert!(Queued.can_transition_to(Queued));
        assert!(Queued.can_transition_to(Triggered));
        assert!(!Queued.can_transition_to(Completed));

        assert!(Triggered.can_transition_to(Triggered));
        assert!(Triggered.can_transition_to(Completed));
        assert!(!Triggered.can_transition_to(Queued));

        assert!(!Completed.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Triggered));
        assert!(!Completed.can_transition_to(Queued));
    }

    #[test]
    fn test_mark_completed_attaches_results() {
        let mut batch = Batch::new("ing", vec![ItemId::Int(1), ItemId::Int(2)], Priority::Low);
        batch.mark_triggered();
        assert_eq!(batch.status, BatchStatus::Triggered);

        let results = vec![
            ItemResult::new(ItemId::Int(1), "processed"),
            ItemResult::new(ItemId::Int(2), "processed"),
        ];
        batch.mark_completed(results.clone());

        assert!(batch.is_terminal());
        assert!(batch.processed_at.is_some());
        assert_eq!(batch.results, Some(results));
    }

    #[test]
    fn test_batch_serde_shape() {
        let batch = Batch::with_id("b1", "i1", vec![ItemId::Int(4), ItemId::Int(5)], Priority::High).with_created_at(10);
        let value = serde_json::to_value(&batch).unwrap();

        assert_eq!(value["batch_id"], "b1");
        assert_eq!(value["priority"], 3);
        assert_eq!(value["status"], "queued");
        assert_eq!(value["created_at"], 10);
        assert!(value.get("results").is_none());
        assert!(value.get("processed_at").is_none());
    }

    #[test]
    fn test_status_display_matches_serde() {
        for status in [BatchStatus::Queued, BatchStatus::Triggered, BatchStatus::Completed] {
            let json = serde_json::to_value(status).unwrap();
            assert_eq!(json, status.to_string());
        }
    }
}
