//! Ingestion record and aggregate status

use batchstore::{Record, now_ms};
use serde::{Deserialize, Serialize};

use super::batch::BatchStatus;
use super::id::generate_id;
use super::item::ItemId;
use super::priority::{self, Priority};

/// A client-submitted request, split into batches at creation time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingestion {
    /// Unique identifier
    pub ingestion_id: String,

    /// Requested priority, stored as its label
    #[serde(with = "priority::label")]
    pub priority: Priority,

    /// Item ids as submitted
    pub ids: Vec<ItemId>,

    /// Owned batches, in chunk order
    pub batch_ids: Vec<String>,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,

    /// Last update timestamp (Unix milliseconds)
    pub updated_at: i64,
}

impl Ingestion {
    /// Create a new ingestion with a generated id and no batches yet
    pub fn new(ids: Vec<ItemId>, priority: Priority) -> Self {
        let now = now_ms();
        Self {
            ingestion_id: generate_id(),
            priority,
            ids,
            batch_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Record for Ingestion {
    fn id(&self) -> &str {
        &self.ingestion_id
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn collection_name() -> &'static str {
        "ingestions"
    }
}

/// Aggregate status of an ingestion, derived from its batches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestionStatus {
    YetToStart,
    Triggered,
    Completed,
}

impl IngestionStatus {
    /// Derive the aggregate from batch statuses.
    ///
    /// All completed wins; otherwise any batch that has left `queued` makes the
    /// whole ingestion `triggered`; otherwise nothing has started.
    pub fn aggregate<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = BatchStatus>,
    {
        let mut all_completed = true;
        let mut any_started = false;
        for status in statuses {
            all_completed &= status == BatchStatus::Completed;
            any_started |= status != BatchStatus::Queued;
        }

        if all_completed {
            Self::Completed
        } else if any_started {
            Self::Triggered
        } else {
            Self::YetToStart
        }
    }
}

impl std::fmt::Display for IngestionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::YetToStart => write!(f, "yet_to_start"),
            Self::Triggered => write!(f, "triggered"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BatchStatus::*;

    #[test]
    fn test_all_completed() {
        assert_eq!(
            IngestionStatus::aggregate([Completed, Completed]),
            IngestionStatus::Completed
        );
    }

    #[test]
    fn test_one_triggered_rest_queued() {
        assert_eq!(
            IngestionStatus::aggregate([Triggered, Queued, Queued]),
            IngestionStatus::Triggered
        );
    }

    #[test]
    fn test_all_queued_is_yet_to_start() {
        assert_eq!(IngestionStatus::aggregate([Queued, Queued]), IngestionStatus::YetToStart);
    }

    #[test]
    fn test_partially_completed_is_triggered() {
        assert_eq!(
            IngestionStatus::aggregate([Completed, Queued]),
            IngestionStatus::Triggered
        );
    }

    #[test]
    fn test_ingestion_serde_uses_label() {
        let ingestion = Ingestion::new(vec![ItemId::Int(1)], Priority::High);
        let value = serde_json::to_value(&ingestion).unwrap();
        assert_eq!(value["priority"], "HIGH");

        let parsed: Ingestion = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, ingestion);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(IngestionStatus::YetToStart.to_string(), "yet_to_start");
        assert_eq!(
            serde_json::to_string(&IngestionStatus::YetToStart).unwrap(),
            "\"yet_to_start\""
        );
    }
}
