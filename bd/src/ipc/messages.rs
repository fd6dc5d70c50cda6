//! IPC message types for daemon communication
//!
//! Each message is a single line of JSON followed by `\n`, tagged by `type`.

use serde::{Deserialize, Serialize};

use crate::domain::{Batch, ItemId};
use crate::ingest::IngestionReport;

/// Requests from the CLI to the daemon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum DaemonMessage {
    /// Submit ids for processing at the given priority label
    Ingest { ids: Vec<ItemId>, priority: String },

    /// Aggregate status of one ingestion
    Status { ingestion_id: String },

    /// Pending batches in dispatch order
    Queue,

    /// Ping to check if daemon is alive
    Ping,

    /// Request daemon to stop gracefully
    Shutdown,
}

/// Responses from the daemon to the CLI
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum DaemonResponse {
    /// Ingestion accepted
    Ingested { ingestion_id: String },

    /// Status report
    Status(IngestionReport),

    /// Queue contents
    Queue {
        pending: Vec<Batch>,
        last_dispatched_at: i64,
    },

    /// Pong response to ping
    Pong { version: String },

    /// Acknowledgment
    Ok,

    /// Error response
    Error { message: String },
}

impl DaemonResponse {
    pub fn error(message: impl std::fmt::Display) -> Self {
        Self::Error {
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BatchStatus, IngestionStatus};
    use crate::ingest::BatchSummary;

    #[test]
    fn test_ingest_serialize() {
        let msg = DaemonMessage::Ingest {
            ids: vec![ItemId::Int(1), ItemId::Text("abc".to_string())],
            priority: "HIGH".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"Ingest","ids":[1,"abc"],"priority":"HIGH"}"#);
    }

    #[test]
    fn test_ingest_accepts_any_json_ids() {
        let json = r#"{"type":"Ingest","ids":[1.5,true,"x",7],"priority":"LOW"}"#;
        let msg: DaemonMessage = serde_json::from_str(json).unwrap();
        match msg {
            DaemonMessage::Ingest { ids, .. } => {
                assert_eq!(ids.len(), 4);
                assert!(matches!(ids[0], ItemId::Other(_)));
                assert!(matches!(ids[1], ItemId::Other(_)));
                assert_eq!(ids[2], ItemId::from("x"));
                assert_eq!(ids[3], ItemId::Int(7));
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_status_deserialize() {
        let json = r#"{"type":"Status","ingestion_id":"ing-1"}"#;
        let msg: DaemonMessage = serde_json::from_str(json).unwrap();
        assert_eq!(
            msg,
            DaemonMessage::Status {
                ingestion_id: "ing-1".to_string()
            }
        );
    }

    #[test]
    fn test_unit_messages_serialize() {
        assert_eq!(serde_json::to_string(&DaemonMessage::Ping).unwrap(), r#"{"type":"Ping"}"#);
        assert_eq!(serde_json::to_string(&DaemonMessage::Queue).unwrap(), r#"{"type":"Queue"}"#);
        assert_eq!(
            serde_json::to_string(&DaemonMessage::Shutdown).unwrap(),
            r#"{"type":"Shutdown"}"#
        );
    }

    #[test]
    fn test_status_response_is_flat() {
        let resp = DaemonResponse::Status(IngestionReport {
            ingestion_id: "ing-1".to_string(),
            status: IngestionStatus::Triggered,
            batches: vec![BatchSummary {
                batch_id: "b-1".to_string(),
                ids: vec![ItemId::Int(1)],
                status: BatchStatus::Triggered,
            }],
        });
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["type"], "Status");
        assert_eq!(json["ingestion_id"], "ing-1");
        assert_eq!(json["status"], "triggered");

        let parsed: DaemonResponse = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, resp);
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = DaemonResponse::error("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"type":"Error","message":"Something went wrong"}"#);
    }
}
