//! Integration tests for BatchDaemon
//!
//! These run a real daemon in-process and talk to it over its Unix socket.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use batchdaemon::config::Config;
use batchdaemon::daemon::{VERSION, run_daemon};
use batchdaemon::dispatch::DispatchStats;
use batchdaemon::domain::{BatchStatus, IngestionStatus, ItemId, ItemResult};
use batchdaemon::ipc::DaemonClient;
use batchdaemon::processor::ItemProcessor;
use tempfile::TempDir;
use tokio::task::JoinHandle;

/// Fast processor that records the order in which ids arrive
#[derive(Default)]
struct RecordingProcessor {
    seen: Mutex<Vec<ItemId>>,
}

#[async_trait]
impl ItemProcessor for RecordingProcessor {
    async fn process(&self, id: &ItemId) -> eyre::Result<ItemResult> {
        self.seen.lock().unwrap().push(id.clone());
        tokio::time::sleep(Duration::from_millis(2)).await;
        Ok(ItemResult::new(id.clone(), "processed"))
    }
}

fn test_config(temp: &TempDir, dispatch_interval_ms: u64) -> Config {
    let mut config = Config::default();
    config.storage.data_dir = temp.path().join("data");
    config.ipc.socket_path = Some(temp.path().join("bd.sock"));
    config.queue.dispatch_interval_ms = dispatch_interval_ms;
    config.dispatcher.poll_interval_ms = 20;
    config
}

fn start(config: &Config, processor: Arc<RecordingProcessor>) -> JoinHandle<eyre::Result<DispatchStats>> {
    let config = config.clone();
    tokio::spawn(async move { run_daemon(&config, processor).await })
}

async fn connect(socket_path: PathBuf) -> DaemonClient {
    let client = DaemonClient::with_socket_path(socket_path).with_timeout(Duration::from_secs(2));
    for _ in 0..250 {
        if client.ping().await.is_ok() {
            return client;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("daemon never became reachable");
}

async fn stop(client: &DaemonClient, handle: JoinHandle<eyre::Result<DispatchStats>>) -> DispatchStats {
    client.shutdown().await.expect("shutdown request failed");
    tokio::time::timeout(Duration::from_secs(10), handle)
        .await
        .expect("daemon did not stop")
        .expect("daemon task panicked")
        .expect("daemon returned an error")
}

async fn wait_for_completed(client: &DaemonClient, ingestion_id: &str) {
    for _ in 0..500 {
        let report = client.status(ingestion_id).await.unwrap();
        if report.status == IngestionStatus::Completed {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("ingestion {} never completed", ingestion_id);
}

fn ints(range: std::ops::RangeInclusive<i64>) -> Vec<ItemId> {
    range.map(ItemId::Int).collect()
}

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn test_daemon_ping_and_shutdown() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(&temp, 100);
    let handle = start(&config, Arc::new(RecordingProcessor::default()));

    let client = connect(config.socket_path()).await;
    assert_eq!(client.ping().await.unwrap(), VERSION);

    let stats = stop(&client, handle).await;
    assert_eq!(stats.dispatched, 0);
    assert!(!config.socket_path().exists(), "socket should be removed on shutdown");
}

#[tokio::test]
async fn test_second_daemon_on_same_data_dir_fails() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(&temp, 100);
    let handle = start(&config, Arc::new(RecordingProcessor::default()));
    let client = connect(config.socket_path()).await;

    let mut second = config.clone();
    second.ipc.socket_path = Some(temp.path().join("second.sock"));
    let result = run_daemon(&second, Arc::new(RecordingProcessor::default())).await;
    assert!(result.is_err());

    stop(&client, handle).await;
}

#[tokio::test]
async fn test_invalid_config_rejected() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let mut config = test_config(&temp, 100);
    config.ingest.batch_size = 0;

    let result = run_daemon(&config, Arc::new(RecordingProcessor::default())).await;
    assert!(result.is_err());
    assert!(!config.socket_path().exists());
}

// =============================================================================
// Ingestion and dispatch
// =============================================================================

#[tokio::test]
async fn test_ingest_splits_and_completes() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(&temp, 50);
    let processor = Arc::new(RecordingProcessor::default());
    let handle = start(&config, processor.clone());
    let client = connect(config.socket_path()).await;

    let id = client.ingest(ints(1..=5), "HIGH").await.unwrap();
    let report = client.status(&id).await.unwrap();
    assert_eq!(report.batches.len(), 2);
    assert_eq!(report.batches[0].ids, ints(1..=3));
    assert_eq!(report.batches[1].ids, ints(4..=5));

    wait_for_completed(&client, &id).await;
    let report = client.status(&id).await.unwrap();
    assert!(report.batches.iter().all(|b| b.status == BatchStatus::Completed));

    let mut seen = processor.seen.lock().unwrap().clone();
    seen.sort_by_key(|id| id.to_string());
    assert_eq!(seen, ints(1..=5));

    let stats = stop(&client, handle).await;
    assert_eq!(stats.completed, 2);
}

#[tokio::test]
async fn test_higher_priority_dispatches_first() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(&temp, 300);
    let processor = Arc::new(RecordingProcessor::default());
    let handle = start(&config, processor.clone());
    let client = connect(config.socket_path()).await;

    // The first dispatch opens the rate limit window; everything after it
    // waits in the queue and is released by priority.
    let blocker = client.ingest(vec![ItemId::Int(0)], "HIGH").await.unwrap();
    let low = client.ingest(ints(1..=3), "LOW").await.unwrap();
    let medium = client.ingest(ints(4..=4), "MEDIUM").await.unwrap();
    let high = client.ingest(ints(5..=6), "HIGH").await.unwrap();

    for id in [&blocker, &low, &medium, &high] {
        wait_for_completed(&client, id).await;
    }

    let seen = processor.seen.lock().unwrap().clone();
    let position = |n: i64| seen.iter().position(|id| *id == ItemId::Int(n)).unwrap();
    assert_eq!(position(0), 0);
    assert!(position(5).max(position(6)) < position(4));
    assert!(position(4) < [1, 2, 3].into_iter().map(position).min().unwrap());

    stop(&client, handle).await;
}

#[tokio::test]
async fn test_rejected_requests() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(&temp, 100);
    let handle = start(&config, Arc::new(RecordingProcessor::default()));
    let client = connect(config.socket_path()).await;

    let err = client.ingest(ints(1..=2), "URGENT").await.unwrap_err();
    assert!(err.to_string().contains("Invalid priority"));

    let err = client.ingest(ints(1..=2), "high").await.unwrap_err();
    assert!(err.to_string().contains("Invalid priority"));

    let err = client.ingest(Vec::new(), "HIGH").await.unwrap_err();
    assert!(err.to_string().contains("non-empty"));

    let err = client.status("no-such-ingestion").await.unwrap_err();
    assert!(err.to_string().contains("not found"));

    assert!(client.queue().await.unwrap().pending.is_empty());

    stop(&client, handle).await;
}

// =============================================================================
// Durability
// =============================================================================

#[tokio::test]
async fn test_queue_survives_restart() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(&temp, 60_000);

    let handle = start(&config, Arc::new(RecordingProcessor::default()));
    let client = connect(config.socket_path()).await;

    let first = client.ingest(ints(1..=1), "LOW").await.unwrap();
    wait_for_completed(&client, &first).await;
    let second = client.ingest(ints(2..=4), "HIGH").await.unwrap();

    let before = client.queue().await.unwrap();
    assert_eq!(before.pending.len(), 1);
    assert!(before.last_dispatched_at > 0);
    stop(&client, handle).await;

    let handle = start(&config, Arc::new(RecordingProcessor::default()));
    let client = connect(config.socket_path()).await;

    let after = client.queue().await.unwrap();
    assert_eq!(after.pending, before.pending);
    assert_eq!(after.last_dispatched_at, before.last_dispatched_at);

    assert_eq!(client.status(&first).await.unwrap().status, IngestionStatus::Completed);
    assert_eq!(client.status(&second).await.unwrap().status, IngestionStatus::YetToStart);

    let stats = stop(&client, handle).await;
    assert_eq!(stats.dispatched, 0, "rate limit window must carry over the restart");
}
