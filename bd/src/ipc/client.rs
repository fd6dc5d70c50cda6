//! IPC client for communicating with the daemon
//!
//! Used by the CLI subcommands; every call opens a fresh connection.

use std::path::PathBuf;
use std::time::Duration;

use eyre::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tracing::debug;

use crate::domain::ItemId;
use crate::ingest::IngestionReport;
use crate::queue::QueueSnapshot;

use super::messages::{DaemonMessage, DaemonResponse};
use super::{MAX_MESSAGE_SIZE, get_socket_path};

/// Default timeout for IPC operations
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for communicating with the daemon via IPC
#[derive(Debug, Clone)]
pub struct DaemonClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl Default for DaemonClient {
    fn default() -> Self {
        Self::new()
    }
}

impl DaemonClient {
    /// Create a new client with the default socket path
    pub fn new() -> Self {
        Self::with_socket_path(get_socket_path())
    }

    /// Create a client with a custom socket path
    pub fn with_socket_path(socket_path: PathBuf) -> Self {
        Self {
            socket_path,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set a custom timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check if the daemon socket exists
    pub fn socket_exists(&self) -> bool {
        self.socket_path.exists()
    }

    /// Submit ids at a priority label, returning the new ingestion id
    pub async fn ingest(&self, ids: Vec<ItemId>, priority: &str) -> Result<String> {
        debug!(ids = ids.len(), %priority, "DaemonClient: ingesting");
        let msg = DaemonMessage::Ingest {
            ids,
            priority: priority.to_string(),
        };
        match self.send_message(msg).await? {
            DaemonResponse::Ingested { ingestion_id } => Ok(ingestion_id),
            other => Err(unexpected(other)),
        }
    }

    /// Fetch the status report of an ingestion
    pub async fn status(&self, ingestion_id: &str) -> Result<IngestionReport> {
        debug!(%ingestion_id, "DaemonClient: fetching status");
        let msg = DaemonMessage::Status {
            ingestion_id: ingestion_id.to_string(),
        };
        match self.send_message(msg).await? {
            DaemonResponse::Status(report) => Ok(report),
            other => Err(unexpected(other)),
        }
    }

    /// Fetch the pending queue in dispatch order
    pub async fn queue(&self) -> Result<QueueSnapshot> {
        debug!("DaemonClient: fetching queue");
        match self.send_message(DaemonMessage::Queue).await? {
            DaemonResponse::Queue {
                pending,
                last_dispatched_at,
            } => Ok(QueueSnapshot::new(pending, last_dispatched_at)),
            other => Err(unexpected(other)),
        }
    }

    /// Check if daemon is alive and get its version
    pub async fn ping(&self) -> Result<String> {
        debug!("DaemonClient: pinging daemon");
        match self.send_message(DaemonMessage::Ping).await? {
            DaemonResponse::Pong { version } => Ok(version),
            other => Err(unexpected(other)),
        }
    }

    /// Request daemon to shutdown gracefully
    pub async fn shutdown(&self) -> Result<()> {
        debug!("DaemonClient: requesting daemon shutdown");
        match self.send_message(DaemonMessage::Shutdown).await? {
            DaemonResponse::Ok => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Send a message to the daemon and wait for response
    async fn send_message(&self, msg: DaemonMessage) -> Result<DaemonResponse> {
        debug!(?self.socket_path, ?msg, "DaemonClient: sending message");

        let stream = tokio::time::timeout(self.timeout, UnixStream::connect(&self.socket_path))
            .await
            .context("Connection timeout")?
            .with_context(|| format!("Failed to connect to daemon socket {}", self.socket_path.display()))?;

        self.send_on_stream(stream, msg).await
    }

    async fn send_on_stream(&self, mut stream: UnixStream, msg: DaemonMessage) -> Result<DaemonResponse> {
        let msg_json = serde_json::to_string(&msg).context("Failed to serialize message")?;
        if msg_json.len() > MAX_MESSAGE_SIZE {
            return Err(eyre::eyre!("Message too large: {} bytes", msg_json.len()));
        }

        tokio::time::timeout(self.timeout, async {
            stream
                .write_all(msg_json.as_bytes())
                .await
                .context("Failed to write message")?;
            stream.write_all(b"\n").await.context("Failed to write newline")?;
            stream.flush().await.context("Failed to flush stream")?;
            Ok::<_, eyre::Error>(())
        })
        .await
        .context("Write timeout")??;

        // Responses are unbounded: a queue listing can exceed the request limit
        let mut reader = BufReader::new(&mut stream);
        let mut response_line = String::new();
        tokio::time::timeout(self.timeout, reader.read_line(&mut response_line))
            .await
            .context("Read timeout")?
            .context("Failed to read response")?;

        let response: DaemonResponse =
            serde_json::from_str(response_line.trim()).context("Failed to parse daemon response")?;

        debug!(?response, "DaemonClient: received response");
        Ok(response)
    }
}

fn unexpected(response: DaemonResponse) -> eyre::Report {
    match response {
        DaemonResponse::Error { message } => eyre::eyre!("Daemon error: {}", message),
        other => eyre::eyre!("Unexpected response: {:?}", other),
    }
}
