//! BatchDaemon configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::dispatch::DispatcherConfig;
use crate::ingest::IngestConfig;
use crate::ipc::get_socket_path;
use crate::processor::ProcessorConfig;
use crate::queue::QueueConfig;

/// Largest dispatch interval that still fits the millisecond timestamps
const MAX_DISPATCH_INTERVAL_MS: u64 = i64::MAX as u64;

/// Main BatchDaemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration
    pub storage: StorageConfig,

    /// Queue rate limit
    pub queue: QueueConfig,

    /// Dispatch loop timing
    pub dispatcher: DispatcherConfig,

    /// Batch splitting
    pub ingest: IngestConfig,

    /// Simulated processor latency
    pub processor: ProcessorConfig,

    /// IPC socket configuration
    pub ipc: IpcConfig,

    /// Log level used when `--log-level` is not given
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Call this early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        if self.ingest.batch_size == 0 {
            return Err(eyre::eyre!("ingest.batch-size must be at least 1"));
        }
        if self.queue.dispatch_interval_ms == 0 {
            return Err(eyre::eyre!("queue.dispatch-interval-ms must be greater than 0"));
        }
        if self.queue.dispatch_interval_ms > MAX_DISPATCH_INTERVAL_MS {
            return Err(eyre::eyre!(
                "queue.dispatch-interval-ms must be at most {}",
                MAX_DISPATCH_INTERVAL_MS
            ));
        }
        if self.dispatcher.poll_interval_ms == 0 {
            return Err(eyre::eyre!("dispatcher.poll-interval-ms must be greater than 0"));
        }
        if self.processor.min_latency_ms > self.processor.max_latency_ms {
            return Err(eyre::eyre!(
                "processor.min-latency-ms ({}) exceeds processor.max-latency-ms ({})",
                self.processor.min_latency_ms,
                self.processor.max_latency_ms
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Project-local config: .batchdaemon.yml
        let local_config = PathBuf::from(".batchdaemon.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // User config: ~/.config/batchdaemon/batchdaemon.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("batchdaemon").join("batchdaemon.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Directory holding records, the queue snapshot and logs
    pub fn data_dir(&self) -> &Path {
        &self.storage.data_dir
    }

    /// Socket the daemon listens on and the CLI connects to
    pub fn socket_path(&self) -> PathBuf {
        self.ipc.socket_path.clone().unwrap_or_else(get_socket_path)
    }

    /// Log file written by the daemon
    pub fn log_file(&self) -> PathBuf {
        self.data_dir().join("logs").join("batchdaemon.log")
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for BatchStore data
    #[serde(rename = "data-dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        // XDG data directory (~/.local/share/batchdaemon on Linux)
        let data_dir = dirs::data_dir()
            .map(|d| d.join("batchdaemon"))
            .unwrap_or_else(|| PathBuf::from(".batchstore"));

        Self { data_dir }
    }
}

/// IPC configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IpcConfig {
    /// Override for the daemon socket path
    #[serde(rename = "socket-path")]
    pub socket_path: Option<PathBuf>,
}
