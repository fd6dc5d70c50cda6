//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// BatchDaemon - durable priority batch queue
#[derive(Parser)]
#[command(
    name = "bd",
    about = "Durable priority batch queue with rate-limited dispatch",
    version = env!("CARGO_PKG_VERSION"),
    after_help = "Logs are written to <data-dir>/logs/batchdaemon.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the daemon in the foreground until Ctrl+C or `bd stop`
    Daemon,

    /// Submit ids for processing
    Ingest {
        /// Priority label (HIGH, MEDIUM, LOW)
        #[arg(short, long, default_value = "MEDIUM")]
        priority: String,

        /// Item ids; integers are sent as numbers
        #[arg(required = true, value_name = "ID")]
        ids: Vec<String>,
    },

    /// Show the status of an ingestion
    Status {
        /// Ingestion id returned by `bd ingest`
        ingestion_id: String,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show pending batches in dispatch order
    Queue {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Ping the daemon to check if it's alive and responsive
    Ping,

    /// Ask the daemon to stop gracefully
    Stop,
}

/// Output format for status/queue commands
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text, json", s)),
        }
    }
}
