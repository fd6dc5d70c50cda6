//! BatchDaemon CLI
//!
//! Runs the daemon in the foreground or talks to a running one over IPC.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{debug, info};

use batchdaemon::cli::{Cli, Command, OutputFormat};
use batchdaemon::config::Config;
use batchdaemon::daemon::run_daemon;
use batchdaemon::domain::{BatchStatus, IngestionStatus, ItemId};
use batchdaemon::ipc::DaemonClient;
use batchdaemon::processor::SimulatedProcessor;

fn setup_logging(log_file: &Path, cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    if let Some(log_dir) = log_file.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .context("Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(&config.log_file(), cli.log_level.as_deref(), config.log_level.as_deref())
        .context("Failed to setup logging")?;

    let client = DaemonClient::with_socket_path(config.socket_path());

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Daemon => cmd_daemon(&config).await,
        Command::Ingest { priority, ids } => cmd_ingest(&client, &priority, ids).await,
        Command::Status { ingestion_id, format } => cmd_status(&client, &ingestion_id, format).await,
        Command::Queue { format } => cmd_queue(&client, format).await,
        Command::Ping => cmd_ping(&client).await,
        Command::Stop => cmd_stop(&client).await,
    }
}

/// Run the daemon in the foreground
async fn cmd_daemon(config: &Config) -> Result<()> {
    debug!("cmd_daemon: called");
    let processor = Arc::new(SimulatedProcessor::new(&config.processor));

    println!(
        "{} BatchDaemon listening on {}",
        "✓".green(),
        config.socket_path().display().to_string().cyan()
    );
    let stats = run_daemon(config, processor).await?;
    println!(
        "BatchDaemon stopped: {} dispatched, {} completed, {} failed",
        stats.dispatched, stats.completed, stats.failed
    );
    Ok(())
}

async fn cmd_ingest(client: &DaemonClient, priority: &str, ids: Vec<String>) -> Result<()> {
    debug!(%priority, ids = ids.len(), "cmd_ingest: called");
    let ids: Vec<ItemId> = ids.iter().map(|s| ItemId::parse_arg(s)).collect();
    let ingestion_id = client.ingest(ids, priority).await?;
    println!("{} Ingestion accepted: {}", "✓".green(), ingestion_id.cyan());
    Ok(())
}

async fn cmd_status(client: &DaemonClient, ingestion_id: &str, format: OutputFormat) -> Result<()> {
    debug!(%ingestion_id, ?format, "cmd_status: called");
    let report = client.status(ingestion_id).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            let status = match report.status {
                IngestionStatus::YetToStart => report.status.to_string().dimmed(),
                IngestionStatus::Triggered => report.status.to_string().yellow(),
                IngestionStatus::Completed => report.status.to_string().green(),
            };
            println!("Ingestion: {}", report.ingestion_id.cyan());
            println!("Status: {}", status);
            for batch in &report.batches {
                println!(
                    "  {} [{}] {}",
                    batch.batch_id.yellow(),
                    join_ids(&batch.ids),
                    color_batch_status(batch.status)
                );
            }
        }
    }
    Ok(())
}

async fn cmd_queue(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    debug!(?format, "cmd_queue: called");
    let snapshot = client.queue().await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        OutputFormat::Text => {
            let last = chrono::DateTime::from_timestamp_millis(snapshot.last_dispatched_at)
                .filter(|_| snapshot.last_dispatched_at > 0)
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "never".to_string());
            println!("Pending batches: {}", snapshot.pending.len());
            println!("Last dispatch: {}", last.dimmed());
            for batch in &snapshot.pending {
                println!(
                    "  {:<6} {} [{}]",
                    batch.priority.label(),
                    batch.batch_id.yellow(),
                    join_ids(&batch.ids)
                );
            }
        }
    }
    Ok(())
}

async fn cmd_ping(client: &DaemonClient) -> Result<()> {
    debug!("cmd_ping: called");
    if !client.socket_exists() {
        println!("BatchDaemon is not running");
        return Ok(());
    }

    match client.ping().await {
        Ok(version) => {
            println!("{} Daemon is alive and responsive", "✓".green());
            println!("Version: {}", version);
        }
        Err(e) => {
            debug!(error = %e, "cmd_ping: ping failed");
            println!("{} Daemon socket exists but is not responding", "✗".red());
            println!("Error: {}", e);
        }
    }
    Ok(())
}

async fn cmd_stop(client: &DaemonClient) -> Result<()> {
    debug!("cmd_stop: called");
    if !client.socket_exists() {
        println!("BatchDaemon is not running");
        return Ok(());
    }

    client.shutdown().await?;

    // The socket is removed before the in-flight batch finishes
    let mut attempts = 0;
    while client.socket_exists() && attempts < 50 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        attempts += 1;
    }
    println!("{} BatchDaemon stopping", "✓".green());
    Ok(())
}

fn join_ids(ids: &[ItemId]) -> String {
    ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

fn color_batch_status(status: BatchStatus) -> ColoredString {
    match status {
        BatchStatus::Queued => status.to_string().dimmed(),
        BatchStatus::Triggered => status.to_string().yellow(),
        BatchStatus::Completed => status.to_string().green(),
    }
}
