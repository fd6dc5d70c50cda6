//! Daemon runtime
//!
//! Wires the state actor, queue, dispatcher and IPC listener together and runs
//! until a `Shutdown` request or a termination signal.

use std::sync::Arc;

use eyre::{Context, Result};
use tokio::net::UnixStream;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::dispatch::{DispatchStats, Dispatcher};
use crate::ingest::IngestService;
use crate::ipc::{DaemonMessage, DaemonResponse, cleanup_socket, create_listener_at, read_message, send_response};
use crate::processor::{BatchWorker, ItemProcessor};
use crate::queue::PriorityQueue;
use crate::state::{StateManager, scan_for_recovery};

/// Version reported in `Pong`
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Handles shared by the connection tasks
#[derive(Clone)]
struct DaemonContext {
    ingest: IngestService,
    queue: Arc<PriorityQueue>,
    stop_tx: mpsc::Sender<()>,
}

/// Run the daemon in the foreground until it is asked to stop.
///
/// Returns the dispatcher's counters, or the error that stopped it.
pub async fn run_daemon(config: &Config, processor: Arc<dyn ItemProcessor>) -> Result<DispatchStats> {
    debug!(data_dir = %config.data_dir().display(), "run_daemon: called");
    config.validate().context("Invalid configuration")?;

    std::fs::create_dir_all(config.data_dir())
        .with_context(|| format!("Failed to create data directory {}", config.data_dir().display()))?;

    let state = StateManager::spawn(config.data_dir())?;
    info!(data_dir = %config.data_dir().display(), "StateManager started");

    let queue = Arc::new(PriorityQueue::new(config.queue.clone(), state.clone()));
    queue.restore().await.context("Failed to restore queue")?;

    let recovery = scan_for_recovery(&state, &queue.pending().await).await?;
    info!(%recovery, "Startup recovery scan");

    let socket_path = config.socket_path();
    let (listener, socket_path) = create_listener_at(&socket_path)?;
    info!(?socket_path, "IPC socket listening");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = BatchWorker::new(state.clone(), processor);
    let dispatcher = Dispatcher::new(config.dispatcher.clone(), queue.clone(), worker, shutdown_rx);
    let mut dispatcher_handle = tokio::spawn(dispatcher.run());
    info!("Dispatcher started");

    let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);
    let ctx = DaemonContext {
        ingest: IngestService::new(config.ingest.clone(), state.clone(), queue.clone()),
        queue,
        stop_tx,
    };

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    info!(version = VERSION, "Daemon running. Press Ctrl+C or run `bd stop` to stop.");

    let mut finished = None;
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, _addr)) => {
                        debug!("run_daemon: IPC connection accepted");
                        let ctx = ctx.clone();
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(ctx, stream).await {
                                warn!(error = %e, "IPC connection error");
                            }
                        });
                    }
                    Err(e) => {
                        warn!(error = %e, "IPC accept error");
                    }
                }
            }
            _ = stop_rx.recv() => {
                info!("Shutdown requested over IPC");
                break;
            }
            _ = sigint.recv() => {
                warn!("SIGINT received");
                break;
            }
            _ = sigterm.recv() => {
                warn!("SIGTERM received");
                break;
            }
            result = &mut dispatcher_handle => {
                error!("Dispatcher exited unexpectedly");
                finished = Some(result);
                break;
            }
        }
    }

    info!("Daemon shutting down...");
    drop(listener);
    cleanup_socket(&socket_path);

    let _ = shutdown_tx.send(true);
    let result = match finished {
        Some(result) => result,
        None => {
            debug!("run_daemon: waiting for in-flight batch");
            dispatcher_handle.await
        }
    };

    if let Err(e) = state.shutdown().await {
        warn!(error = %e, "StateManager shutdown failed");
    }

    let stats = result.context("Dispatcher task panicked")??;
    info!(
        dispatched = stats.dispatched,
        completed = stats.completed,
        failed = stats.failed,
        "Daemon stopped"
    );
    Ok(stats)
}

/// Serve one request/response exchange
async fn handle_connection(ctx: DaemonContext, mut stream: UnixStream) -> Result<()> {
    let msg = match read_message(&mut stream).await {
        Ok(msg) => msg,
        Err(e) => {
            let _ = send_response(&mut stream, &DaemonResponse::error(format!("{:#}", e))).await;
            return Err(e);
        }
    };

    let stop = msg == DaemonMessage::Shutdown;
    let response = handle_message(&ctx, msg).await;
    send_response(&mut stream, &response).await?;

    if stop {
        let _ = ctx.stop_tx.try_send(());
    }
    Ok(())
}

async fn handle_message(ctx: &DaemonContext, msg: DaemonMessage) -> DaemonResponse {
    match msg {
        DaemonMessage::Ingest { ids, priority } => match ctx.ingest.ingest(ids, &priority).await {
            Ok(ingestion_id) => DaemonResponse::Ingested { ingestion_id },
            Err(e) => DaemonResponse::error(e),
        },
        DaemonMessage::Status { ingestion_id } => match ctx.ingest.status(&ingestion_id).await {
            Ok(report) => DaemonResponse::Status(report),
            Err(e) => DaemonResponse::error(e),
        },
        DaemonMessage::Queue => {
            let snapshot = ctx.queue.snapshot().await;
            DaemonResponse::Queue {
                pending: snapshot.pending,
                last_dispatched_at: snapshot.last_dispatched_at,
            }
        }
        DaemonMessage::Ping => DaemonResponse::Pong {
            version: VERSION.to_string(),
        },
        DaemonMessage::Shutdown => DaemonResponse::Ok,
    }
}
