//! Dispatch loop
//!
//! Polls the queue on a fixed period and hands each released batch to the
//! worker, one batch at a time.

use std::sync::Arc;
use std::time::Duration;

use eyre::{Context, Result};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::processor::{BatchOutcome, BatchWorker};
use crate::queue::PriorityQueue;

use super::config::DispatcherConfig;

/// Counters reported when the loop stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub ticks: u64,
    pub dispatched: u64,
    pub completed: u64,
    pub failed: u64,
}

impl DispatchStats {
    fn record(&mut self, outcome: &BatchOutcome) {
        self.dispatched += 1;
        match outcome {
            BatchOutcome::Completed(_) => self.completed += 1,
            BatchOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Single cooperative task that drains the queue at the rate it allows
pub struct Dispatcher {
    config: DispatcherConfig,
    queue: Arc<PriorityQueue>,
    worker: BatchWorker,
    shutdown: watch::Receiver<bool>,
}

impl Dispatcher {
    pub fn new(
        config: DispatcherConfig,
        queue: Arc<PriorityQueue>,
        worker: BatchWorker,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        debug!(?config, "Dispatcher::new: called");
        Self {
            config,
            queue,
            worker,
            shutdown,
        }
    }

    /// Run until shutdown is signalled.
    ///
    /// A batch in flight always finishes before the shutdown signal is
    /// observed. Store failures end the loop with an error.
    pub async fn run(mut self) -> Result<DispatchStats> {
        debug!("Dispatcher::run: called");
        let poll_interval = self.config.poll_interval();
        info!(?poll_interval, "Dispatcher starting");

        let mut stats = DispatchStats::default();
        loop {
            if *self.shutdown.borrow() {
                debug!("Dispatcher::run: shutdown flag set");
                break;
            }

            stats.ticks += 1;
            if let Some(outcome) = self.tick().await? {
                stats.record(&outcome);
            }

            let wait = self.next_wait(poll_interval).await;
            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                changed = self.shutdown.changed() => {
                    if changed.is_err() {
                        debug!("Dispatcher::run: shutdown sender dropped");
                        break;
                    }
                }
            }
        }

        info!(
            dispatched = stats.dispatched,
            completed = stats.completed,
            failed = stats.failed,
            "Dispatcher stopped"
        );
        Ok(stats)
    }

    /// Sleep until the rate limit reopens when batches are waiting on it,
    /// otherwise for one poll period
    async fn next_wait(&self, poll_interval: Duration) -> Duration {
        if self.queue.is_empty().await {
            return poll_interval;
        }
        poll_interval.max(self.queue.retry_after().await)
    }

    /// One dispatch attempt: release at most one batch and process it to the end
    pub async fn tick(&self) -> Result<Option<BatchOutcome>> {
        let Some(batch) = self.queue.try_dequeue().await.context("Failed to dequeue batch")? else {
            return Ok(None);
        };

        let batch_id = batch.batch_id.clone();
        debug!(%batch_id, priority = %batch.priority, "Dispatcher::tick: dispatching");
        let outcome = self
            .worker
            .process_batch(batch)
            .await
            .with_context(|| format!("Failed to record progress of batch {}", batch_id))?;
        Ok(Some(outcome))
    }
}
