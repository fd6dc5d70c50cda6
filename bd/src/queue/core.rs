//! Priority queue implementation

use std::time::Duration;

use batchstore::now_ms;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::domain::Batch;
use crate::state::{StateManager, StateResponse};

use super::config::QueueConfig;
use super::snapshot::{QueueSnapshot, dispatch_order};

/// Internal state protected by mutex
#[derive(Debug, Default)]
struct QueueInner {
    /// Pending batches in dispatch order
    pending: Vec<Batch>,

    /// Last successful dispatch (Unix milliseconds, 0 = never)
    last_dispatched_at: i64,
}

impl QueueInner {
    fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot::new(self.pending.clone(), self.last_dispatched_at)
    }
}

/// The PriorityQueue holds pending batches in dispatch order and releases at
/// most one batch per dispatch interval.
///
/// Every mutation persists the full snapshot through the [`StateManager`]
/// while the queue lock is held, so durable state matches memory by the time
/// the call returns.
pub struct PriorityQueue {
    config: QueueConfig,
    state: StateManager,
    inner: Mutex<QueueInner>,
}

impl PriorityQueue {
    /// Create an empty queue; call [`restore`](Self::restore) to load persisted state
    pub fn new(config: QueueConfig, state: StateManager) -> Self {
        debug!(?config, "PriorityQueue::new: called");
        Self {
            config,
            state,
            inner: Mutex::new(QueueInner::default()),
        }
    }

    /// Rehydrate from the persisted snapshot, or start empty if there is none
    pub async fn restore(&self) -> StateResponse<()> {
        debug!("PriorityQueue::restore: called");
        let mut inner = self.inner.lock().await;
        match self.state.load_queue().await? {
            Some(snapshot) => {
                info!(
                    pending = snapshot.pending.len(),
                    last_dispatched_at = snapshot.last_dispatched_at,
                    "Restored queue snapshot"
                );
                inner.pending = snapshot.pending;
                inner.last_dispatched_at = snapshot.last_dispatched_at;
            }
            None => {
                debug!("PriorityQueue::restore: no snapshot, starting empty");
                *inner = QueueInner::default();
            }
        }
        Ok(())
    }

    /// Add batches and re-sort the whole pending sequence, then persist
    pub async fn enqueue(&self, batches: Vec<Batch>) -> StateResponse<()> {
        debug!(count = batches.len(), "PriorityQueue::enqueue: called");
        if batches.is_empty() {
            debug!("PriorityQueue::enqueue: nothing to add");
            return Ok(());
        }

        let mut inner = self.inner.lock().await;
        inner.pending.extend(batches);
        // sort_by is stable, so equal keys keep insertion order
        inner.pending.sort_by(dispatch_order);

        self.state.save_queue(inner.snapshot()).await?;
        debug!(pending = inner.pending.len(), "PriorityQueue::enqueue: persisted");
        Ok(())
    }

    /// Take the head batch if the dispatch interval has elapsed
    pub async fn try_dequeue(&self) -> StateResponse<Option<Batch>> {
        self.try_dequeue_at(now_ms()).await
    }

    /// [`try_dequeue`](Self::try_dequeue) with an explicit clock (Unix milliseconds)
    pub async fn try_dequeue_at(&self, now: i64) -> StateResponse<Option<Batch>> {
        let mut inner = self.inner.lock().await;

        if inner.pending.is_empty() {
            return Ok(None);
        }

        let elapsed = elapsed_ms(now, inner.last_dispatched_at);
        if inner.last_dispatched_at > 0 && elapsed < self.config.dispatch_interval_ms {
            debug!(elapsed, "PriorityQueue::try_dequeue: rate limited");
            return Ok(None);
        }

        let batch = inner.pending.remove(0);
        inner.last_dispatched_at = now;
        self.state.save_queue(inner.snapshot()).await?;

        debug!(batch_id = %batch.batch_id, priority = %batch.priority, remaining = inner.pending.len(), "PriorityQueue::try_dequeue: dequeued");
        Ok(Some(batch))
    }

    /// Time until the next dequeue is allowed, zero if it is allowed now
    pub async fn retry_after(&self) -> Duration {
        let inner = self.inner.lock().await;
        if inner.last_dispatched_at == 0 {
            return Duration::ZERO;
        }
        let elapsed = elapsed_ms(now_ms(), inner.last_dispatched_at);
        self.config.dispatch_interval().saturating_sub(Duration::from_millis(elapsed))
    }

    /// Check if there are no pending batches (in-flight batches are not counted)
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.pending.is_empty()
    }

    /// Copy of the pending sequence in dispatch order
    pub async fn pending(&self) -> Vec<Batch> {
        self.inner.lock().await.pending.clone()
    }

    /// Last successful dispatch (Unix milliseconds, 0 = never)
    pub async fn last_dispatched_at(&self) -> i64 {
        self.inner.lock().await.last_dispatched_at
    }

    /// Consistent copy of the full queue state
    pub async fn snapshot(&self) -> QueueSnapshot {
        self.inner.lock().await.snapshot()
    }
}

/// Milliseconds from `since` to `now`; a clock that went backwards counts as zero
fn elapsed_ms(now: i64, since: i64) -> u64 {
    u64::try_from(now.saturating_sub(since)).unwrap_or(0)
}
