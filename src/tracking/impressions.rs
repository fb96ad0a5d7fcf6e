//! Impression Batcher
//!
//! Collects impressions into a deduplicated pending set and flushes it as a
//! single store call once no new impression has arrived for the debounce
//! delay. Every `record` re-arms the timer, so a steady stream of impressions
//! less than one delay apart keeps deferring the flush.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::store::AdStore;
use crate::tasks::spawn_debounce_timer;
use crate::tracking::{TrackerState, DEFAULT_DEBOUNCE};

// == Batch Stats ==
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    /// Batches delivered to the store
    pub flushes: u64,
    /// Ad ids carried by delivered batches
    pub ids_flushed: u64,
    /// Batches the store rejected
    pub failed_flushes: u64,
    /// Ad ids lost with rejected batches
    pub dropped_ids: u64,
}

// == Pending Set ==
/// Pending ids and the timer that will flush them. Guarded as one unit.
#[derive(Debug, Default)]
struct PendingImpressions {
    /// Distinct ids in first-seen order
    ids: Vec<String>,
    timer: Option<JoinHandle<()>>,
    /// Identifies the live timer; a superseded timer that still wakes up
    /// sees a newer generation and does nothing.
    generation: u64,
}

impl PendingImpressions {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.generation += 1;
    }
}

struct BatcherInner {
    store: Arc<dyn AdStore>,
    delay: Duration,
    pending: Mutex<PendingImpressions>,
    in_flight: AtomicUsize,
    stats: Mutex<BatchStats>,
}

impl BatcherInner {
    /// Timer callback: swap out the pending set and send it.
    async fn fire(&self, generation: u64) {
        let batch = {
            let mut pending = self.pending.lock().await;
            if pending.generation != generation {
                return;
            }
            pending.timer = None;
            self.take_batch(&mut pending)
        };

        if batch.is_empty() {
            return;
        }
        // Best effort; failures are logged and counted in send
        let _ = self.send(batch).await;
    }

    /// Swaps the pending ids out. A non-empty batch is counted as in flight
    /// before the pending lock is released.
    fn take_batch(&self, pending: &mut PendingImpressions) -> Vec<String> {
        let batch = std::mem::take(&mut pending.ids);
        if !batch.is_empty() {
            self.in_flight.fetch_add(1, Ordering::SeqCst);
        }
        batch
    }

    async fn send(&self, batch: Vec<String>) -> Result<usize> {
        let count = batch.len();
        debug!("Flushing impression batch: {:?}", batch);

        let result = self.store.increment_impressions(&batch).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let mut stats = self.stats.lock().await;
        match result {
            Ok(()) => {
                stats.flushes += 1;
                stats.ids_flushed += count as u64;
                info!("Batch impressions tracked for {} ads", count);
                Ok(count)
            }
            Err(err) => {
                stats.failed_flushes += 1;
                stats.dropped_ids += count as u64;
                warn!("Dropping impression batch of {} ads: {}", count, err);
                Err(err)
            }
        }
    }
}

// == Impression Batcher ==
/// Debounced, deduplicating impression counter. Cheap to clone; clones share
/// one pending set.
#[derive(Clone)]
pub struct ImpressionBatcher {
    inner: Arc<BatcherInner>,
}

impl ImpressionBatcher {
    // == Constructor ==
    pub fn new(store: Arc<dyn AdStore>, delay: Duration) -> Self {
        Self {
            inner: Arc::new(BatcherInner {
                store,
                delay,
                pending: Mutex::new(PendingImpressions::default()),
                in_flight: AtomicUsize::new(0),
                stats: Mutex::new(BatchStats::default()),
            }),
        }
    }

    /// Creates a batcher with the default two second debounce.
    pub fn with_default_delay(store: Arc<dyn AdStore>) -> Self {
        Self::new(store, DEFAULT_DEBOUNCE)
    }

    // == Record ==
    /// Queues one impression of `ad_id` and restarts the debounce window.
    ///
    /// An id already pending in the current window is not added twice.
    pub async fn record(&self, ad_id: impl Into<String>) {
        let ad_id = ad_id.into();
        let mut pending = self.inner.pending.lock().await;

        if !pending.ids.contains(&ad_id) {
            pending.ids.push(ad_id);
        }

        pending.cancel_timer();
        let generation = pending.generation;
        let inner = Arc::clone(&self.inner);
        pending.timer = Some(spawn_debounce_timer(self.inner.delay, move || async move {
            inner.fire(generation).await;
        }));
    }

    // == Flush Now ==
    /// Cancels the timer and sends whatever is pending immediately.
    ///
    /// Returns the number of ids sent; an empty pending set sends nothing.
    pub async fn flush_now(&self) -> Result<usize> {
        let batch = {
            let mut pending = self.inner.pending.lock().await;
            pending.cancel_timer();
            self.inner.take_batch(&mut pending)
        };

        if batch.is_empty() {
            return Ok(0);
        }
        self.inner.send(batch).await
    }

    // == Introspection ==
    /// Ids waiting for the next flush, in first-seen order.
    pub async fn pending_ids(&self) -> Vec<String> {
        self.inner.pending.lock().await.ids.clone()
    }

    /// Pending wins over in-flight: a fresh batch may be collecting while an
    /// older one is still being sent.
    pub async fn state(&self) -> TrackerState {
        let has_pending = !self.inner.pending.lock().await.ids.is_empty();
        if has_pending {
            TrackerState::Pending
        } else if self.inner.in_flight.load(Ordering::SeqCst) > 0 {
            TrackerState::InFlight
        } else {
            TrackerState::Idle
        }
    }

    pub async fn stats(&self) -> BatchStats {
        self.inner.stats.lock().await.clone()
    }
}
