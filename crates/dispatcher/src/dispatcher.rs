//! BufferedDispatcher - batch rotation, flush policy, and the drain task

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, trace, warn};

use contracts::{DispatcherConfig, RecordSink, SinkRecord};

use crate::batch::{BatchSlots, Entry};
use crate::metrics::{DispatcherMetrics, MetricsSnapshot};

/// State shared between producers and the drain task.
struct Shared<T> {
    /// Both batch slots behind one lock; held only for structural
    /// mutations, never across sink I/O
    slots: Mutex<BatchSlots<T>>,
    /// Signals the drain task that the draining slot is non-empty
    wakeup: Notify,
    /// Set once by shutdown
    stopping: AtomicBool,
    metrics: DispatcherMetrics,
}

/// Buffered record dispatcher.
///
/// Accepts records from any number of producer threads via the
/// non-blocking [`push`](Self::push), accumulates them in an active batch,
/// and hands full or stale batches to a single background drain task that
/// forwards every entry, in arrival order, to the injected
/// [`RecordSink`].
///
/// One dispatcher owns exactly one drain task and one sink for its whole
/// lifetime. Producers are never exposed to sink errors or sink latency.
pub struct BufferedDispatcher<T> {
    config: DispatcherConfig,
    shared: Arc<Shared<T>>,
    /// Taken by the first shutdown call
    worker_handle: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Send + 'static> BufferedDispatcher<T> {
    /// Create the dispatcher and spawn its drain task.
    ///
    /// Must be called from within a tokio runtime. The sink is moved into
    /// the drain task and owned by it until [`shutdown`](Self::shutdown).
    #[instrument(
        name = "dispatcher_spawn",
        skip(config, sink),
        fields(channel = %config.channel, name = %config.name, sink = sink.name())
    )]
    pub fn spawn<S>(config: DispatcherConfig, sink: S) -> Self
    where
        S: RecordSink<T> + Send + 'static,
    {
        let shared = Arc::new(Shared {
            slots: Mutex::new(BatchSlots::new()),
            wakeup: Notify::new(),
            stopping: AtomicBool::new(false),
            metrics: DispatcherMetrics::new(),
        });

        let worker_shared = Arc::clone(&shared);
        let worker_config = config.clone();
        let worker_handle = tokio::spawn(async move {
            drain_task(worker_shared, worker_config, sink).await;
        });

        debug!("dispatcher started");

        Self {
            config,
            shared,
            worker_handle: Mutex::new(Some(worker_handle)),
        }
    }

    /// Dispatcher configuration.
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Current metrics.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.shared.metrics.snapshot()
    }

    /// Buffer one record, never blocking on I/O.
    ///
    /// Captures the arrival time, then under the lock evaluates the flush
    /// policy against the active batch: at/over `max_batch_size`, or oldest
    /// entry older than `max_batch_age`. If either holds, the active batch
    /// is handed off to the draining slot and the drain task is woken,
    /// before the new record is appended to a fresh active batch.
    ///
    /// Staleness is only ever evaluated here: a dispatcher whose producers
    /// go silent keeps an under-size batch buffered until the next push or
    /// an explicit [`flush`](Self::flush).
    pub fn push(&self, record: T) {
        let now = Utc::now();
        let rotated = {
            let mut slots = self.shared.slots.lock().unwrap();

            let rotated = if slots.should_rotate(
                now,
                self.config.max_batch_age,
                self.config.max_batch_size,
            ) {
                let moved = slots.rotate();
                self.shared.metrics.inc_rotation_count();
                warn!(
                    channel = %self.config.channel,
                    name = %self.config.name,
                    moved,
                    "active batch full or stale, rotated"
                );
                true
            } else {
                false
            };

            slots.push(Entry {
                arrived: now,
                record,
            });
            self.shared.metrics.inc_pushed_count();
            self.shared.metrics.set_buffered_depth(slots.depth());
            rotated
        };

        if rotated {
            self.shared.wakeup.notify_one();
        }
    }

    /// Hand off the active batch regardless of size or age.
    ///
    /// No-op when the active batch is empty: no hand-off, no wakeup, zero
    /// sink invocations.
    pub fn flush(&self) {
        {
            let mut slots = self.shared.slots.lock().unwrap();
            if slots.active_is_empty() {
                return;
            }
            let moved = slots.rotate();
            self.shared.metrics.inc_forced_flush_count();
            trace!(
                channel = %self.config.channel,
                name = %self.config.name,
                moved,
                "forced flush"
            );
        }
        self.shared.wakeup.notify_one();
    }

    /// Stop the drain task gracefully. Idempotent.
    ///
    /// The drain task forwards whatever is already in the draining slot,
    /// then flushes and closes the sink and exits. Records still in the
    /// ACTIVE batch are dropped; call [`flush`](Self::flush) first to keep
    /// them.
    #[instrument(
        name = "dispatcher_shutdown",
        skip(self),
        fields(channel = %self.config.channel, name = %self.config.name)
    )]
    pub async fn shutdown(&self) {
        let handle = self.worker_handle.lock().unwrap().take();
        let Some(handle) = handle else {
            return;
        };

        self.shared.stopping.store(true, Ordering::SeqCst);
        self.shared.wakeup.notify_one();

        if let Err(e) = handle.await {
            error!(error = ?e, "drain task panicked");
        }

        let lost = {
            let mut slots = self.shared.slots.lock().unwrap();
            let lost = slots.depth();
            // Clear so depth reporting matches reality after stop
            slots.rotate();
            slots.take_draining();
            self.shared.metrics.set_buffered_depth(0);
            lost
        };
        if lost > 0 {
            self.shared.metrics.add_discarded_count(lost as u64);
            warn!(lost, "records still buffered at shutdown were dropped");
        }

        debug!("dispatcher shutdown complete");
    }
}

/// Background loop that forwards handed-off batches to the sink.
#[instrument(
    name = "drain_task_loop",
    skip(shared, config, sink),
    fields(channel = %config.channel, name = %config.name, sink = sink.name())
)]
async fn drain_task<T, S>(shared: Arc<Shared<T>>, config: DispatcherConfig, mut sink: S)
where
    T: Send + 'static,
    S: RecordSink<T> + Send + 'static,
{
    debug!("drain task started");

    loop {
        let batch = {
            let mut slots = shared.slots.lock().unwrap();
            let batch = slots.take_draining();
            shared.metrics.set_buffered_depth(slots.depth());
            batch
        };

        if batch.is_empty() {
            if shared.stopping.load(Ordering::SeqCst) {
                break;
            }
            // Notify keeps a permit, so a rotation racing this await is
            // not lost
            shared.wakeup.notified().await;
            continue;
        }

        forward_batch(&shared, &config, &mut sink, batch).await;
    }

    if let Err(e) = sink.flush().await {
        error!(sink = sink.name(), error = %e, "flush failed on shutdown");
    }
    if let Err(e) = sink.close().await {
        error!(sink = sink.name(), error = %e, "close failed on shutdown");
    }

    debug!("drain task stopped");
}

/// Forward one taken batch, in arrival order, outside the lock.
async fn forward_batch<T, S>(
    shared: &Shared<T>,
    config: &DispatcherConfig,
    sink: &mut S,
    batch: Vec<Entry<T>>,
) where
    T: Send + 'static,
    S: RecordSink<T> + Send + 'static,
{
    let count = batch.len();

    for entry in batch {
        let record = SinkRecord {
            timestamp: entry.arrived,
            channel: config.channel.clone(),
            level: config.level,
            source: Arc::clone(&config.name),
            record: entry.record,
        };

        match sink.write(&record).await {
            Ok(()) => {
                shared.metrics.inc_forwarded_count();
            }
            Err(e) => {
                shared.metrics.inc_failure_count();
                error!(
                    sink = sink.name(),
                    channel = %config.channel,
                    error = %e,
                    "write failed"
                );
                // Continue processing - no poison-pill entry blocks the queue
            }
        }
    }

    trace!(count, "batch drained");
}
