//! Batching event sink
//!
//! Subscribes to an [`EventBus`], buffers projected rows per destination
//! table, and flushes them through a [`WarehouseWriter`] on size and timer
//! triggers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use spincycle_bus::{EventBus, Subscriber, SubscriberError, SubscriptionId};
use spincycle_events::{AnalyticsEvent, Row, SchemaRegistry, TableSchema};
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::SinkError;
use crate::metrics::{SinkMetrics, SinkMetricsHandle};
use crate::settings::SinkSettings;
use crate::writer::{WarehouseWriter, WriteError};

/// Buffered rows for one destination table
struct TableBuffer {
    schema: Arc<TableSchema>,
    rows: Vec<Row>,
    /// A flush for this table is running; concurrent triggers coalesce
    in_flight: bool,
}

impl TableBuffer {
    fn new(schema: Arc<TableSchema>) -> Self {
        Self {
            schema,
            rows: Vec::new(),
            in_flight: false,
        }
    }
}

/// Shared state mutated by the event-delivery path and the timer path
struct SinkInner {
    writer: Arc<dyn WarehouseWriter>,
    registry: Arc<SchemaRegistry>,
    settings: SinkSettings,
    /// Per-table buffers. The mutex is never held across an await; writes
    /// happen on swapped-out row vectors.
    buffers: Mutex<HashMap<String, TableBuffer>>,
    /// Cleared on stop so late deliveries from in-flight publishes are
    /// rejected
    accepting: AtomicBool,
    /// Notified each time a per-table flush finishes; `stop()` waits on this
    /// so a flush running on another task completes before the final drain
    flush_done: Notify,
    metrics: Arc<SinkMetrics>,
}

impl SinkInner {
    fn lock_buffers(&self) -> MutexGuard<'_, HashMap<String, TableBuffer>> {
        self.buffers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Project and buffer one event; flush its table when the threshold is
    /// reached. Awaited by the bus delivery path.
    async fn ingest(&self, event: &AnalyticsEvent) {
        if !self.accepting.load(Ordering::Acquire) {
            return;
        }

        let Some(descriptor) = self.registry.descriptor(event.category()) else {
            self.metrics.record_unroutable();
            tracing::warn!(
                category = event.category(),
                event_id = %event.event_id(),
                "no table mapping for category, dropping event"
            );
            return;
        };

        let row = descriptor.project(event);
        let table = descriptor.table().name().to_owned();

        let should_flush = {
            let mut buffers = self.lock_buffers();
            let buffer = buffers
                .entry(table.clone())
                .or_insert_with(|| TableBuffer::new(Arc::clone(descriptor.table())));
            buffer.rows.push(row);
            self.metrics.record_event_received();
            buffer.rows.len() >= self.settings.flush_threshold()
        };

        if should_flush {
            self.flush_table(&table).await;
        }
    }

    /// Flush one table's buffer.
    ///
    /// Skips silently when the table has no buffered rows or a flush is
    /// already in flight (rows appended meanwhile are captured by the next
    /// trigger). On failure the batch is spliced back in front of anything
    /// buffered since, preserving publish order for the retry.
    async fn flush_table(&self, table: &str) {
        let (schema, rows) = {
            let mut buffers = self.lock_buffers();
            let Some(buffer) = buffers.get_mut(table) else {
                return;
            };
            if buffer.in_flight || buffer.rows.is_empty() {
                return;
            }
            buffer.in_flight = true;
            (Arc::clone(&buffer.schema), std::mem::take(&mut buffer.rows))
        };

        self.metrics.record_flush();
        let count = rows.len();

        match self.write_with_retry(&schema, &rows).await {
            Ok(()) => {
                let mut buffers = self.lock_buffers();
                if let Some(buffer) = buffers.get_mut(table) {
                    buffer.in_flight = false;
                }
                drop(buffers);
                self.metrics.record_batch_written(count as u64);
                tracing::debug!(table, rows = count, "flushed batch");
            }
            Err(error) => {
                let mut buffers = self.lock_buffers();
                if let Some(buffer) = buffers.get_mut(table) {
                    buffer.in_flight = false;
                    let newer = std::mem::take(&mut buffer.rows);
                    buffer.rows = rows;
                    buffer.rows.extend(newer);
                }
                drop(buffers);
                self.metrics.record_write_error();
                tracing::warn!(table, rows = count, %error, "write failed, batch retained for retry");
            }
        }
        self.flush_done.notify_waiters();
    }

    /// One write with the configured in-call retry policy
    async fn write_with_retry(
        &self,
        schema: &TableSchema,
        rows: &[Row],
    ) -> Result<(), WriteError> {
        let retry = &self.settings.retry;
        let mut delay = retry.base_delay;
        let mut attempt = 0;

        loop {
            match self.writer.write_batch(schema, rows).await {
                Ok(()) => return Ok(()),
                Err(error) if attempt < retry.attempts => {
                    attempt += 1;
                    self.metrics.record_retry();
                    tracing::warn!(
                        table = schema.name(),
                        attempt,
                        max_attempts = retry.attempts,
                        delay_ms = delay.as_millis() as u64,
                        %error,
                        "write failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(retry.max_delay);
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// Flush every table with buffered rows, concurrently. Per-table
    /// failures are independent; errors never propagate.
    async fn flush_all(&self) {
        let tables: Vec<String> = {
            let buffers = self.lock_buffers();
            buffers
                .iter()
                .filter(|(_, b)| !b.rows.is_empty() && !b.in_flight)
                .map(|(table, _)| table.clone())
                .collect()
        };

        futures::future::join_all(tables.iter().map(|table| self.flush_table(table))).await;
    }

    fn has_in_flight(&self) -> bool {
        self.lock_buffers().values().any(|b| b.in_flight)
    }

    /// Wait until no table has a flush in flight.
    ///
    /// The waiter is registered before the flags are checked, so a flush
    /// finishing between the check and the await cannot be missed.
    async fn await_in_flight(&self) {
        loop {
            let done = self.flush_done.notified();
            tokio::pin!(done);
            done.as_mut().enable();
            if !self.has_in_flight() {
                return;
            }
            done.await;
        }
    }

    fn buffered_rows(&self) -> usize {
        self.lock_buffers().values().map(|b| b.rows.len()).sum()
    }
}

/// Bus-facing adapter so the sink's shared state implements [`Subscriber`]
struct SinkSubscriber {
    inner: Arc<SinkInner>,
}

#[async_trait]
impl Subscriber for SinkSubscriber {
    fn id(&self) -> &str {
        "event-sink"
    }

    async fn on_event(&self, event: &AnalyticsEvent) -> Result<(), SubscriberError> {
        // Unroutable events and write failures are absorbed here; the
        // producer's publish path never sees them.
        self.inner.ingest(event).await;
        Ok(())
    }
}

/// Periodic flush task plus its shutdown signal
struct TimerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

enum Lifecycle {
    Idle,
    Running {
        subscription: SubscriptionId,
        timer: Option<TimerHandle>,
    },
    Stopped,
}

impl Lifecycle {
    fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running { .. } => "running",
            Self::Stopped => "stopped",
        }
    }
}

/// Batching sink from an [`EventBus`] into a [`WarehouseWriter`]
///
/// One explicit instance per pipeline, constructed with its dependencies:
/// multiple independent sinks can run in one process. Lifecycle is
/// `idle → running → stopped`; `stopped` is terminal.
pub struct EventSink {
    bus: Arc<EventBus>,
    inner: Arc<SinkInner>,
    lifecycle: Mutex<Lifecycle>,
}

impl EventSink {
    /// Create a sink; call [`EventSink::start`] to begin consuming
    pub fn new(
        bus: Arc<EventBus>,
        writer: Arc<dyn WarehouseWriter>,
        registry: Arc<SchemaRegistry>,
        settings: SinkSettings,
    ) -> Self {
        Self {
            bus,
            inner: Arc::new(SinkInner {
                writer,
                registry,
                settings,
                buffers: Mutex::new(HashMap::new()),
                accepting: AtomicBool::new(false),
                flush_done: Notify::new(),
                metrics: Arc::new(SinkMetrics::default()),
            }),
            lifecycle: Mutex::new(Lifecycle::Idle),
        }
    }

    /// Subscribe to the bus and arm the periodic flush timer.
    ///
    /// Must be called from within a tokio runtime. Fails with
    /// [`SinkError::IllegalState`] when already running or stopped.
    pub fn start(&self) -> Result<(), SinkError> {
        let mut lifecycle = self.lock_lifecycle();
        if !matches!(*lifecycle, Lifecycle::Idle) {
            return Err(SinkError::IllegalState {
                operation: "start",
                state: lifecycle.name(),
            });
        }

        self.inner.accepting.store(true, Ordering::Release);
        let subscription = self.bus.subscribe(Arc::new(SinkSubscriber {
            inner: Arc::clone(&self.inner),
        }));

        let timer = (self.inner.settings.flush_interval > Duration::ZERO)
            .then(|| self.spawn_timer(self.inner.settings.flush_interval));

        *lifecycle = Lifecycle::Running {
            subscription,
            timer,
        };
        tracing::info!(
            batch_size = self.inner.settings.max_batch_size,
            flush_interval_ms = self.inner.settings.flush_interval.as_millis() as u64,
            "event sink started"
        );
        Ok(())
    }

    /// Flush every non-empty table buffer now.
    ///
    /// Errors are logged and counted, never returned; failed tables keep
    /// their rows for the next trigger.
    pub async fn flush(&self) {
        self.inner.flush_all().await;
    }

    /// Unsubscribe, stop the timer, and drain the buffers with one final
    /// best-effort flush.
    ///
    /// The timer task and any flush already in flight on another task are
    /// awaited before the final flush, so no write races teardown and rows
    /// retained by a failing in-flight write are drained too. Final-flush
    /// failures are logged, never returned.
    pub async fn stop(&self) -> Result<(), SinkError> {
        let (subscription, timer) = {
            let mut lifecycle = self.lock_lifecycle();
            match std::mem::replace(&mut *lifecycle, Lifecycle::Stopped) {
                Lifecycle::Running {
                    subscription,
                    timer,
                } => (subscription, timer),
                other => {
                    let state = other.name();
                    *lifecycle = other;
                    return Err(SinkError::IllegalState {
                        operation: "stop",
                        state,
                    });
                }
            }
        };

        self.inner.accepting.store(false, Ordering::Release);
        self.bus.unsubscribe(subscription);

        if let Some(TimerHandle { shutdown, task }) = timer {
            let _ = shutdown.send(true);
            let _ = task.await;
        }

        self.inner.await_in_flight().await;
        self.inner.flush_all().await;
        tracing::info!(
            remaining_rows = self.inner.buffered_rows(),
            "event sink stopped"
        );
        Ok(())
    }

    /// Rows currently buffered across all tables
    pub fn buffered_rows(&self) -> usize {
        self.inner.buffered_rows()
    }

    /// Detachable metrics handle, valid after `stop()`
    pub fn metrics_handle(&self) -> SinkMetricsHandle {
        SinkMetricsHandle::new(Arc::clone(&self.inner.metrics))
    }

    fn spawn_timer(&self, interval: Duration) -> TimerHandle {
        let inner = Arc::clone(&self.inner);
        let (shutdown, mut signal) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => inner.flush_all().await,
                    _ = signal.changed() => break,
                }
            }
        });

        TimerHandle { shutdown, task }
    }

    fn lock_lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
