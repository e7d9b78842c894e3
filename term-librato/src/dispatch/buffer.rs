//! Push-style source: callers add measurements, sends drain the queue.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::api::LibratoClient;
use crate::dispatch::scheduler::Dispatcher;
use crate::dispatch::source::{report, unix_now, DispatchSource, ErrorHandler, SendClock};
use crate::error::{LibratoError, LibratoResult};
use crate::model::Measurement;

/// Queue of measurements flushed on a period or when it reaches a size limit.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use term_librato::prelude::*;
///
/// # async fn example() -> LibratoResult<()> {
/// let client = LibratoClient::new(LibratoConfig::from_env())?;
/// let buffer = MetricsBuffer::new(client, Duration::from_secs(60), 500)
///     .with_error_handler(|errors| eprintln!("metrics rejected: {errors:?}"))
///     .register()?;
///
/// buffer.add([Gauge::new("app:queue_depth", 17)]).await?;
/// # Ok(())
/// # }
/// ```
pub struct MetricsBuffer {
    client: LibratoClient,
    period: Duration,
    max_queue_size: usize,
    queue: Mutex<Vec<Measurement>>,
    last_send: SendClock,
    error_handler: Option<ErrorHandler>,
}

impl std::fmt::Debug for MetricsBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsBuffer")
            .field("period", &self.period)
            .field("max_queue_size", &self.max_queue_size)
            .field("last_send", &self.last_send.get())
            .field("has_error_handler", &self.error_handler.is_some())
            .finish_non_exhaustive()
    }
}

impl MetricsBuffer {
    /// Creates an unregistered buffer.
    ///
    /// A `max_queue_size` of zero flushes on every add.
    pub fn new(client: LibratoClient, period: Duration, max_queue_size: usize) -> Self {
        Self {
            client,
            period,
            max_queue_size,
            queue: Mutex::new(Vec::new()),
            last_send: SendClock::new(),
            error_handler: None,
        }
    }

    /// Receives errors from sends triggered by the scheduler or by a full queue.
    pub fn with_error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&[LibratoError]) + Send + Sync + 'static,
    {
        self.error_handler = Some(Arc::new(handler));
        self
    }

    /// Registers with the process-wide [`Dispatcher`].
    ///
    /// When background scheduling is disabled in the client configuration the
    /// buffer is returned unregistered and only flushes on size or explicit
    /// [`send`](Self::send).
    pub fn register(self) -> LibratoResult<Arc<Self>> {
        self.register_with(Dispatcher::global())
    }

    /// Registers with a specific dispatcher.
    pub fn register_with(self, dispatcher: &Dispatcher) -> LibratoResult<Arc<Self>> {
        let scheduled = self.client.config().background_scheduling();
        let buffer = Arc::new(self);
        if scheduled {
            dispatcher.register(buffer.clone())?;
        }
        Ok(buffer)
    }

    /// Get the scheduled send interval.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Get the queue length that triggers an immediate send.
    pub fn max_queue_size(&self) -> usize {
        self.max_queue_size
    }

    /// Epoch seconds of the last drained send, `None` if never sent.
    pub fn last_send_time(&self) -> Option<i64> {
        self.last_send.get()
    }

    /// Number of queued measurements.
    pub async fn len(&self) -> usize {
        self.queue.lock().await.len()
    }

    /// Returns true if nothing is queued.
    pub async fn is_empty(&self) -> bool {
        self.queue.lock().await.is_empty()
    }

    /// Appends a batch after validating every element.
    ///
    /// The first invalid measurement rejects the whole batch and nothing is
    /// queued. Reaching `max_queue_size` triggers a send before returning;
    /// errors from that send go to the error handler.
    pub async fn add<I, M>(&self, measurements: I) -> LibratoResult<()>
    where
        I: IntoIterator<Item = M>,
        M: Into<Measurement>,
    {
        let measurements: Vec<Measurement> = measurements.into_iter().map(Into::into).collect();
        for measurement in &measurements {
            measurement.validate()?;
        }

        let full = {
            let mut queue = self.queue.lock().await;
            queue.extend(measurements);
            queue.len() >= self.max_queue_size
        };

        if full {
            debug!(max_queue_size = self.max_queue_size, "Queue full, flushing");
            self.send().await;
        }
        Ok(())
    }

    /// Appends a single measurement.
    pub async fn push(&self, measurement: impl Into<Measurement>) -> LibratoResult<()> {
        self.add([measurement.into()]).await
    }

    /// Drains the queue and posts its contents.
    ///
    /// The queue is swapped out under the lock so concurrent adds land in the
    /// next batch. Without credentials nothing is drained and
    /// [`LibratoError::MissingCredentials`] is returned.
    #[instrument(skip(self), fields(period = ?self.period))]
    pub async fn send(&self) -> Vec<LibratoError> {
        if !self.client.config().has_credentials() {
            return vec![LibratoError::MissingCredentials];
        }

        let now = unix_now();
        let batch = {
            let mut queue = self.queue.lock().await;
            if queue.is_empty() {
                return Vec::new();
            }
            self.last_send.stamp(now);
            std::mem::take(&mut *queue)
        };

        debug!(count = batch.len(), "Flushing buffer");
        let errors = self.client.post_measurements(batch, now).await;
        report(self.error_handler.as_ref(), &errors);
        errors
    }
}

#[async_trait]
impl DispatchSource for MetricsBuffer {
    fn period(&self) -> Duration {
        self.period
    }

    fn last_send_time(&self) -> Option<i64> {
        self.last_send.get()
    }

    async fn send(&self) -> Vec<LibratoError> {
        MetricsBuffer::send(self).await
    }
}
