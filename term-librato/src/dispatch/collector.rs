//! Pull-style source: measurements are produced on demand at send time.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::api::LibratoClient;
use crate::dispatch::scheduler::Dispatcher;
use crate::dispatch::source::{report, unix_now, DispatchSource, ErrorHandler, SendClock};
use crate::error::{LibratoError, LibratoResult};
use crate::model::{validate_all, Measurement};

type PullFn = Box<dyn Fn() -> Vec<Measurement> + Send + Sync>;

/// Samples a pull function on every send instead of buffering.
pub struct Collector {
    client: LibratoClient,
    period: Duration,
    pull: PullFn,
    last_send: SendClock,
    error_handler: Option<ErrorHandler>,
}

impl std::fmt::Debug for Collector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collector")
            .field("period", &self.period)
            .field("last_send", &self.last_send.get())
            .field("has_error_handler", &self.error_handler.is_some())
            .finish_non_exhaustive()
    }
}

impl Collector {
    /// Creates an unregistered collector sampling `pull` on every send.
    pub fn new<F>(client: LibratoClient, period: Duration, pull: F) -> Self
    where
        F: Fn() -> Vec<Measurement> + Send + Sync + 'static,
    {
        Self {
            client,
            period,
            pull: Box::new(pull),
            last_send: SendClock::new(),
            error_handler: None,
        }
    }

    /// Receives errors from scheduled sends, including validation failures
    /// of pulled batches.
    pub fn with_error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&[LibratoError]) + Send + Sync + 'static,
    {
        self.error_handler = Some(Arc::new(handler));
        self
    }

    /// Registers with the process-wide [`Dispatcher`], unless background
    /// scheduling is disabled.
    pub fn register(self) -> LibratoResult<Arc<Self>> {
        self.register_with(Dispatcher::global())
    }

    /// Registers with a specific dispatcher.
    pub fn register_with(self, dispatcher: &Dispatcher) -> LibratoResult<Arc<Self>> {
        let scheduled = self.client.config().background_scheduling();
        let collector = Arc::new(self);
        if scheduled {
            dispatcher.register(collector.clone())?;
        }
        Ok(collector)
    }

    /// Get the scheduled send interval.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Epoch seconds of the last posted batch, `None` if never sent.
    pub fn last_send_time(&self) -> Option<i64> {
        self.last_send.get()
    }

    /// Pulls, validates and posts one batch.
    ///
    /// An empty pull sends nothing. If any pulled measurement is invalid the
    /// whole batch is dropped and every validation error is reported.
    #[instrument(skip(self), fields(period = ?self.period))]
    pub async fn send(&self) -> Vec<LibratoError> {
        if !self.client.config().has_credentials() {
            return vec![LibratoError::MissingCredentials];
        }

        let measurements = (self.pull)();
        if measurements.is_empty() {
            return Vec::new();
        }

        let errors = validate_all(&measurements);
        if !errors.is_empty() {
            debug!(invalid = errors.len(), "Dropping pulled batch");
            report(self.error_handler.as_ref(), &errors);
            return errors;
        }

        let now = unix_now();
        self.last_send.stamp(now);

        let errors = self.client.post_measurements(measurements, now).await;
        report(self.error_handler.as_ref(), &errors);
        errors
    }
}

#[async_trait]
impl DispatchSource for Collector {
    fn period(&self) -> Duration {
        self.period
    }

    fn last_send_time(&self) -> Option<i64> {
        self.last_send.get()
    }

    async fn send(&self) -> Vec<LibratoError> {
        Collector::send(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Counter, Gauge};
    use crate::test_utils::{sample_measurements, test_config, ErrorSink, RecordingTransport};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn client_with(transport: &Arc<RecordingTransport>) -> LibratoClient {
        LibratoClient::with_transport(test_config(), transport.clone())
    }

    #[tokio::test]
    async fn test_send_posts_pulled_batch() {
        let transport = Arc::new(RecordingTransport::accepting());
        let collector = Collector::new(
            client_with(&transport),
            Duration::from_secs(60),
            sample_measurements,
        );

        assert!(collector.send().await.is_empty());
        assert!(collector.last_send_time().is_some());

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].measurement_names(),
            vec!["test:gauge_1", "test:gauge_2", "test:counter_1"]
        );
    }

    #[tokio::test]
    async fn test_pull_is_called_per_send() {
        let transport = Arc::new(RecordingTransport::accepting());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let collector = Collector::new(client_with(&transport), Duration::ZERO, move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            vec![Counter::new("pulls", n).into()]
        });

        collector.send().await;
        collector.send().await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(transport.request_count(), 2);
        assert_eq!(transport.requests()[1].json_body()["counters"][0]["value"], 1);
    }

    #[tokio::test]
    async fn test_empty_pull_sends_nothing() {
        let transport = Arc::new(RecordingTransport::accepting());
        let collector = Collector::new(client_with(&transport), Duration::ZERO, Vec::new);

        assert!(collector.send().await.is_empty());
        assert_eq!(transport.request_count(), 0);
        assert_eq!(collector.last_send_time(), None);
    }

    #[tokio::test]
    async fn test_invalid_pull_drops_batch() {
        let transport = Arc::new(RecordingTransport::accepting());
        let sink = ErrorSink::new();
        let collector = Collector::new(client_with(&transport), Duration::ZERO, || {
            vec![
                Gauge::new("ok", 1).into(),
                Gauge::new("", 1).into(),
                Counter::new("bad", "x").into(),
            ]
        })
        .with_error_handler(sink.handler());

        let errors = collector.send().await;

        assert_eq!(errors.len(), 2);
        assert_eq!(sink.errors(), errors);
        assert_eq!(transport.request_count(), 0);
        assert_eq!(collector.last_send_time(), None);
    }

    #[tokio::test]
    async fn test_missing_credentials_skips_pull() {
        let transport = Arc::new(RecordingTransport::accepting());
        let client = LibratoClient::with_transport(
            crate::config::LibratoConfig::new("", "token"),
            transport.clone(),
        );
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let collector = Collector::new(client, Duration::ZERO, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            sample_measurements()
        });

        assert_eq!(collector.send().await, vec![LibratoError::MissingCredentials]);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(transport.request_count(), 0);
    }
}
