//! Background loop that sends registered sources when their period elapses.

use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use futures::future::join_all;
use once_cell::sync::Lazy;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace};

use crate::dispatch::source::{is_due, unix_now, DispatchSource};
use crate::error::{LibratoError, LibratoResult};

/// How often the loop checks registered sources.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub tick_interval: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

impl DispatcherConfig {
    /// Sets how often registered sources are checked.
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }
}

type Registry = Arc<RwLock<Vec<Arc<dyn DispatchSource>>>>;

static GLOBAL: Lazy<Dispatcher> = Lazy::new(|| Dispatcher::new(DispatcherConfig::default()));

/// Registry of sources plus the loop that polls them.
///
/// The loop is started lazily by the first [`register`](Self::register) on the
/// tokio runtime current at that point, and restarted if that runtime has
/// shut down. Each due source is sent on its own task so a slow send never
/// delays the others. Sources are never unregistered.
pub struct Dispatcher {
    config: DispatcherConfig,
    sources: Registry,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("sources", &self.len())
            .field("running", &self.is_running())
            .finish()
    }
}

impl Dispatcher {
    /// Creates a dispatcher whose loop starts on first registration.
    pub fn new(config: DispatcherConfig) -> Self {
        Self {
            config,
            sources: Arc::new(RwLock::new(Vec::new())),
            worker: Mutex::new(None),
        }
    }

    /// The process-wide dispatcher used by `register()` on buffers and collectors.
    pub fn global() -> &'static Dispatcher {
        &GLOBAL
    }

    /// Get the configuration.
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Adds a source and makes sure the loop is running.
    ///
    /// Fails with a configuration error when called outside a tokio runtime.
    pub fn register(&self, source: Arc<dyn DispatchSource>) -> LibratoResult<()> {
        self.ensure_running()?;
        let mut sources = self.sources.write().unwrap_or_else(PoisonError::into_inner);
        sources.push(source);
        debug!(registered = sources.len(), "Source registered");
        Ok(())
    }

    /// Number of registered sources.
    pub fn len(&self) -> usize {
        self.sources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if no source is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true while the tick loop task is alive.
    pub fn is_running(&self) -> bool {
        self.worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Sends every registered source now, regardless of period.
    ///
    /// Intended for shutdown paths. Returns the errors of all sources combined.
    pub async fn flush_all(&self) -> Vec<LibratoError> {
        let sources = snapshot(&self.sources);
        info!(sources = sources.len(), "Flushing all sources");
        join_all(sources.iter().map(|source| source.send()))
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    fn ensure_running(&self) -> LibratoResult<()> {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        if worker.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return Ok(());
        }

        let runtime = Handle::try_current().map_err(|e| {
            LibratoError::configuration(format!(
                "Background dispatch requires a tokio runtime: {e}"
            ))
        })?;

        *worker = Some(runtime.spawn(run_loop(
            self.sources.clone(),
            self.config.tick_interval,
        )));
        info!(tick_interval = ?self.config.tick_interval, "Dispatcher started");
        Ok(())
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        let worker = self.worker.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = worker.take() {
            handle.abort();
        }
    }
}

fn snapshot(sources: &Registry) -> Vec<Arc<dyn DispatchSource>> {
    sources
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

async fn run_loop(sources: Registry, tick_interval: Duration) {
    let mut interval = tokio::time::interval(tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // the first tick completes immediately
    interval.tick().await;

    loop {
        interval.tick().await;
        dispatch_due(&sources, unix_now());
    }
}

/// Spawns a send for every source due at `now`. Returns how many were spawned.
fn dispatch_due(sources: &Registry, now: i64) -> usize {
    let mut dispatched = 0;
    for source in snapshot(sources) {
        if !is_due(source.period(), source.last_send_time(), now) {
            continue;
        }
        dispatched += 1;
        tokio::spawn(async move {
            let errors = source.send().await;
            if !errors.is_empty() {
                debug!(count = errors.len(), "Scheduled send reported errors");
            }
        });
    }
    trace!(dispatched, "Dispatch tick");
    dispatched
}
