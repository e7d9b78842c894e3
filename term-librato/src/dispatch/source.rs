use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::LibratoError;

/// Callback receiving errors from sends nobody is awaiting.
pub type ErrorHandler = Arc<dyn Fn(&[LibratoError]) + Send + Sync>;

/// A buffering or pulling entity polled by the [`Dispatcher`](super::Dispatcher).
#[async_trait]
pub trait DispatchSource: Send + Sync + 'static {
    /// Interval between scheduled sends. Zero means every tick.
    fn period(&self) -> Duration;

    /// Epoch seconds of the last send, `None` if never sent.
    fn last_send_time(&self) -> Option<i64>;

    /// Flushes whatever the source holds and returns the resulting errors.
    async fn send(&self) -> Vec<LibratoError>;
}

const NEVER_SENT: i64 = -1;

/// Last-send timestamp shared between the owning source and its send tasks.
#[derive(Debug)]
pub(crate) struct SendClock(AtomicI64);

impl SendClock {
    pub(crate) fn new() -> Self {
        Self(AtomicI64::new(NEVER_SENT))
    }

    pub(crate) fn get(&self) -> Option<i64> {
        match self.0.load(Ordering::Acquire) {
            NEVER_SENT => None,
            secs => Some(secs),
        }
    }

    pub(crate) fn stamp(&self, epoch_secs: i64) {
        self.0.store(epoch_secs, Ordering::Release);
    }
}

pub(crate) fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Decides whether a source should be sent on the tick at `now`.
pub(crate) fn is_due(period: Duration, last_send: Option<i64>, now: i64) -> bool {
    let period = i64::try_from(period.as_secs()).unwrap_or(i64::MAX);
    match last_send {
        None => true,
        Some(_) if period == 0 => true,
        Some(last) => last.saturating_add(period) <= now,
    }
}

pub(crate) fn report(handler: Option<&ErrorHandler>, errors: &[LibratoError]) {
    if errors.is_empty() {
        return;
    }
    match handler {
        Some(handler) => handler(errors),
        None => tracing::debug!(count = errors.len(), "Dropping errors, no handler set"),
    }
}
