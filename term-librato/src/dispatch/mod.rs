//! Periodic delivery of measurements.
//!
//! Two kinds of [`DispatchSource`] exist: a [`MetricsBuffer`] that callers push
//! into, and a [`Collector`] that produces its batch when asked. Both can be
//! sent explicitly or registered with a [`Dispatcher`] whose background loop
//! sends each source once its period has elapsed.

mod buffer;
mod collector;
mod scheduler;
mod source;

pub use buffer::MetricsBuffer;
pub use collector::Collector;
pub use scheduler::{Dispatcher, DispatcherConfig, DEFAULT_TICK_INTERVAL};
pub use source::{DispatchSource, ErrorHandler};
