//! # term-librato - Librato metrics client
//!
//! A client for the Librato metrics and annotations API. Measurements are
//! validated locally, batched, and delivered either on demand or by a
//! background dispatcher running on the tokio runtime.
//!
//! ## Overview
//!
//! There are three ways to get data out:
//!
//! - **One-shot**: [`LibratoClient::send_metrics`] validates and posts a batch
//!   on the caller's task and returns every error.
//! - **Buffered**: a [`MetricsBuffer`] collects measurements pushed by the
//!   application and flushes them when its period elapses or its queue fills.
//! - **Pulled**: a [`Collector`] calls a function for a fresh batch each time
//!   its period elapses.
//!
//! Annotations (event markers on a named stream) are always sent one-shot.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use term_librato::prelude::*;
//!
//! # async fn example() -> LibratoResult<()> {
//! let config = LibratoConfig::new("user@example.com", "api-token")
//!     .with_prefix("myapp.");
//! let client = LibratoClient::new(config)?;
//!
//! // One-shot
//! let errors = client
//!     .send_metrics(vec![
//!         Gauge::new("cpu_load", 0.73).with_source("web-1").into(),
//!         Counter::new("requests", 1_024).into(),
//!     ])
//!     .await;
//! assert!(errors.is_empty());
//!
//! // Buffered, flushed every minute or every 500 measurements
//! let buffer = MetricsBuffer::new(client.clone(), Duration::from_secs(60), 500)
//!     .with_error_handler(|errors| eprintln!("{errors:?}"))
//!     .register()?;
//! buffer.push(Gauge::new("queue_depth", 17)).await?;
//!
//! // Annotation
//! client
//!     .add_annotation("deploys", &Annotation::new("v1.4.2").with_source("ci"))
//!     .await;
//!
//! // Flush everything before exit
//! Dispatcher::global().flush_all().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors
//!
//! Validation failures are returned before anything is queued or sent.
//! Failures of background sends cannot be returned to anyone, so buffers and
//! collectors hand them to an optional error handler; without one they are
//! logged at `debug` and dropped.
//!
//! ## Logging
//!
//! The crate emits `tracing` events under the `term_librato` target. See
//! [`logging::setup`] for a ready-made subscriber.

pub mod api;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod global;
pub mod logging;
pub mod model;
pub mod prelude;
pub mod security;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use api::{AnnotationStream, LibratoClient};
pub use config::LibratoConfig;
pub use dispatch::{Collector, DispatchSource, Dispatcher, DispatcherConfig, MetricsBuffer};
pub use error::{LibratoError, LibratoResult};
pub use global::{add_annotation, delete_annotation_stream, global_client, init, send_metrics};
pub use model::{Annotation, Counter, Gauge, Measurement, MetricValue};
