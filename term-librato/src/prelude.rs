//! Prelude for commonly used types and traits in term-librato.

pub use crate::api::{AnnotationStream, LibratoClient};
pub use crate::config::LibratoConfig;
pub use crate::dispatch::{Collector, DispatchSource, Dispatcher, DispatcherConfig, MetricsBuffer};
pub use crate::error::{LibratoError, LibratoResult, MeasurementKind};
pub use crate::model::{Annotation, Counter, Gauge, Measurement, MetricValue};
