//! Data points and events sent to Librato, plus their validation rules.

mod annotation;
mod measurement;
pub mod validation;

pub use annotation::Annotation;
pub use measurement::{Counter, Gauge, Measurement, MeasurementBatch, MetricValue};
pub use validation::{
    validate_all, validate_annotation, validate_measurement, validate_prefix, MAX_NAME_LENGTH,
};
