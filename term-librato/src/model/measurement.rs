//! Gauges, counters and their values.

use serde::{Deserialize, Serialize};

use crate::error::{LibratoError, LibratoResult};
use crate::model::validation;

/// Value of a measurement field.
///
/// Only the numeric variants are accepted by the service. `String` and
/// `Boolean` exist so that values forwarded from untyped sources are
/// rejected by validation instead of being silently coerced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    /// A signed integer value.
    Long(i64),

    /// An unsigned integer value.
    UnsignedLong(u64),

    /// A floating-point value.
    Double(f64),

    /// A non-numeric string value.
    String(String),

    /// A non-numeric boolean value.
    Boolean(bool),
}

impl MetricValue {
    /// Checks if the value is numeric and representable in JSON.
    pub fn is_numeric(&self) -> bool {
        match self {
            MetricValue::Long(_) | MetricValue::UnsignedLong(_) => true,
            MetricValue::Double(v) => v.is_finite(),
            MetricValue::String(_) | MetricValue::Boolean(_) => false,
        }
    }
}

macro_rules! metric_value_from {
    ($variant:ident: $($ty:ty),+) => {
        $(
            impl From<$ty> for MetricValue {
                fn from(value: $ty) -> Self {
                    MetricValue::$variant(value.into())
                }
            }
        )+
    };
}

metric_value_from!(Long: i8, i16, i32, i64);
metric_value_from!(UnsignedLong: u8, u16, u32, u64);
metric_value_from!(Double: f32, f64);
metric_value_from!(Boolean: bool);

impl From<usize> for MetricValue {
    fn from(value: usize) -> Self {
        MetricValue::UnsignedLong(value as u64)
    }
}

impl From<String> for MetricValue {
    fn from(value: String) -> Self {
        MetricValue::String(value)
    }
}

impl From<&str> for MetricValue {
    fn from(value: &str) -> Self {
        MetricValue::String(value.to_string())
    }
}

/// A point-in-time reading, optionally summarising several samples.
///
/// Names are unique among gauges, may be up to 255 characters long and are
/// made of `A-Za-z0-9.:-_`. The namespace is case insensitive on the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gauge {
    pub name: String,

    /// Single-sample value. Leave unset when reporting `count`/`sum`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<MetricValue>,

    /// Epoch seconds. Stamped with the flush time when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measure_time: Option<i64>,

    /// Subdivides the gauge among members of a population (e.g. hostname).
    /// `all` is reserved by the service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<MetricValue>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sum: Option<MetricValue>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<MetricValue>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<MetricValue>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sum_squares: Option<MetricValue>,
}

impl Gauge {
    /// Creates a single-sample gauge.
    pub fn new(name: impl Into<String>, value: impl Into<MetricValue>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::empty(name)
        }
    }

    /// Creates a multi-sample gauge from a sample count and their sum.
    pub fn aggregate(
        name: impl Into<String>,
        count: impl Into<MetricValue>,
        sum: impl Into<MetricValue>,
    ) -> Self {
        Self {
            count: Some(count.into()),
            sum: Some(sum.into()),
            ..Self::empty(name)
        }
    }

    fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            measure_time: None,
            source: None,
            count: None,
            sum: None,
            min: None,
            max: None,
            sum_squares: None,
        }
    }

    /// Sets the source, e.g. a hostname.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the measurement time in epoch seconds.
    pub fn with_measure_time(mut self, epoch_secs: i64) -> Self {
        self.measure_time = Some(epoch_secs);
        self
    }

    /// Sets the smallest sample.
    pub fn with_min(mut self, min: impl Into<MetricValue>) -> Self {
        self.min = Some(min.into());
        self
    }

    /// Sets the largest sample.
    pub fn with_max(mut self, max: impl Into<MetricValue>) -> Self {
        self.max = Some(max.into());
        self
    }

    /// Sets the sum of squared samples.
    pub fn with_sum_squares(mut self, sum_squares: impl Into<MetricValue>) -> Self {
        self.sum_squares = Some(sum_squares.into());
        self
    }

    /// Checks name, source and every numeric field.
    pub fn validate(&self) -> LibratoResult<()> {
        validation::validate_gauge(self)
    }
}

/// A monotonically reported value without aggregate fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Counter {
    pub name: String,

    pub value: MetricValue,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub measure_time: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Counter {
    /// Creates a counter with its current value.
    pub fn new(name: impl Into<String>, value: impl Into<MetricValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            measure_time: None,
            source: None,
        }
    }

    /// Sets the source, e.g. a hostname.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the measurement time in epoch seconds.
    pub fn with_measure_time(mut self, epoch_secs: i64) -> Self {
        self.measure_time = Some(epoch_secs);
        self
    }

    /// Checks name, source and value.
    pub fn validate(&self) -> LibratoResult<()> {
        validation::validate_counter(self)
    }
}

/// A single reported data point.
#[derive(Debug, Clone, PartialEq)]
pub enum Measurement {
    Gauge(Gauge),
    Counter(Counter),
}

impl Measurement {
    /// Validates the wrapped gauge or counter.
    pub fn validate(&self) -> LibratoResult<()> {
        validation::validate_measurement(self)
    }
}

impl From<Gauge> for Measurement {
    fn from(gauge: Gauge) -> Self {
        Measurement::Gauge(gauge)
    }
}

impl From<Counter> for Measurement {
    fn from(counter: Counter) -> Self {
        Measurement::Counter(counter)
    }
}

/// Request body for `POST /v1/metrics/`.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct MeasurementBatch {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub gauges: Vec<Gauge>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub counters: Vec<Counter>,
}

impl MeasurementBatch {
    /// Partitions measurements into gauges and counters, preserving order.
    ///
    /// Points without a `measure_time` are stamped with `flush_time`. When a
    /// prefix is given it is prepended to every name and every present source.
    pub fn build(measurements: Vec<Measurement>, flush_time: i64, prefix: Option<&str>) -> Self {
        let mut batch = Self::default();

        for measurement in measurements {
            match measurement {
                Measurement::Gauge(mut gauge) => {
                    gauge.measure_time.get_or_insert(flush_time);
                    apply_prefix(prefix, &mut gauge.name, &mut gauge.source);
                    batch.gauges.push(gauge);
                }
                Measurement::Counter(mut counter) => {
                    counter.measure_time.get_or_insert(flush_time);
                    apply_prefix(prefix, &mut counter.name, &mut counter.source);
                    batch.counters.push(counter);
                }
            }
        }

        batch
    }

    /// Re-validates every point as it will be sent, prefix included.
    pub fn validate(&self) -> Vec<LibratoError> {
        let gauges = self.gauges.iter().map(validation::validate_gauge);
        let counters = self.counters.iter().map(validation::validate_counter);
        gauges.chain(counters).filter_map(Result::err).collect()
    }

    /// Number of gauges and counters.
    pub fn len(&self) -> usize {
        self.gauges.len() + self.counters.len()
    }

    /// Returns true if the batch holds no points.
    pub fn is_empty(&self) -> bool {
        self.gauges.is_empty() && self.counters.is_empty()
    }
}

fn apply_prefix(prefix: Option<&str>, name: &mut String, source: &mut Option<String>) {
    let Some(prefix) = prefix else {
        return;
    };

    name.insert_str(0, prefix);
    if let Some(source) = source.as_mut() {
        source.insert_str(0, prefix);
    }
}
