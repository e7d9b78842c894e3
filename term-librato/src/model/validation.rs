//! Structural checks run before anything is queued or sent.
//!
//! All functions here are pure. A measurement or annotation that fails
//! validation never reaches a buffer queue or the network.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{LibratoError, LibratoResult, MeasurementKind};
use crate::model::{Annotation, Counter, Gauge, Measurement, MetricValue};

/// Maximum length of a metric name or source.
pub const MAX_NAME_LENGTH: usize = 255;

static NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z0-9.:_\-]+$").expect("Hard-coded regex pattern should be valid")
});

pub fn validate_measurement(measurement: &Measurement) -> LibratoResult<()> {
    match measurement {
        Measurement::Gauge(gauge) => validate_gauge(gauge),
        Measurement::Counter(counter) => validate_counter(counter),
    }
}

pub fn validate_gauge(gauge: &Gauge) -> LibratoResult<()> {
    let kind = MeasurementKind::Gauge;
    validate_identity(kind, &gauge.name, gauge.source.as_deref())?;

    match &gauge.value {
        Some(value) => require_numeric(kind, "Value", value)?,
        // multi-sample gauges report count/sum instead of value
        None if gauge.count.is_some() => {}
        None => {
            return Err(LibratoError::NonNumericField {
                kind,
                field: "Value",
            })
        }
    }

    let aggregates = [
        ("Count", &gauge.count),
        ("Sum", &gauge.sum),
        ("Min", &gauge.min),
        ("Max", &gauge.max),
        ("SumSquares", &gauge.sum_squares),
    ];
    for (field, value) in aggregates {
        if let Some(value) = value {
            require_numeric(kind, field, value)?;
        }
    }

    Ok(())
}

pub fn validate_counter(counter: &Counter) -> LibratoResult<()> {
    let kind = MeasurementKind::Counter;
    validate_identity(kind, &counter.name, counter.source.as_deref())?;
    require_numeric(kind, "Value", &counter.value)
}

pub fn validate_annotation(annotation: &Annotation) -> LibratoResult<()> {
    if annotation.title.is_empty() {
        return Err(LibratoError::EmptyTitle);
    }
    Ok(())
}

/// Checks a name prefix: same charset as names, leaving room for at least
/// one name character.
pub fn validate_prefix(prefix: &str) -> LibratoResult<()> {
    if prefix.chars().count() >= MAX_NAME_LENGTH {
        return Err(LibratoError::configuration(format!(
            "prefix must be shorter than {MAX_NAME_LENGTH} characters"
        )));
    }
    if !NAME_PATTERN.is_match(prefix) {
        return Err(LibratoError::configuration(format!(
            "prefix '{prefix}' contains invalid characters"
        )));
    }
    Ok(())
}

/// Validates every measurement and collects all failures.
pub fn validate_all(measurements: &[Measurement]) -> Vec<LibratoError> {
    measurements
        .iter()
        .filter_map(|m| m.validate().err())
        .collect()
}

fn validate_identity(kind: MeasurementKind, name: &str, source: Option<&str>) -> LibratoResult<()> {
    if name.is_empty() {
        return Err(LibratoError::EmptyName { kind });
    }
    validate_label(kind, "Name", name)?;

    if let Some(source) = source {
        validate_label(kind, "Source", source)?;
    }
    Ok(())
}

fn validate_label(kind: MeasurementKind, field: &'static str, label: &str) -> LibratoResult<()> {
    let length = label.chars().count();
    if length > MAX_NAME_LENGTH {
        return Err(LibratoError::NameTooLong {
            kind,
            field,
            length,
        });
    }
    if !NAME_PATTERN.is_match(label) {
        return Err(LibratoError::InvalidCharacters { kind, field });
    }
    Ok(())
}

fn require_numeric(
    kind: MeasurementKind,
    field: &'static str,
    value: &MetricValue,
) -> LibratoResult<()> {
    if value.is_numeric() {
        Ok(())
    } else {
        Err(LibratoError::NonNumericField { kind, field })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gauge_validation() {
        assert_eq!(
            Gauge::new("", 1).validate(),
            Err(LibratoError::EmptyName {
                kind: MeasurementKind::Gauge
            })
        );
        assert!(matches!(
            Gauge::new("a".repeat(256), 1).validate(),
            Err(LibratoError::NameTooLong { length: 256, .. })
        ));
        assert_eq!(
            Gauge::new("1", "test").validate(),
            Err(LibratoError::NonNumericField {
                kind: MeasurementKind::Gauge,
                field: "Value"
            })
        );

        assert!(Gauge::new("1", 1).validate().is_ok());
        assert!(Gauge::new("a".repeat(255), 1).validate().is_ok());
    }

    #[test]
    fn test_gauge_aggregate_fields_must_be_numeric() {
        let cases = [
            ("Count", Gauge::new("1", 1).tap(|g| g.count = Some("test".into()))),
            ("Sum", Gauge::new("1", 1).tap(|g| g.sum = Some("test".into()))),
            ("Min", Gauge::new("1", 1).with_min("test")),
            ("Max", Gauge::new("1", 1).with_max("test")),
            ("SumSquares", Gauge::new("1", 1).with_sum_squares("test")),
        ];

        for (field, gauge) in cases {
            assert_eq!(
                gauge.validate(),
                Err(LibratoError::NonNumericField {
                    kind: MeasurementKind::Gauge,
                    field
                }),
                "field {field}"
            );
        }
    }

    #[test]
    fn test_gauge_without_value() {
        assert!(Gauge::aggregate("requests", 10, 250).validate().is_ok());

        let mut gauge = Gauge::new("requests", 1);
        gauge.value = None;
        assert!(matches!(
            gauge.validate(),
            Err(LibratoError::NonNumericField { field: "Value", .. })
        ));
    }

    #[test]
    fn test_counter_validation() {
        assert_eq!(
            Counter::new("", 1).validate(),
            Err(LibratoError::EmptyName {
                kind: MeasurementKind::Counter
            })
        );
        assert!(Counter::new("c", true).validate().is_err());
        assert!(Counter::new("c", 1u64).validate().is_ok());
    }

    #[test]
    fn test_name_charset() {
        assert!(Gauge::new("example:gauge_1.total-count", 1).validate().is_ok());
        assert_eq!(
            Gauge::new("has space", 1).validate(),
            Err(LibratoError::InvalidCharacters {
                kind: MeasurementKind::Gauge,
                field: "Name"
            })
        );
        assert_eq!(
            Counter::new("ok", 1).with_source("bad/source").validate(),
            Err(LibratoError::InvalidCharacters {
                kind: MeasurementKind::Counter,
                field: "Source"
            })
        );
        assert!(matches!(
            Gauge::new("ok", 1).with_source("s".repeat(256)).validate(),
            Err(LibratoError::NameTooLong { field: "Source", .. })
        ));
    }

    #[test]
    fn test_annotation_validation() {
        assert_eq!(
            Annotation::new("").validate(),
            Err(LibratoError::EmptyTitle)
        );
        assert!(Annotation::new("test").validate().is_ok());
    }

    #[test]
    fn test_prefix_validation() {
        assert!(validate_prefix("app.").is_ok());
        assert!(validate_prefix("a".repeat(254).as_str()).is_ok());
        assert!(matches!(
            validate_prefix("my app/"),
            Err(LibratoError::Configuration { .. })
        ));
        assert!(matches!(
            validate_prefix(&"a".repeat(255)),
            Err(LibratoError::Configuration { .. })
        ));
    }

    #[test]
    fn test_validate_all_collects_every_failure() {
        let measurements = vec![
            Measurement::from(Gauge::new("", 1)),
            Measurement::from(Gauge::new("ok", 1)),
            Measurement::from(Counter::new("c", "x")),
        ];

        let errors = validate_all(&measurements);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(LibratoError::is_validation));
    }

    trait Tap: Sized {
        fn tap(self, f: impl FnOnce(&mut Self)) -> Self;
    }

    impl Tap for Gauge {
        fn tap(mut self, f: impl FnOnce(&mut Self)) -> Self {
            f(&mut self);
            self
        }
    }
}
