//! Property-based tests for measurement validation and batching.

use proptest::prelude::*;
use term_librato::model::{MeasurementBatch, MAX_NAME_LENGTH};
use term_librato::prelude::*;

fn valid_name() -> impl Strategy<Value = String> {
    "[A-Za-z0-9.:_-]{1,255}"
}

proptest! {
    #[test]
    fn test_valid_names_with_numeric_values_pass(name in valid_name(), value in any::<i64>()) {
        prop_assert!(Gauge::new(name.clone(), value).validate().is_ok());
        prop_assert!(Counter::new(name, value).validate().is_ok());
    }

    #[test]
    fn test_finite_floats_are_numeric(value in proptest::num::f64::NORMAL | proptest::num::f64::ZERO) {
        prop_assert!(Gauge::new("g", value).validate().is_ok());
    }

    #[test]
    fn test_overlong_names_are_rejected(len in (MAX_NAME_LENGTH + 1)..1024usize) {
        let name = "a".repeat(len);
        let result = Counter::new(name, 1).validate();
        prop_assert!(
            matches!(result, Err(LibratoError::NameTooLong { length, .. }) if length == len),
            "unexpected result"
        );
    }

    #[test]
    fn test_string_values_are_rejected(name in valid_name(), value in ".*") {
        let result = Gauge::new(name, value).validate();
        prop_assert!(
            matches!(result, Err(LibratoError::NonNumericField { field: "Value", .. })),
            "unexpected result"
        );
    }

    #[test]
    fn test_names_outside_charset_are_rejected(
        head in "[a-z]{0,10}",
        bad in "[ /#?%@!]",
        tail in "[a-z]{0,10}",
    ) {
        let result = Gauge::new(format!("{head}{bad}{tail}"), 1).validate();
        prop_assert!(
            matches!(result, Err(LibratoError::InvalidCharacters { field: "Name", .. })),
            "unexpected result"
        );
    }

    #[test]
    fn test_batch_partitions_and_stamps(
        gauges in 0usize..20,
        counters in 0usize..20,
        flush_time in 0i64..4_000_000_000,
    ) {
        let mut measurements: Vec<Measurement> = Vec::new();
        for i in 0..gauges {
            measurements.push(Gauge::new(format!("g{i}"), i).into());
        }
        for i in 0..counters {
            measurements.push(Counter::new(format!("c{i}"), i).into());
        }

        let batch = MeasurementBatch::build(measurements, flush_time, None);

        prop_assert_eq!(batch.gauges.len(), gauges);
        prop_assert_eq!(batch.counters.len(), counters);
        prop_assert!(batch.gauges.iter().all(|g| g.measure_time == Some(flush_time)));
        prop_assert!(batch.counters.iter().all(|c| c.measure_time == Some(flush_time)));
    }
}
