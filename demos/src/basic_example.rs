//! One-shot sending: validate and post a batch on the current task.
//!
//! Run with:
//! ```bash
//! LIBRATO_MAIL=you@example.com LIBRATO_TOKEN=... cargo run --example basic_example
//! ```

use std::time::Duration;

use term_librato::logging::setup::{init_logging, LoggingConfig};
use term_librato::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LoggingConfig::development())?;

    let client = LibratoClient::new(LibratoConfig::from_env())?;

    for round in 0..5 {
        let errors = client
            .send_metrics(vec![
                Gauge::new("example:gauge_1", sample(1000)).into(),
                Gauge::new("example:gauge_2", sample(1000) as f64 / 5.0)
                    .with_source("rust_librato_example")
                    .into(),
                Counter::new("example:counter_1", sample(1000)).into(),
            ])
            .await;

        if errors.is_empty() {
            println!("Round {round}: data sent to Librato Metrics");
        } else {
            println!("Round {round} errors:");
            for error in &errors {
                println!("  {error}");
            }
        }

        tokio::time::sleep(Duration::from_secs(60)).await;
    }

    Ok(())
}

/// Cheap pseudo-random value in `0..n` from the clock.
fn sample(n: u32) -> u32 {
    chrono::Utc::now().timestamp_subsec_nanos() % n
}
