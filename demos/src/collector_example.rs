//! Pulled sending: a function is sampled once a minute and its result posted.
//!
//! Run with:
//! ```bash
//! LIBRATO_MAIL=you@example.com LIBRATO_TOKEN=... cargo run --example collector_example
//! ```

use std::time::Duration;

use term_librato::logging::setup::{init_logging, LoggingConfig};
use term_librato::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LoggingConfig::default())?;

    let client = LibratoClient::new(LibratoConfig::from_env())?;
    let _collector = Collector::new(client, Duration::from_secs(60), collect_some_metrics)
        .with_error_handler(|errors| {
            println!("Errors:");
            for error in errors {
                println!("  {error}");
            }
        })
        .register()?;

    println!("Collector registered, press Ctrl+C to stop");
    tokio::signal::ctrl_c().await?;

    Ok(())
}

fn collect_some_metrics() -> Vec<Measurement> {
    println!("Metrics collected");

    vec![
        Gauge::new("example:gauge_1", sample(1000)).into(),
        Gauge::new("example:gauge_2", sample(1000) as f64 / f64::from(sample(20) + 1))
            .with_source("rust_librato_example")
            .into(),
        Counter::new("example:counter_1", sample(1000)).into(),
    ]
}

fn sample(n: u32) -> u32 {
    chrono::Utc::now().timestamp_subsec_nanos() % n
}
