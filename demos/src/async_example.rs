//! Buffered sending: measurements are queued and flushed in the background
//! once a minute or whenever 60 of them are waiting.
//!
//! Run with:
//! ```bash
//! LIBRATO_MAIL=you@example.com LIBRATO_TOKEN=... cargo run --example async_example
//! ```

use std::time::Duration;

use term_librato::logging::setup::{init_logging, LoggingConfig};
use term_librato::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LoggingConfig::default())?;

    let client = LibratoClient::new(LibratoConfig::from_env())?;
    let buffer = MetricsBuffer::new(client, Duration::from_secs(60), 60)
        .with_error_handler(|errors| {
            eprintln!("Background send failed:");
            for error in errors {
                eprintln!("  {error}");
            }
        })
        .register()?;

    for _ in 0..20 {
        buffer
            .push(Gauge::new("example:gauge_1", sample(1000)))
            .await?;
        tokio::time::sleep(Duration::from_secs(15)).await;
    }

    // Deliver whatever is still queued before exiting.
    let errors = Dispatcher::global().flush_all().await;
    println!("Final flush finished with {} error(s)", errors.len());

    Ok(())
}

fn sample(n: u32) -> u32 {
    chrono::Utc::now().timestamp_subsec_nanos() % n
}
