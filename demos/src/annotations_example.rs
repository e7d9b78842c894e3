//! Adds an annotation to a stream, then deletes the stream.
//!
//! Run with:
//! ```bash
//! LIBRATO_MAIL=you@example.com LIBRATO_TOKEN=... cargo run --example annotations_example
//! ```

use std::time::Duration;

use term_librato::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let client = LibratoClient::new(LibratoConfig::from_env())?;
    let stream = client.annotation_stream("example:annotation_1")?;

    let annotation = Annotation::new("Deploy v31")
        .with_source("server123")
        .with_description("Revision: abcd1234")
        .with_link("https://build-service.com/build/31")
        .with_link("https://git-repo.com/commit/abcd1234");

    report("Annotation added", &stream.add(&annotation).await);

    tokio::time::sleep(Duration::from_secs(60)).await;

    report("Annotation deleted", &stream.delete().await);

    Ok(())
}

fn report(success: &str, errors: &[LibratoError]) {
    if errors.is_empty() {
        println!("{success}");
        return;
    }
    println!("Errors:");
    for error in errors {
        println!("  {error}");
    }
}
