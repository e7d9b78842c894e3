//! Process-wide client for code that prefers free functions.
//!
//! Call [`init`] once at startup; the free functions below then use that
//! client. Libraries should pass a [`LibratoClient`] around instead.

use once_cell::sync::OnceCell;
use tracing::info;

use crate::api::LibratoClient;
use crate::config::LibratoConfig;
use crate::error::{LibratoError, LibratoResult};
use crate::model::{Annotation, Measurement};

static CLIENT: OnceCell<LibratoClient> = OnceCell::new();

/// Installs the process-wide client. Fails if already initialized.
pub fn init(config: LibratoConfig) -> LibratoResult<&'static LibratoClient> {
    let client = LibratoClient::new(config)?;
    install(client)
}

/// Installs an already built client, e.g. one with a custom transport.
pub fn install(client: LibratoClient) -> LibratoResult<&'static LibratoClient> {
    CLIENT
        .set(client)
        .map_err(|_| LibratoError::configuration("Global client already initialized"))?;
    info!("Global client initialized");
    global_client()
}

pub fn global_client() -> LibratoResult<&'static LibratoClient> {
    CLIENT
        .get()
        .ok_or(LibratoError::Uninitialized { component: "client" })
}

/// [`LibratoClient::send_metrics`] on the global client.
pub async fn send_metrics(measurements: Vec<Measurement>) -> Vec<LibratoError> {
    match global_client() {
        Ok(client) => client.send_metrics(measurements).await,
        Err(e) => vec![e],
    }
}

/// [`LibratoClient::add_annotation`] on the global client.
pub async fn add_annotation(stream: &str, annotation: &Annotation) -> Vec<LibratoError> {
    match global_client() {
        Ok(client) => client.add_annotation(stream, annotation).await,
        Err(e) => vec![e],
    }
}

/// [`LibratoClient::delete_annotation_stream`] on the global client.
pub async fn delete_annotation_stream(stream: &str) -> Vec<LibratoError> {
    match global_client() {
        Ok(client) => client.delete_annotation_stream(stream).await,
        Err(e) => vec![e],
    }
}
