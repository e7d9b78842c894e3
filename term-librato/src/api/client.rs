use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::api::response;
use crate::api::transport::{HttpMethod, HttpRequest, HttpTransport, ReqwestTransport};
use crate::config::LibratoConfig;
use crate::error::{LibratoError, LibratoResult};
use crate::logging::truncate_field;
use crate::model::{validate_all, Annotation, Measurement, MeasurementBatch};

/// Longest service message reproduced in log lines.
const MAX_LOGGED_BODY: usize = 256;

/// Client for the Librato metrics and annotations API.
///
/// Cheap to clone; clones share configuration and transport. The one-shot
/// methods here bypass buffering and send on the caller's task.
#[derive(Clone)]
pub struct LibratoClient {
    config: Arc<LibratoConfig>,
    transport: Arc<dyn HttpTransport>,
}

impl std::fmt::Debug for LibratoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibratoClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl LibratoClient {
    /// Create a client using the `reqwest` transport.
    pub fn new(config: LibratoConfig) -> LibratoResult<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client sending through a custom transport.
    pub fn with_transport(config: LibratoConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &LibratoConfig {
        &self.config
    }

    /// Validates and sends measurements in a single request.
    ///
    /// Nothing is sent if any measurement fails validation; every failure is
    /// returned. An empty result means the service accepted the batch.
    #[instrument(skip(self, measurements), fields(count = measurements.len()))]
    pub async fn send_metrics(&self, measurements: Vec<Measurement>) -> Vec<LibratoError> {
        let errors = validate_all(&measurements);
        if !errors.is_empty() {
            return errors;
        }
        if !self.config.has_credentials() {
            return vec![LibratoError::MissingCredentials];
        }
        if measurements.is_empty() {
            return Vec::new();
        }

        self.post_measurements(measurements, chrono::Utc::now().timestamp())
            .await
    }

    /// Adds an annotation to `stream`, creating the stream if needed.
    #[instrument(skip(self, annotation))]
    pub async fn add_annotation(&self, stream: &str, annotation: &Annotation) -> Vec<LibratoError> {
        if stream.is_empty() {
            return vec![LibratoError::EmptyStreamName];
        }
        if let Err(e) = annotation.validate() {
            return vec![e];
        }
        if !self.config.has_credentials() {
            return vec![LibratoError::MissingCredentials];
        }

        let url = match self.annotations_url(stream) {
            Ok(url) => url,
            Err(e) => return vec![e],
        };
        self.execute(HttpMethod::Post, url, Some(annotation)).await
    }

    /// Deletes `stream` together with all of its annotations.
    #[instrument(skip(self))]
    pub async fn delete_annotation_stream(&self, stream: &str) -> Vec<LibratoError> {
        if stream.is_empty() {
            return vec![LibratoError::EmptyStreamName];
        }
        if !self.config.has_credentials() {
            return vec![LibratoError::MissingCredentials];
        }

        let url = match self.annotations_url(stream) {
            Ok(url) => url,
            Err(e) => return vec![e],
        };
        self.execute::<()>(HttpMethod::Delete, url, None).await
    }

    /// Returns a handle bound to one annotation stream.
    pub fn annotation_stream(&self, stream: impl Into<String>) -> LibratoResult<AnnotationStream> {
        let stream = stream.into();
        if stream.is_empty() {
            return Err(LibratoError::EmptyStreamName);
        }
        Ok(AnnotationStream {
            client: self.clone(),
            stream,
        })
    }

    /// Sends an already validated batch to the metrics endpoint.
    ///
    /// Points lacking a measure time are stamped with `flush_time`.
    pub(crate) async fn post_measurements(
        &self,
        measurements: Vec<Measurement>,
        flush_time: i64,
    ) -> Vec<LibratoError> {
        let batch = MeasurementBatch::build(measurements, flush_time, self.config.prefix());
        if batch.is_empty() {
            return Vec::new();
        }

        // the prefix can push a valid name over the limit
        let errors = batch.validate();
        if !errors.is_empty() {
            return errors;
        }

        debug!(
            count = batch.len(),
            gauges = batch.gauges.len(),
            counters = batch.counters.len(),
            "Sending measurements"
        );

        let url = match self.metrics_url() {
            Ok(url) => url,
            Err(e) => return vec![e],
        };
        self.execute(HttpMethod::Post, url, Some(&batch)).await
    }

    async fn execute<T: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        url: String,
        body: Option<&T>,
    ) -> Vec<LibratoError> {
        let body = match body.map(serde_json::to_vec).transpose() {
            Ok(body) => body,
            Err(e) => {
                return vec![LibratoError::Serialization {
                    message: e.to_string(),
                }]
            }
        };

        let request = HttpRequest {
            method,
            url,
            credentials: self.config.credentials().clone(),
            body,
        };

        match self.transport.send(request).await {
            Ok(response) => {
                let errors = response::interpret(&response);
                if !errors.is_empty() {
                    warn!(
                        status = response.status,
                        body = %truncate_field(&response.body, MAX_LOGGED_BODY),
                        "Request rejected by service"
                    );
                }
                errors
            }
            Err(e) => {
                warn!(error = %e, "Request failed");
                vec![e]
            }
        }
    }

    fn metrics_url(&self) -> LibratoResult<String> {
        let mut url = self.config.base_url()?;
        url.path_segments_mut()
            .map_err(|_| LibratoError::configuration("endpoint cannot be a base URL"))?
            .pop_if_empty()
            .extend(["v1", "metrics", ""]);
        Ok(url.into())
    }

    fn annotations_url(&self, stream: &str) -> LibratoResult<String> {
        let mut url = self.config.base_url()?;
        url.path_segments_mut()
            .map_err(|_| LibratoError::configuration("endpoint cannot be a base URL"))?
            .pop_if_empty()
            .extend(["v1", "annotations", stream]);
        Ok(url.into())
    }
}

/// Handle for one annotation stream.
///
/// Obtained from [`LibratoClient::annotation_stream`]; the stream name is
/// checked once at construction.
#[derive(Debug, Clone)]
pub struct AnnotationStream {
    client: LibratoClient,
    stream: String,
}

impl AnnotationStream {
    /// Get the stream name.
    pub fn name(&self) -> &str {
        &self.stream
    }

    /// Adds an annotation to this stream.
    pub async fn add(&self, annotation: &Annotation) -> Vec<LibratoError> {
        self.client.add_annotation(&self.stream, annotation).await
    }

    /// Deletes the stream and every annotation in it.
    pub async fn delete(&self) -> Vec<LibratoError> {
        self.client.delete_annotation_stream(&self.stream).await
    }
}
