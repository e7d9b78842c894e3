//! Test doubles shared by unit and integration tests.
//!
//! Enabled for `cfg(test)` and behind the `test-utils` feature.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::api::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use crate::config::LibratoConfig;
use crate::error::{LibratoError, LibratoResult};
use crate::model::{Counter, Gauge, Measurement};

/// Configuration with credentials and an endpoint nothing listens on.
pub fn test_config() -> LibratoConfig {
    LibratoConfig::new("test@example.com", "test-token").with_endpoint("http://localhost:1")
}

/// A small valid batch mixing both measurement kinds.
pub fn sample_measurements() -> Vec<Measurement> {
    vec![
        Gauge::new("test:gauge_1", 10).into(),
        Gauge::new("test:gauge_2", 2.5).with_source("host1").into(),
        Counter::new("test:counter_1", 42).into(),
    ]
}

/// A request captured by [`RecordingTransport`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub mail: String,
    pub body: Option<Vec<u8>>,
}

impl RecordedRequest {
    /// Parses the body as JSON, `Null` when there is none.
    pub fn json_body(&self) -> serde_json::Value {
        self.body
            .as_deref()
            .and_then(|bytes| serde_json::from_slice(bytes).ok())
            .unwrap_or(serde_json::Value::Null)
    }

    /// Names of every gauge and counter in a metrics POST body.
    pub fn measurement_names(&self) -> Vec<String> {
        let body = self.json_body();
        ["gauges", "counters"]
            .iter()
            .filter_map(|key| body[*key].as_array())
            .flatten()
            .filter_map(|point| point["name"].as_str().map(str::to_string))
            .collect()
    }
}

#[derive(Debug, Clone)]
enum Reply {
    Respond(HttpResponse),
    Fail(String),
}

/// In-memory [`HttpTransport`] that records requests and answers with a fixed reply.
#[derive(Debug)]
pub struct RecordingTransport {
    reply: Reply,
    delay: Option<Duration>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl RecordingTransport {
    /// Answers every request with `200 OK` and an empty body.
    pub fn accepting() -> Self {
        Self::responding(200, "")
    }

    /// Answers every request with `status` and `body`.
    pub fn responding(status: u16, body: impl Into<String>) -> Self {
        Self::with_reply(Reply::Respond(HttpResponse {
            status,
            body: body.into(),
        }))
    }

    /// Fails every request at the transport level.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_reply(Reply::Fail(message.into()))
    }

    /// Sleeps before answering, to simulate a slow network.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl HttpTransport for RecordingTransport {
    async fn send(&self, request: HttpRequest) -> LibratoResult<HttpResponse> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedRequest {
                method: request.method,
                url: request.url,
                mail: request.credentials.mail().to_string(),
                body: request.body,
            });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.reply {
            Reply::Respond(response) => Ok(response.clone()),
            Reply::Fail(message) => Err(LibratoError::transport(message.clone())),
        }
    }
}

/// Collects errors delivered to an error handler.
#[derive(Debug, Clone, Default)]
pub struct ErrorSink {
    errors: Arc<Mutex<Vec<LibratoError>>>,
}

impl ErrorSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// A handler closure appending into this sink.
    pub fn handler(&self) -> impl Fn(&[LibratoError]) + Send + Sync + 'static {
        let errors = self.errors.clone();
        move |batch: &[LibratoError]| {
            errors
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .extend_from_slice(batch);
        }
    }

    /// Every error delivered so far.
    pub fn errors(&self) -> Vec<LibratoError> {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
