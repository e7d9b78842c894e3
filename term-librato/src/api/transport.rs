//! HTTP transport used by the client.
//!
//! The client only needs one capability from the network layer: send a
//! request with basic auth and hand back the status and body text.
//! [`ReqwestTransport`] is the production implementation; tests substitute
//! their own [`HttpTransport`].

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use tracing::trace;

use crate::config::LibratoConfig;
use crate::error::{LibratoError, LibratoResult};
use crate::security::Credentials;

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("term-librato/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Post,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Delete => write!(f, "DELETE"),
        }
    }
}

/// An outgoing API request. The body, when present, is JSON.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub credentials: Credentials,
    pub body: Option<Vec<u8>>,
}

/// A completed HTTP exchange, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Sends requests to the metrics service.
///
/// Implementations return `Err` only for transport-level failures
/// (connection refused, timeout); any HTTP status is an `Ok` response.
#[async_trait]
pub trait HttpTransport: Send + Sync + 'static {
    async fn send(&self, request: HttpRequest) -> LibratoResult<HttpResponse>;
}

/// [`HttpTransport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport honoring the configured timeout.
    pub fn new(config: &LibratoConfig) -> LibratoResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                LibratoError::configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> LibratoResult<HttpResponse> {
        let builder = match request.method {
            HttpMethod::Post => self.client.post(&request.url),
            HttpMethod::Delete => self.client.delete(&request.url),
        };

        let mut builder = builder.basic_auth(
            request.credentials.mail(),
            Some(request.credentials.token().expose()),
        );

        if let Some(body) = request.body {
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| LibratoError::transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| LibratoError::transport(e.to_string()))?;

        trace!(method = %request.method, url = %request.url, status, "Request completed");

        Ok(HttpResponse { status, body })
    }
}
