//! Client configuration.
//!
//! A [`LibratoConfig`] is built once at startup, handed to
//! [`LibratoClient::new`](crate::LibratoClient::new) and shared read-only by
//! every buffer, collector and one-shot call created from that client.
//!
//! ```rust
//! use std::time::Duration;
//! use term_librato::LibratoConfig;
//!
//! let config = LibratoConfig::new("mail@domain.com", "abcd1234")
//!     .with_prefix("myapp.")
//!     .with_timeout(Duration::from_secs(10));
//!
//! assert!(config.has_credentials());
//! assert_eq!(config.prefix(), Some("myapp."));
//! ```

use std::time::Duration;

use url::Url;

use crate::error::{LibratoError, LibratoResult};
use crate::model::validate_prefix;
use crate::security::{Credentials, SecureString};

/// Default Librato API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://metrics-api.librato.com";

/// Default HTTP request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variables read by [`LibratoConfig::from_env`].
pub const ENV_MAIL: &str = "LIBRATO_MAIL";
pub const ENV_TOKEN: &str = "LIBRATO_TOKEN";
pub const ENV_ENDPOINT: &str = "LIBRATO_ENDPOINT";
pub const ENV_PREFIX: &str = "LIBRATO_PREFIX";

/// Configuration for talking to the Librato API.
#[derive(Debug, Clone)]
pub struct LibratoConfig {
    credentials: Credentials,
    endpoint: String,
    prefix: Option<String>,
    timeout: Duration,
    background_scheduling: bool,
}

impl LibratoConfig {
    /// Creates a configuration with the given account mail and API token.
    pub fn new(mail: impl Into<String>, token: impl Into<SecureString>) -> Self {
        Self {
            credentials: Credentials::new(mail, token),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            prefix: None,
            timeout: DEFAULT_TIMEOUT,
            background_scheduling: true,
        }
    }

    /// Creates a configuration from `LIBRATO_*` environment variables.
    ///
    /// Missing credentials are not an error here; sends will report
    /// [`LibratoError::MissingCredentials`] instead.
    pub fn from_env() -> Self {
        let mail = std::env::var(ENV_MAIL).unwrap_or_default();
        let token = std::env::var(ENV_TOKEN).unwrap_or_default();

        let mut config = Self::new(mail, token);
        if let Ok(endpoint) = std::env::var(ENV_ENDPOINT) {
            config = config.with_endpoint(endpoint);
        }
        if let Ok(prefix) = std::env::var(ENV_PREFIX) {
            config = config.with_prefix(prefix);
        }
        config
    }

    /// Sets the API endpoint. A trailing slash is dropped.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        let endpoint: String = endpoint.into();
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    /// Prefix prepended to every measurement name and source at send time.
    ///
    /// Must use the name charset; [`validate`](Self::validate) rejects anything
    /// else. Prefixed names are checked against the length limit before sending.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix: String = prefix.into();
        self.prefix = if prefix.is_empty() { None } else { Some(prefix) };
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enables or disables registration of sources with the background scheduler.
    ///
    /// When disabled, buffers flush only on their size threshold or on an
    /// explicit `send()`, and collectors only on an explicit `send()`.
    pub fn with_background_scheduling(mut self, enabled: bool) -> Self {
        self.background_scheduling = enabled;
        self
    }

    /// Get the account credentials.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Get the API endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Get the name prefix, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Get the HTTP request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns true if sources register with the background scheduler.
    pub fn background_scheduling(&self) -> bool {
        self.background_scheduling
    }

    /// Returns true when both mail and token are set.
    pub fn has_credentials(&self) -> bool {
        self.credentials.is_complete()
    }

    /// Checks that the endpoint is an absolute http(s) URL and that the
    /// prefix, if any, is a valid name fragment.
    pub fn validate(&self) -> LibratoResult<()> {
        if let Some(prefix) = self.prefix() {
            validate_prefix(prefix)?;
        }

        let url = self.base_url()?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(LibratoError::configuration(format!(
                "unsupported endpoint scheme '{scheme}'"
            ))),
        }
    }

    /// Parsed endpoint URL.
    pub(crate) fn base_url(&self) -> LibratoResult<Url> {
        Url::parse(&self.endpoint).map_err(|e| {
            LibratoError::configuration(format!("invalid endpoint '{}': {e}", self.endpoint))
        })
    }
}
