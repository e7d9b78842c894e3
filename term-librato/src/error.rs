//! Error types for the librato client.
//!
//! Every failure the client can report is a [`LibratoError`]. Operations that
//! talk to the service return a `Vec<LibratoError>` so that each rejected
//! measurement or decoded service message can be inspected on its own.

use std::fmt;

use thiserror::Error;

/// Class of a measurement, used to label validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasurementKind {
    Gauge,
    Counter,
}

impl fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasurementKind::Gauge => write!(f, "Gauge"),
            MeasurementKind::Counter => write!(f, "Counter"),
        }
    }
}

/// Errors that can occur when validating or sending data to Librato.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LibratoError {
    /// Measurement name is missing.
    #[error("{kind} property Name can't be empty")]
    EmptyName { kind: MeasurementKind },

    /// Annotation title is missing.
    #[error("Annotation property Title can't be empty")]
    EmptyTitle,

    /// Name or source exceeds the service limit.
    #[error("Length of {kind} property {field} must be 255 or fewer characters (got {length})")]
    NameTooLong {
        kind: MeasurementKind,
        field: &'static str,
        length: usize,
    },

    /// Name or source contains characters outside `A-Za-z0-9.:-_`.
    #[error("{kind} property {field} contains invalid characters")]
    InvalidCharacters {
        kind: MeasurementKind,
        field: &'static str,
    },

    /// A numeric field holds a non-numeric value, or a required one is absent.
    #[error("{kind} property {field} can't be non-numeric")]
    NonNumericField {
        kind: MeasurementKind,
        field: &'static str,
    },

    /// Annotation stream name is missing.
    #[error("Stream name can't be empty")]
    EmptyStreamName,

    /// Account mail or API token is not configured.
    #[error("Access credentials are not set")]
    MissingCredentials,

    /// A component was used before it was set up.
    #[error("{component} is not initialized")]
    Uninitialized { component: &'static str },

    /// Network error (connection failed, timeout, etc.).
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// The service rejected the request.
    #[error("Service error ({status}): {message}")]
    Service { status: u16, message: String },

    /// Request body could not be encoded.
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl LibratoError {
    /// Returns true if the error was raised by local validation, before any I/O.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LibratoError::EmptyName { .. }
                | LibratoError::EmptyTitle
                | LibratoError::NameTooLong { .. }
                | LibratoError::InvalidCharacters { .. }
                | LibratoError::NonNumericField { .. }
                | LibratoError::EmptyStreamName
        )
    }

    /// Returns true if this error is transient and the operation could be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            LibratoError::Transport { .. } => true,
            LibratoError::Service { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Decoded service message, if this error came from the service.
    pub fn service_message(&self) -> Option<&str> {
        match self {
            LibratoError::Service { message, .. } => Some(message),
            _ => None,
        }
    }

    pub(crate) fn transport(message: impl Into<String>) -> Self {
        LibratoError::Transport {
            message: message.into(),
        }
    }

    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        LibratoError::Configuration {
            message: message.into(),
        }
    }
}

/// Result type for librato operations.
pub type LibratoResult<T> = std::result::Result<T, LibratoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = LibratoError::EmptyName {
            kind: MeasurementKind::Gauge,
        };
        assert_eq!(err.to_string(), "Gauge property Name can't be empty");

        let err = LibratoError::NonNumericField {
            kind: MeasurementKind::Counter,
            field: "Value",
        };
        assert_eq!(err.to_string(), "Counter property Value can't be non-numeric");
    }

    #[test]
    fn test_is_validation() {
        assert!(LibratoError::EmptyTitle.is_validation());
        assert!(LibratoError::EmptyStreamName.is_validation());
        assert!(!LibratoError::MissingCredentials.is_validation());
        assert!(!LibratoError::transport("refused").is_validation());
    }

    #[test]
    fn test_is_retryable() {
        assert!(LibratoError::transport("timeout").is_retryable());
        assert!(LibratoError::Service {
            status: 503,
            message: "unavailable".to_string()
        }
        .is_retryable());
        assert!(!LibratoError::Service {
            status: 400,
            message: "bad".to_string()
        }
        .is_retryable());
        assert!(!LibratoError::MissingCredentials.is_retryable());
    }

    #[test]
    fn test_service_message() {
        let err = LibratoError::Service {
            status: 400,
            message: "bad stream".to_string(),
        };
        assert_eq!(err.service_message(), Some("bad stream"));
        assert_eq!(LibratoError::EmptyTitle.service_message(), None);
    }
}
