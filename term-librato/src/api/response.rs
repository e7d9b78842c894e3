//! Interpretation of service responses.
//!
//! The service reports rejections in one of three JSON shapes:
//!
//! ```text
//! {"errors": {"params":  {"name": ["is not present"], ...}}}
//! {"errors": {"request": ["Please use secured connection through https!"]}}
//! {"errors": {"system":  ["Internal error"]}}
//! ```
//!
//! Each message becomes its own [`LibratoError::Service`]; `params` messages
//! keep the field order of the body. Bodies that are not JSON objects (proxy
//! error pages, plain text) are wrapped verbatim.

use serde::Deserialize;
use serde_json::Value;

use crate::api::transport::HttpResponse;
use crate::error::LibratoError;

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    errors: Value,
}

/// Converts a completed HTTP exchange into the list of reported errors.
///
/// Empty means the request was accepted.
pub fn interpret(response: &HttpResponse) -> Vec<LibratoError> {
    if (200..=299).contains(&response.status) {
        return Vec::new();
    }
    decode_errors(response.status, &response.body)
}

/// Decodes an error body returned with a non-2xx status.
pub fn decode_errors(status: u16, body: &str) -> Vec<LibratoError> {
    let service_error = |message: String| LibratoError::Service { status, message };

    if !body.starts_with('{') {
        return vec![service_error(body.to_string())];
    }

    let envelope: ErrorEnvelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) => return vec![service_error(format!("Can't parse errors data: {e}"))],
    };

    let messages = if let Some(params) = envelope.errors.get("params") {
        flatten_params(params)
    } else if let Some(request) = envelope.errors.get("request") {
        string_list(request)
    } else if let Some(system) = envelope.errors.get("system") {
        string_list(system)
    } else {
        Vec::new()
    };

    if messages.is_empty() {
        return vec![service_error("Unsupported errors data".to_string())];
    }

    messages.into_iter().map(service_error).collect()
}

fn flatten_params(params: &Value) -> Vec<String> {
    params
        .as_object()
        .map(|fields| fields.values().flat_map(string_list).collect())
        .unwrap_or_default()
}

fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        Value::String(message) => vec![message.clone()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            body: body.to_string(),
        }
    }

    fn messages(errors: &[LibratoError]) -> Vec<&str> {
        errors.iter().filter_map(|e| e.service_message()).collect()
    }

    #[test]
    fn test_success_statuses() {
        assert!(interpret(&response(200, "")).is_empty());
        assert!(interpret(&response(202, "{}")).is_empty());
        assert!(interpret(&response(299, "anything")).is_empty());
    }

    #[test]
    fn test_request_errors() {
        let errors = interpret(&response(400, r#"{"errors":{"request":["bad stream"]}}"#));

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0],
            LibratoError::Service {
                status: 400,
                message: "bad stream".to_string()
            }
        );
    }

    #[test]
    fn test_params_errors_are_flattened() {
        let body = r#"{"errors":{"params":{"name":["is not present","is invalid"],"value":["must be numeric"]}}}"#;
        let errors = decode_errors(400, body);

        assert_eq!(
            messages(&errors),
            vec!["is not present", "is invalid", "must be numeric"]
        );
    }

    #[test]
    fn test_params_keep_field_order() {
        let body = r#"{"errors":{"params":{"value":["must be numeric"],"name":["is invalid"]}}}"#;
        assert_eq!(
            messages(&decode_errors(400, body)),
            vec!["must be numeric", "is invalid"]
        );
    }

    #[test]
    fn test_params_take_priority_over_request() {
        let body = r#"{"errors":{"request":["ignored"],"params":{"name":["is invalid"]}}}"#;
        assert_eq!(messages(&decode_errors(400, body)), vec!["is invalid"]);
    }

    #[test]
    fn test_system_errors() {
        let body = r#"{"errors":{"system":["boom","again"]}}"#;
        let errors = decode_errors(500, body);

        assert_eq!(messages(&errors), vec!["boom", "again"]);
        assert!(errors.iter().all(LibratoError::is_retryable));
    }

    #[test]
    fn test_raw_body() {
        let errors = interpret(&response(500, "Internal Server Error"));

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].service_message(), Some("Internal Server Error"));
    }

    #[test]
    fn test_unsupported_shape() {
        let errors = decode_errors(400, r#"{"errors":{"other":["x"]}}"#);
        assert_eq!(messages(&errors), vec!["Unsupported errors data"]);

        let errors = decode_errors(400, r#"{"errors":{"request":[]}}"#);
        assert_eq!(messages(&errors), vec!["Unsupported errors data"]);

        let errors = decode_errors(404, r#"{"message":"not found"}"#);
        assert_eq!(messages(&errors), vec!["Unsupported errors data"]);
    }

    #[test]
    fn test_malformed_json() {
        let errors = decode_errors(502, "{not json");

        assert_eq!(errors.len(), 1);
        assert!(errors[0]
            .service_message()
            .is_some_and(|m| m.starts_with("Can't parse errors data")));
    }
}
