//! Error types and backend error-message normalization.
//!
//! This module provides:
//! - [`ConfigError`] - A credential field required by the selected scheme is missing
//! - [`ValidationError`] - Required operation fields are missing, caught before any request
//! - [`backend_message`] - Normalizes the backend's heterogeneous error shapes to one string

use serde_json::Value;
use thiserror::Error;

/// Fallback used when no known error shape matches.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

/// A credential field required by the selected authentication scheme is
/// missing or malformed. Fatal; never retried.
#[derive(Debug, Error)]
#[error("configuration error: {message}")]
pub struct ConfigError {
    pub message: String,
}

/// Required fields for a create/update operation are absent, null, or
/// empty. Raised locally, before any request is sent.
#[derive(Debug, Error)]
#[error("Missing required fields for {operation} operation: {}", .missing.join(", "))]
pub struct ValidationError {
    /// Operation name the check ran for.
    pub operation: String,

    /// Missing field names, in the order they were required.
    pub missing: Vec<String>,
}

/// Extract one human-readable message from an arbitrary error-shaped value.
///
/// The backend, the transport layer, and generic failures all produce
/// different shapes, so this probes them as a priority cascade; only the
/// first matching rule fires:
///
/// 1. A non-empty `_errors` array: the first entry's `errorMessage`, else
///    its `errorCode`, else fall through.
/// 2. A top-level string `message`.
/// 3. An `error` field that is itself a string, or an object carrying a
///    string `message`.
/// 4. A fixed fallback.
pub fn backend_message(value: &Value) -> String {
    if let Some(first) = value
        .get("_errors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.first())
    {
        let message = first
            .get("errorMessage")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .or_else(|| {
                first
                    .get("errorCode")
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
            });
        if let Some(message) = message {
            return message.to_string();
        }
    }

    if let Some(message) = value
        .get("message")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
    {
        return message.to_string();
    }

    if let Some(error) = value.get("error") {
        if let Some(message) = error.as_str() {
            return message.to_string();
        }
        if let Some(message) = error.get("message").and_then(Value::as_str) {
            return message.to_string();
        }
    }

    UNKNOWN_ERROR_MESSAGE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_backend_message_prefers_error_array() {
        let error = json!({
            "_errors": [{
                "errorMessage": "CMN-0007: Attribute 'name' is required.",
                "errorCode": "validation.requiredFieldMissing"
            }],
            "message": "shadowed"
        });
        assert_eq!(
            backend_message(&error),
            "CMN-0007: Attribute 'name' is required."
        );
    }

    #[test]
    fn test_backend_message_falls_back_to_error_code() {
        let error = json!({
            "_errors": [{ "errorCode": "validation.requiredFieldMissing" }]
        });
        assert_eq!(backend_message(&error), "validation.requiredFieldMissing");
    }

    #[test]
    fn test_backend_message_empty_error_entry_falls_through() {
        let error = json!({
            "_errors": [{ "resourceId": "projects/42" }],
            "message": "Connection failed"
        });
        assert_eq!(backend_message(&error), "Connection failed");
    }

    #[test]
    fn test_backend_message_top_level_message() {
        let error = json!({ "message": "Connection failed" });
        assert_eq!(backend_message(&error), "Connection failed");
    }

    #[test]
    fn test_backend_message_string_error() {
        let error = json!({ "error": "Simple error string" });
        assert_eq!(backend_message(&error), "Simple error string");
    }

    #[test]
    fn test_backend_message_nested_error_object() {
        let error = json!({ "error": { "message": "Nested error" } });
        assert_eq!(backend_message(&error), "Nested error");
    }

    #[test]
    fn test_backend_message_unknown_shape() {
        let error = json!({ "unknown": "format" });
        assert_eq!(backend_message(&error), UNKNOWN_ERROR_MESSAGE);
        assert_eq!(backend_message(&json!(null)), UNKNOWN_ERROR_MESSAGE);
    }

    #[test]
    fn test_backend_message_empty_errors_array_falls_through() {
        let error = json!({ "_errors": [], "message": "after the array" });
        assert_eq!(backend_message(&error), "after the array");
    }

    #[test]
    fn test_validation_error_lists_fields_in_order() {
        let err = ValidationError {
            operation: "create".to_string(),
            missing: vec!["code".to_string(), "name".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Missing required fields for create operation: code, name"
        );
    }
}
