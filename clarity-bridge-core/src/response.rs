//! Response-envelope classification.
//!
//! List endpoints answer with an envelope (`_results`, `_next`,
//! `_totalCount`, ...); single-record endpoints answer with the record
//! itself. The absence of `_results` is the discriminator.

use serde_json::{Map, Value};

/// A classified backend response.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// A bare record; the response carried no `_results` array.
    Single(Value),

    /// One page of an envelope response.
    Page {
        results: Vec<Value>,
        total_count: Option<u64>,
        has_next: bool,
    },
}

impl ApiResponse {
    /// Classify a raw response body.
    pub fn classify(value: Value) -> Self {
        match value {
            Value::Object(mut map) if map.contains_key("_results") => {
                let results = match map.remove("_results") {
                    Some(Value::Array(items)) => items,
                    // A malformed `_results` still marks an envelope; read it as empty.
                    _ => Vec::new(),
                };
                let total_count = map.get("_totalCount").and_then(Value::as_u64);
                let has_next = map.get("_next").map(is_truthy).unwrap_or(false);
                Self::Page {
                    results,
                    total_count,
                    has_next,
                }
            }
            other => Self::Single(other),
        }
    }
}

/// Pagination-signal truthiness: `_next` is a URL string when another
/// page exists and null otherwise, but the check tolerates booleans and
/// numbers the way the backend's JS-era clients did.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().map(|x| x != 0.0).unwrap_or(true),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Strip a response down to its data.
///
/// Envelopes reduce to their `_results` array. Single records keep every
/// non-metadata key; of the underscore-prefixed metadata only
/// `_internalId` survives, since callers use it as the record identity.
pub fn simplify(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("_results") => {
            map.remove("_results").unwrap_or(Value::Array(Vec::new()))
        }
        Value::Object(map) => {
            let kept: Map<String, Value> = map
                .into_iter()
                .filter(|(key, _)| !key.starts_with('_') || key == "_internalId")
                .collect();
            Value::Object(kept)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_envelope() {
        let response = json!({
            "_results": [{ "code": "PRJ001" }, { "code": "PRJ002" }],
            "_totalCount": 12,
            "_next": "http://host/ppm/rest/v1/projects?offset=2"
        });
        match ApiResponse::classify(response) {
            ApiResponse::Page {
                results,
                total_count,
                has_next,
            } => {
                assert_eq!(results.len(), 2);
                assert_eq!(total_count, Some(12));
                assert!(has_next);
            }
            other => panic!("expected page, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_last_page() {
        let response = json!({ "_results": [], "_next": null });
        match ApiResponse::classify(response) {
            ApiResponse::Page { has_next, results, .. } => {
                assert!(!has_next);
                assert!(results.is_empty());
            }
            other => panic!("expected page, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_single_record() {
        let response = json!({ "_internalId": 7, "code": "PRJ001" });
        assert_eq!(
            ApiResponse::classify(response.clone()),
            ApiResponse::Single(response)
        );
    }

    #[test]
    fn test_next_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(is_truthy(&json!("http://host/next")));
        assert!(is_truthy(&json!(true)));
    }

    #[test]
    fn test_simplify_envelope_extracts_results() {
        let response = json!({
            "_self": "http://host/ppm/rest/v1/projects",
            "_totalCount": 2,
            "_results": [
                { "_internalId": 1, "code": "PRJ001" },
                { "_internalId": 2, "code": "PRJ002" }
            ]
        });
        assert_eq!(
            simplify(response),
            json!([
                { "_internalId": 1, "code": "PRJ001" },
                { "_internalId": 2, "code": "PRJ002" }
            ])
        );
    }

    #[test]
    fn test_simplify_single_keeps_internal_id_only() {
        let response = json!({
            "_internalId": 1,
            "_self": "http://host/ppm/rest/v1/projects/1",
            "_links": { "manager": "http://host/..." },
            "code": "PRJ001",
            "name": "Project 1"
        });
        assert_eq!(
            simplify(response),
            json!({ "_internalId": 1, "code": "PRJ001", "name": "Project 1" })
        );
    }
}
