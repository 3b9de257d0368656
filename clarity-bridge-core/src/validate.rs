//! Local pre-flight validation helpers.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::ValidationError;

/// A date string that does not parse as ISO 8601.
#[derive(Debug, Error)]
#[error("invalid date format: {input}")]
pub struct DateFormatError {
    pub input: String,
}

/// Check that every required field is present and usable in a parameter
/// map before a request is built.
///
/// A field counts as missing when it is absent, null, or an empty string.
/// All missing fields are reported together, in the order they were
/// required.
pub fn required_fields(
    data: &Map<String, Value>,
    required: &[&str],
    operation: &str,
) -> Result<(), ValidationError> {
    let missing: Vec<String> = required
        .iter()
        .filter(|field| match data.get(**field) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(_) => false,
        })
        .map(|field| field.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError {
            operation: operation.to_string(),
            missing,
        })
    }
}

/// Normalize a date string to RFC 3339.
///
/// The backend accepts ISO 8601 timestamps; bare dates are read as UTC
/// midnight. Anything else is rejected before it reaches the wire.
pub fn normalize_date(input: &str) -> Result<String, DateFormatError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        return Ok(parsed.with_timezone(&Utc).to_rfc3339());
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S") {
        return Ok(parsed.and_utc().to_rfc3339());
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        let midnight = parsed.and_hms_opt(0, 0, 0).unwrap_or_default();
        return Ok(midnight.and_utc().to_rfc3339());
    }

    Err(DateFormatError {
        input: input.to_string(),
    })
}
