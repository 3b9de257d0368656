//! Backend filter-expression building.
//!
//! List endpoints accept a `filter` query parameter written in the
//! backend's expression language. This module renders structured
//! key/value pairs into that language: one parenthesized clause per
//! entry, joined with `" and "`.

use serde_json::Value;
use std::fmt;

/// A scalar filter value.
///
/// String values render single-quoted; booleans and numbers render as
/// bare literals.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Str(String),
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl FilterValue {
    /// Convert a JSON scalar into a filter value.
    ///
    /// Returns `None` for null, empty strings, and non-scalar values;
    /// callers drop those entries before building an expression.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(Self::Str(s.clone())),
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Self::Int(i))
                } else {
                    n.as_f64().map(Self::Float)
                }
            }
            _ => None,
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "'{}'", s),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for FilterValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

/// Render one `(field = value)` clause.
pub fn clause(field: &str, value: &FilterValue) -> String {
    format!("({} = {})", field, value)
}

/// Build a filter expression from `(field, value)` pairs.
///
/// Entries whose value is an empty string are dropped silently. Clause
/// order follows input order; callers relying on a specific order must
/// supply the pairs in that order. An empty result means "no filter
/// clause" and callers must not send the parameter at all.
///
/// Embedded quote characters in string values are interpolated verbatim;
/// the backend's expression language offers no escape for them and this
/// limitation is carried as-is.
pub fn build_expression<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = (&'a str, FilterValue)>,
{
    let conditions: Vec<String> = entries
        .into_iter()
        .filter(|(_, value)| !matches!(value, FilterValue::Str(s) if s.is_empty()))
        .map(|(field, value)| clause(field, &value))
        .collect();

    conditions.join(" and ")
}
