//! Domain model types for the Clarity PPM bridge.
//!
//! This module defines the types shared by every layer:
//! - [`Credential`] - A credential record for one Clarity PPM instance
//! - [`AuthType`] - The authentication scheme selector
//! - [`Secret`] - A wrapper for sensitive values that prevents accidental logging
//! - [`Method`] / [`RequestDescriptor`] - The declarative shape of one backend call
//! - [`Params`] - A typed view over a host-supplied parameter bag
//! - [`TimesheetStatus`] - The closed timesheet workflow state enum

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::ConfigError;

/// Base path of the Clarity PPM REST API, appended to the credential host.
pub const API_BASE_PATH: &str = "/ppm/rest/v1";

/// Session login endpoint (POST, Basic-authorized).
pub const LOGIN_PATH: &str = "/auth/login";

/// Session logout endpoint (DELETE, token-authorized).
pub const LOGOUT_PATH: &str = "/auth/logout";

/// Endpoint probed to confirm a credential set is usable.
pub const USER_PROFILE_PATH: &str = "/virtual/userProfile";

/// Page size used by the pagination walker when the caller supplies none.
pub const DEFAULT_PAGE_LIMIT: u64 = 100;

/// Result cap used by bounded list operations when the caller supplies none.
pub const DEFAULT_LIST_LIMIT: u64 = 50;

/// A secret value that prevents accidental exposure in logs.
///
/// The inner value is only accessible via [`expose()`](Secret::expose).
/// Debug and Display implementations show `[REDACTED]` instead of the
/// value, and the buffer is zeroed when the secret is dropped.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Secret(String);

impl Secret {
    /// Create a new secret from a string value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Expose the secret value.
    ///
    /// Use sparingly and never log the result.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret([REDACTED])")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Secret {}

impl From<&str> for Secret {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Authentication scheme used against the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthType {
    /// JWT API key sent as a bearer token, paired with a client ID header.
    ApiKey,

    /// Username and password sent as a Basic authorization header.
    Basic,

    /// Session token obtained from the login endpoint and released on logout.
    SessionToken,
}

impl AuthType {
    /// Get the scheme selector as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApiKey => "api-key",
            Self::Basic => "basic",
            Self::SessionToken => "session-token",
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A credential record for one Clarity PPM instance.
///
/// Which optional fields must be present depends on [`AuthType`];
/// [`validate`](Credential::validate) enforces that before any request is
/// attempted. The host is stored without a trailing slash so endpoint
/// paths concatenate cleanly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// Base URL of the instance, e.g. `https://clarity.example.com:8080`.
    pub host: String,

    /// Selected authentication scheme.
    pub auth_type: AuthType,

    /// Username, required for `basic` and `session-token`.
    pub username: Option<String>,

    /// Password, required for `basic` and `session-token`.
    pub password: Option<Secret>,

    /// JWT API key, required for `api-key`.
    pub api_key: Option<Secret>,

    /// Client application identifier, required for `api-key`.
    pub client_id: Option<String>,
}

impl Credential {
    /// Create a credential with the given host and scheme.
    ///
    /// Any trailing slash on the host is stripped.
    pub fn new(host: impl Into<String>, auth_type: AuthType) -> Self {
        Self {
            host: host.into().trim_end_matches('/').to_string(),
            auth_type,
            username: None,
            password: None,
            api_key: None,
            client_id: None,
        }
    }

    /// Attach a username and password.
    pub fn with_login(mut self, username: impl Into<String>, password: impl Into<Secret>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Attach an API key and client ID.
    pub fn with_api_key(mut self, api_key: impl Into<Secret>, client_id: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self.client_id = Some(client_id.into());
        self
    }

    /// Check that the host parses as an absolute URL and that every field
    /// the selected scheme needs is present and non-empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.host).map_err(|e| ConfigError {
            message: format!("invalid host URL '{}': {}", self.host, e),
        })?;

        let missing = |field: &str| ConfigError {
            message: format!(
                "{} authentication requires the '{}' credential field",
                self.auth_type, field
            ),
        };

        match self.auth_type {
            AuthType::ApiKey => {
                if self.api_key.as_ref().map(Secret::expose).unwrap_or("").is_empty() {
                    return Err(missing("apiKey"));
                }
                if self.client_id.as_deref().unwrap_or("").is_empty() {
                    return Err(missing("clientId"));
                }
            }
            AuthType::Basic | AuthType::SessionToken => {
                if self.username.as_deref().unwrap_or("").is_empty() {
                    return Err(missing("username"));
                }
                if self.password.as_ref().map(Secret::expose).unwrap_or("").is_empty() {
                    return Err(missing("password"));
                }
            }
        }

        Ok(())
    }

    /// Full REST base URL: `{host}/ppm/rest/v1`.
    pub fn base_url(&self) -> String {
        format!("{}{}", self.host.trim_end_matches('/'), API_BASE_PATH)
    }
}

/// HTTP methods the backend surface uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Patch,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Declarative shape of one backend call: method, endpoint path relative
/// to the REST base, and body/query maps.
///
/// An empty body or query map is omitted entirely from the outgoing call,
/// never sent as `{}`.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub path: String,
    pub body: Map<String, Value>,
    pub query: Map<String, Value>,
}

impl RequestDescriptor {
    /// Create a descriptor with empty body and query.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: Map::new(),
            query: Map::new(),
        }
    }

    /// Replace the body map.
    pub fn with_body(mut self, body: Map<String, Value>) -> Self {
        self.body = body;
        self
    }

    /// Replace the query map.
    pub fn with_query(mut self, query: Map<String, Value>) -> Self {
        self.query = query;
        self
    }
}

/// Typed view over a host-supplied parameter bag.
///
/// The host's parameter extraction is treated as an opaque source of
/// already-validated values; this wrapper only offers shape-checked
/// accessors over the underlying JSON object. Accessors return `None`
/// when the key is absent or has a different shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Params(Map<String, Value>);

impl Params {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Raw value accessor.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String accessor.
    pub fn string(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Boolean accessor.
    pub fn boolean(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    /// Integer accessor.
    pub fn integer(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(Value::as_i64)
    }

    /// Unsigned accessor.
    pub fn unsigned(&self, key: &str) -> Option<u64> {
        self.0.get(key).and_then(Value::as_u64)
    }

    /// Object accessor.
    pub fn object(&self, key: &str) -> Option<&Map<String, Value>> {
        self.0.get(key).and_then(Value::as_object)
    }

    /// Nested bag accessor: `filters`, `options`, `additionalFields` and
    /// the like. Absent or non-object values read as an empty bag.
    pub fn section(&self, key: &str) -> Params {
        self.object(key).cloned().map(Params).unwrap_or_default()
    }

    /// View of the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume the bag and return the underlying map.
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Params {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Value> for Params {
    /// Non-object values read as an empty bag.
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }
}

/// Timesheet workflow states as the backend encodes them.
///
/// The bridge never validates transitions; the backend is the authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimesheetStatus {
    Open = 0,
    Submitted = 1,
    Returned = 2,
    Approved = 3,
}

impl TimesheetStatus {
    /// Numeric status code used on the wire.
    pub fn code(self) -> u8 {
        self as u8
    }
}
