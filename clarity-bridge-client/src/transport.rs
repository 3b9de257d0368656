//! HTTP transport abstraction.
//!
//! The executor and session manager talk to the backend through the
//! [`Transport`] trait so tests can substitute a scripted transport and
//! hosts can bring their own HTTP stack. [`HttpTransport`] is the
//! default `reqwest`-backed implementation.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use clarity_bridge_core::Method;

/// One fully-resolved outgoing call: absolute URL, headers already
/// derived, body and query already reduced (empty maps omitted).
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,

    /// JSON body; `None` when the descriptor's body map was empty.
    pub body: Option<Value>,

    /// Query pairs; an empty vec sends no query string.
    pub query: Vec<(String, String)>,
}

impl TransportRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            query: Vec::new(),
        }
    }
}

/// Error type for transport operations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The backend answered with a non-success status.
    #[error("backend returned HTTP {status}")]
    Status {
        status: u16,
        /// Decoded error body, when the backend sent one.
        body: Option<Value>,
    },

    /// The call never produced a response.
    #[error("network error: {message}")]
    Network { message: String },

    /// The response body was not valid JSON.
    #[error("response decoding failed: {message}")]
    Decode { message: String },
}

/// Abstraction over the HTTP round-trip.
///
/// Implementations resolve a [`TransportRequest`] to the decoded JSON
/// response body, or a [`TransportError`]. Timeouts and connection
/// policy belong here; the layers above never retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<Value, TransportError>;
}

/// Default transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<Value, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| TransportError::Network {
            message: e.to_string(),
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| TransportError::Network {
            message: e.to_string(),
        })?;

        if !status.is_success() {
            let body = serde_json::from_str(&text).ok();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        if text.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| TransportError::Decode {
            message: e.to_string(),
        })
    }
}
