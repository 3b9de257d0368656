//! Top-level error type for the client crate.

use serde_json::json;
use thiserror::Error;

use clarity_bridge_core::error::{ConfigError, ValidationError, backend_message};

use crate::transport::TransportError;

/// Every failure the bridge surfaces to a host.
///
/// Nothing here is retried internally; each variant propagates straight
/// to the dispatcher's per-item boundary.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// A credential field required by the selected scheme is missing.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A session token was requested before a successful login.
    #[error("not authenticated: no session token held; call login() first")]
    NotAuthenticated,

    /// A transport- or backend-level failure, with the message already
    /// normalized from the backend's error shape.
    #[error("backend request failed: {message}")]
    Backend {
        message: String,
        #[source]
        source: Option<TransportError>,
    },

    /// Required operation fields were missing before any request was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A host-supplied parameter had an unusable shape.
    #[error("invalid parameter '{name}': {message}")]
    Parameter { name: String, message: String },
}

impl BridgeError {
    /// The message a host should show for this failure.
    ///
    /// Backend failures expose the normalized backend message without the
    /// variant prefix, matching what continue-on-failure error records
    /// carry.
    pub fn message(&self) -> String {
        match self {
            Self::Backend { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Normalize a transport failure into a backend error.
    ///
    /// HTTP-status failures run the backend's error body through the
    /// message cascade; failures without a body synthesize a `{message}`
    /// shape so the same cascade applies.
    pub(crate) fn from_transport(err: TransportError) -> Self {
        let message = match &err {
            TransportError::Status { status, body } => match body {
                Some(body) => backend_message(body),
                None => backend_message(&json!({
                    "message": format!("backend returned HTTP {}", status)
                })),
            },
            TransportError::Network { message } | TransportError::Decode { message } => {
                backend_message(&json!({ "message": message }))
            }
        };

        Self::Backend {
            message,
            source: Some(err),
        }
    }
}
