//! Authentication header derivation and session lifecycle.
//!
//! Two of the backend's three schemes are pure header derivations from
//! the credential record; the third holds a mutable session token
//! obtained from the login endpoint. The token is owned exclusively by
//! one [`SessionManager`], created by an explicit [`login`] and released
//! by an explicit [`logout`] - it is never persisted.
//!
//! [`login`]: SessionManager::login
//! [`logout`]: SessionManager::logout

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};

use clarity_bridge_core::error::ConfigError;
use clarity_bridge_core::model::{LOGIN_PATH, LOGOUT_PATH};
use clarity_bridge_core::{AuthType, Credential, Method, Secret};

use crate::error::BridgeError;
use crate::transport::{Transport, TransportRequest};

pub(crate) const CONTENT_TYPE: (&str, &str) = ("Content-Type", "application/json");

/// Header carrying the client application identifier for api-key auth.
pub const CLIENT_ID_HEADER: &str = "x-api-ppm-client";

/// Render a `Basic` authorization value from a username and password.
pub fn basic_value(username: &str, password: &Secret) -> String {
    let encoded = BASE64.encode(format!("{}:{}", username, password.expose()));
    format!("Basic {}", encoded)
}

/// Derive the request headers for the two pure schemes.
///
/// - `api-key`: `Authorization: Bearer <key>` plus the client ID header.
/// - `basic`: `Authorization: Basic base64(username:password)`.
///
/// Session-token credentials have no static headers; their Authorization
/// value lives in the [`SessionManager`].
pub fn static_headers(credential: &Credential) -> Result<Vec<(String, String)>, ConfigError> {
    credential.validate()?;

    let mut headers = vec![(CONTENT_TYPE.0.to_string(), CONTENT_TYPE.1.to_string())];

    match credential.auth_type {
        AuthType::ApiKey => {
            // validate() guarantees both fields are present
            let api_key = credential.api_key.as_ref().map(Secret::expose).unwrap_or("");
            let client_id = credential.client_id.as_deref().unwrap_or("");
            headers.push(("Authorization".to_string(), format!("Bearer {}", api_key)));
            headers.push((CLIENT_ID_HEADER.to_string(), client_id.to_string()));
        }
        AuthType::Basic => {
            let username = credential.username.as_deref().unwrap_or("");
            let password = credential.password.clone().unwrap_or_else(|| Secret::new(""));
            headers.push(("Authorization".to_string(), basic_value(username, &password)));
        }
        AuthType::SessionToken => {
            return Err(ConfigError {
                message: "session-token credentials resolve through the session manager"
                    .to_string(),
            });
        }
    }

    Ok(headers)
}

/// Owner of the mutable session token for session-token authentication.
///
/// Lifecycle: [`login`](Self::login) acquires the token with one POST to
/// the login endpoint; [`logout`](Self::logout) releases it with a DELETE
/// and clears the held token even when that call fails. The token is
/// used verbatim as the `Authorization` value between those two points.
///
/// Login/use/logout is not reentrant; one manager must not be shared
/// across concurrent batches without external synchronization.
pub struct SessionManager<T: Transport> {
    transport: Arc<T>,
    token: Mutex<Option<Secret>>,
}

impl<T: Transport> SessionManager<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            token: Mutex::new(None),
        }
    }

    /// Perform the login call and store the returned token.
    ///
    /// The login endpoint takes Basic credentials and answers with an
    /// `authToken` string, used verbatim on all subsequent requests for
    /// this session.
    pub async fn login(&self, credential: &Credential) -> Result<(), BridgeError> {
        credential.validate()?;

        let username = credential.username.as_deref().unwrap_or("");
        let password = credential.password.clone().unwrap_or_else(|| Secret::new(""));

        let url = format!("{}{}", credential.base_url(), LOGIN_PATH);
        let mut request = TransportRequest::new(Method::Post, url);
        request.headers = vec![
            (CONTENT_TYPE.0.to_string(), CONTENT_TYPE.1.to_string()),
            ("Authorization".to_string(), basic_value(username, &password)),
        ];

        let response = self
            .transport
            .send(request)
            .await
            .map_err(BridgeError::from_transport)?;

        let token = response
            .get("authToken")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| BridgeError::Backend {
                message: "login response did not contain an authToken".to_string(),
                source: None,
            })?;

        *self.token.lock() = Some(Secret::new(token));
        info!(host = %credential.host, "session login succeeded");

        Ok(())
    }

    /// Terminate the session.
    ///
    /// The held token is cleared before the result of the DELETE call is
    /// known, so the session is released locally even when the backend
    /// call fails; the failure is still reported. Calling this without a
    /// held token is a no-op.
    pub async fn logout(&self, credential: &Credential) -> Result<(), BridgeError> {
        let token = self.token.lock().take();
        let Some(token) = token else {
            return Ok(());
        };

        let url = format!("{}{}", credential.base_url(), LOGOUT_PATH);
        let mut request = TransportRequest::new(Method::Delete, url);
        request.headers = vec![
            (CONTENT_TYPE.0.to_string(), CONTENT_TYPE.1.to_string()),
            ("Authorization".to_string(), token.expose().to_string()),
        ];

        match self.transport.send(request).await {
            Ok(_) => {
                info!(host = %credential.host, "session logout succeeded");
                Ok(())
            }
            Err(err) => {
                warn!(host = %credential.host, error = %err, "session logout failed; token released locally");
                Err(BridgeError::from_transport(err))
            }
        }
    }

    /// The current session token.
    ///
    /// Fails with [`BridgeError::NotAuthenticated`] before a successful
    /// login or after logout.
    pub fn token(&self) -> Result<Secret, BridgeError> {
        self.token
            .lock()
            .clone()
            .ok_or(BridgeError::NotAuthenticated)
    }

    /// Whether a login has succeeded and not yet been released.
    pub fn is_authenticated(&self) -> bool {
        self.token.lock().is_some()
    }
}
