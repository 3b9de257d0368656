//! The authenticated backend client: single-request execution and the
//! pagination walker.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

use clarity_bridge_core::model::{DEFAULT_PAGE_LIMIT, USER_PROFILE_PATH};
use clarity_bridge_core::response::ApiResponse;
use clarity_bridge_core::{AuthType, Credential, Method, RequestDescriptor};

use crate::auth::{self, SessionManager};
use crate::error::BridgeError;
use crate::transport::{HttpTransport, Transport, TransportRequest};

/// Source of the credential record, resolved per request.
///
/// Credential storage and decryption belong to the host; the bridge only
/// asks for the current record. [`StaticCredentials`] covers hosts that
/// resolve once up front.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn resolve(&self) -> Result<Credential, BridgeError>;
}

/// Credential provider holding one fixed record.
pub struct StaticCredentials(Credential);

impl StaticCredentials {
    pub fn new(credential: Credential) -> Self {
        Self(credential)
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn resolve(&self) -> Result<Credential, BridgeError> {
        Ok(self.0.clone())
    }
}

/// Authenticated client for one backend instance.
///
/// Owns the transport, the credential provider, and - for session-token
/// credentials - the session manager. One request is outstanding at a
/// time; the layers above drive it strictly sequentially.
pub struct ClarityClient<T: Transport = HttpTransport> {
    transport: Arc<T>,
    provider: Arc<dyn CredentialProvider>,
    session: SessionManager<T>,
}

impl ClarityClient<HttpTransport> {
    /// Create a client over the default `reqwest` transport.
    pub fn new(provider: Arc<dyn CredentialProvider>) -> Self {
        Self::with_transport(HttpTransport::new(), provider)
    }
}

impl<T: Transport> ClarityClient<T> {
    /// Create a client over a custom transport.
    pub fn with_transport(transport: T, provider: Arc<dyn CredentialProvider>) -> Self {
        let transport = Arc::new(transport);
        Self {
            session: SessionManager::new(Arc::clone(&transport)),
            transport,
            provider,
        }
    }

    /// The session manager owning this client's session token.
    pub fn session(&self) -> &SessionManager<T> {
        &self.session
    }

    /// Acquire a session token when the credential uses session-token
    /// auth; a no-op for the other schemes.
    pub async fn login(&self) -> Result<(), BridgeError> {
        let credential = self.provider.resolve().await?;
        match credential.auth_type {
            AuthType::SessionToken => self.session.login(&credential).await,
            _ => Ok(()),
        }
    }

    /// Release the session token when one is held; a no-op otherwise.
    pub async fn logout(&self) -> Result<(), BridgeError> {
        let credential = self.provider.resolve().await?;
        self.session.logout(&credential).await
    }

    /// Execute one backend call.
    ///
    /// Resolves the credential, derives headers for its scheme, and sends
    /// the request with empty body/query omitted. On success the decoded
    /// response body is returned unchanged; on failure the error message
    /// is normalized from the backend's error shape. Never retried.
    pub async fn execute(&self, request: RequestDescriptor) -> Result<Value, BridgeError> {
        let credential = self.provider.resolve().await?;

        let headers = match credential.auth_type {
            AuthType::SessionToken => {
                let token = self.session.token()?;
                vec![
                    (
                        auth::CONTENT_TYPE.0.to_string(),
                        auth::CONTENT_TYPE.1.to_string(),
                    ),
                    ("Authorization".to_string(), token.expose().to_string()),
                ]
            }
            _ => auth::static_headers(&credential)?,
        };

        debug!(method = %request.method, path = %request.path, "backend request");

        let mut outgoing = TransportRequest::new(
            request.method,
            format!("{}{}", credential.base_url(), request.path),
        );
        outgoing.headers = headers;
        if !request.body.is_empty() {
            outgoing.body = Some(Value::Object(request.body));
        }
        outgoing.query = query_pairs(&request.query);

        self.transport
            .send(outgoing)
            .await
            .map_err(BridgeError::from_transport)
    }

    /// Fetch every record of a list endpoint by walking its pages.
    ///
    /// Seeds `limit` from the caller's query (default 100) and `offset`
    /// from 0, then advances `offset += limit` while the envelope signals
    /// a further page. A bare single-record response short-circuits after
    /// one call. No page-count ceiling is enforced; a backend that always
    /// signals another page will loop until the transport gives up.
    pub async fn fetch_all(&self, request: RequestDescriptor) -> Result<Vec<Value>, BridgeError> {
        let mut request = request;
        let limit = request
            .query
            .get("limit")
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_PAGE_LIMIT);
        request.query.insert("limit".to_string(), limit.into());

        let mut offset: u64 = 0;
        let mut records = Vec::new();

        loop {
            request.query.insert("offset".to_string(), offset.into());

            let response = self.execute(request.clone()).await?;
            match ApiResponse::classify(response) {
                ApiResponse::Page {
                    mut results,
                    has_next,
                    ..
                } => {
                    records.append(&mut results);
                    if !has_next {
                        break;
                    }
                    offset += limit;
                }
                ApiResponse::Single(record) => {
                    records.push(record);
                    break;
                }
            }
        }

        Ok(records)
    }

    /// Probe the fixed user-profile endpoint to confirm the credential
    /// set is usable.
    pub async fn validate_connection(&self) -> Result<Value, BridgeError> {
        self.execute(RequestDescriptor::new(Method::Get, USER_PROFILE_PATH))
            .await
    }
}

/// Render a query map as string pairs, preserving map order.
fn query_pairs(query: &Map<String, Value>) -> Vec<(String, String)> {
    query
        .iter()
        .map(|(key, value)| {
            let rendered = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), rendered)
        })
        .collect()
}
