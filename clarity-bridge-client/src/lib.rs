//! # Clarity Bridge Client
//!
//! HTTP client layer for the Clarity PPM bridge.
//!
//! This crate provides:
//! - [`Transport`] - the HTTP seam, with a `reqwest`-backed default
//! - Authentication header derivation and the session-token lifecycle
//! - [`ClarityClient`] - single-request execution and the pagination walker
//! - [`run_batch`] - the operation dispatcher with per-item error policy
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use clarity_bridge_client::{Batch, ClarityClient, StaticCredentials, run_batch};
//! use clarity_bridge_core::{AuthType, Credential, Operation, Params, Resource};
//!
//! async fn list_projects() -> Result<(), clarity_bridge_client::BridgeError> {
//!     let credential = Credential::new("https://clarity.example.com", AuthType::ApiKey)
//!         .with_api_key("jwt-key", "CLIENT_MY-APP");
//!     let client = ClarityClient::new(Arc::new(StaticCredentials::new(credential)));
//!
//!     let batch = Batch::single(Resource::Project, Operation::GetMany, Params::new());
//!     let records = run_batch(&client, &batch).await?;
//!     println!("{} records", records.len());
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod dispatch;
pub mod error;
pub mod transport;

// Re-export commonly used types at crate root
pub use auth::{SessionManager, static_headers};

pub use client::{ClarityClient, CredentialProvider, StaticCredentials};

pub use dispatch::{Batch, ItemResult, run_batch};

pub use error::BridgeError;

pub use transport::{HttpTransport, Transport, TransportError, TransportRequest};
