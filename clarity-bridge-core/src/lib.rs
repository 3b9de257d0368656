//! # Clarity Bridge Core
//!
//! Core library for the Clarity PPM bridge.
//!
//! This crate provides the pure domain layer shared by every consumer:
//! - Credential, request, and parameter types
//! - The static request-plan table for every supported resource/operation pair
//! - Filter-expression building for the backend's query language
//! - Backend error-message normalization
//! - Response-envelope classification and simplification
//! - Local required-field and date validation
//!
//! Nothing in this crate performs I/O; the HTTP side lives in
//! `clarity-bridge-client`.

pub mod error;
pub mod filter;
pub mod model;
pub mod plan;
pub mod response;
pub mod validate;

// Re-export commonly used types at crate root
pub use model::{
    AuthType,
    Credential,
    Method,
    Params,
    RequestDescriptor,
    Secret,
    TimesheetStatus,
};

pub use error::{ConfigError, ValidationError, backend_message};

pub use filter::{FilterValue, build_expression};

pub use plan::{Operation, OperationPlan, Resource, lookup};

pub use response::{ApiResponse, simplify};
