#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Registro Core Library
//!
//! Record types, choice tables, validation schemas and the shared error type.
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`types`]: Record types, identifiers and choice tables
//! - [`validation`]: Declarative form schemas and the generic validator
//! - [`context`]: Per-request actor and session context
//! - [`traits`]: Configuration management trait

pub mod context;
pub mod error;
pub mod traits;
pub mod types;
pub mod validation;

// Re-exports for convenience
pub use context::{Actor, RequestContext};
pub use error::{Error, ErrorKind, Result};
pub use types::{
    AssignmentId, EquipmentId, InstitutionId, LocationId, MaintenanceId, SessionId, SurveyId,
};
pub use validation::{FieldErrors, FormData};
