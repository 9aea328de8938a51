//! Error types for Registro core library.

use std::path::{Path, PathBuf};

use crate::validation::FieldErrors;

/// Errors that can occur while handling a Registro request.
///
/// Every variant is terminal for the request that produced it: nothing is
/// retried, and each one maps to a user-visible message.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Submitted data violates a field constraint.
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// A referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Record type that was looked up
        entity: &'static str,
        /// Identifier that was not found
        id: String,
    },

    /// The request arrived out of order (e.g. survey without a selection).
    #[error("Precondition failed: {message}")]
    PreconditionFailed {
        /// What was missing
        message: String,
    },

    /// A unique key is already taken.
    #[error("{entity} with {field} '{value}' already exists")]
    Conflict {
        /// Record type
        entity: &'static str,
        /// Form field name of the unique key
        field: &'static str,
        /// Offending value
        value: String,
    },

    /// Any other persistence failure.
    #[error("Store error: {message}")]
    Store {
        /// Human-readable error message
        message: String,
        /// Source error if available
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error on a specific file
    #[error("I/O error at {path}: {source}")]
    IoPath {
        /// File that was being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse classification of [`Error`] used by the HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Field-level validation failure
    ValidationFailed,
    /// Missing record
    NotFound,
    /// Out-of-order request
    PreconditionFailed,
    /// Duplicate unique key
    UniquenessConflict,
    /// Everything else
    StoreFailure,
}

/// Convenience `Result` type alias for Registro operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the coarse kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::ValidationFailed,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::PreconditionFailed { .. } => ErrorKind::PreconditionFailed,
            Error::Conflict { .. } => ErrorKind::UniquenessConflict,
            Error::Store { .. }
            | Error::Config { .. }
            | Error::Io(_)
            | Error::IoPath { .. }
            | Error::Serialization(_) => ErrorKind::StoreFailure,
        }
    }

    /// Message shown to the person filling in the form.
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(_) => "Por favor corrige los errores en el formulario".to_string(),
            Error::NotFound { entity, .. } => format!("No se encontró el registro de {entity}"),
            Error::PreconditionFailed { message } => message.clone(),
            Error::Conflict {
                entity: "institucion",
                field: "codigo_amie",
                ..
            } => "Ya existe una institución con ese código AMIE".to_string(),
            Error::Conflict {
                entity: "asignacion",
                ..
            } => "Este equipo ya tiene una asignación registrada".to_string(),
            Error::Conflict { field, value, .. } => {
                format!("Ya existe un registro con {field} \"{value}\"")
            }
            _ => "Ocurrió un error al acceder a los datos".to_string(),
        }
    }

    /// Creates a validation error for a single field.
    pub fn validation_field<F, M>(field: F, message: M) -> Self
    where
        F: Into<String>,
        M: Into<String>,
    {
        let mut errors = FieldErrors::new();
        errors.add(field, message);
        Error::Validation(errors)
    }

    /// Creates a not-found error.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Error::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Creates a precondition error.
    pub fn precondition<S: Into<String>>(message: S) -> Self {
        Error::PreconditionFailed {
            message: message.into(),
        }
    }

    /// Creates a uniqueness conflict.
    pub fn conflict(entity: &'static str, field: &'static str, value: impl Into<String>) -> Self {
        Error::Conflict {
            entity,
            field,
            value: value.into(),
        }
    }

    /// Creates a store error with a message.
    pub fn store<S: Into<String>>(message: S) -> Self {
        Error::Store {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a store error with a message and source error.
    pub fn store_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Store {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Wraps an I/O error with the path it happened on.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Error::IoPath {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Field errors carried by a validation failure, if any.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Error::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<FieldErrors> for Error {
    fn from(errors: FieldErrors) -> Self {
        Error::Validation(errors)
    }
}
