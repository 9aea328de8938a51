//! Storage-layer errors.

use thiserror::Error;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by a record store backend.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
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

    /// The record being updated does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Record type
        entity: &'static str,
        /// Requested identifier
        id: String,
    },

    /// A referenced record does not exist.
    #[error("referenced {entity} {id} does not exist")]
    MissingReference {
        /// Referenced record type
        entity: &'static str,
        /// Referenced identifier
        id: String,
    },

    /// A stored value could not be decoded.
    #[error("corrupt stored value: {0}")]
    Corrupt(String),

    /// Backend failure (poisoned lock, connection, ...).
    #[error("backend error: {0}")]
    Backend(String),

    /// SQL driver error.
    #[cfg(feature = "sqlite")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Error {
    /// Creates a conflict error.
    pub fn conflict(entity: &'static str, field: &'static str, value: impl Into<String>) -> Self {
        Error::Conflict {
            entity,
            field,
            value: value.into(),
        }
    }

    /// Creates a not-found error.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Error::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Creates a missing-reference error.
    pub fn missing_reference(entity: &'static str, id: impl ToString) -> Self {
        Error::MissingReference {
            entity,
            id: id.to_string(),
        }
    }

    pub(crate) fn poisoned() -> Self {
        Error::Backend("record store lock poisoned".to_string())
    }
}

impl From<Error> for registro_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Conflict {
                entity,
                field,
                value,
            } => registro_core::Error::conflict(entity, field, value),
            Error::NotFound { entity, id } | Error::MissingReference { entity, id } => {
                registro_core::Error::NotFound { entity, id }
            }
            other => registro_core::Error::store_with_source("record store failure", other),
        }
    }
}
