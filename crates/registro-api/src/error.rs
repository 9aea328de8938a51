//! Mapping of workflow errors to HTTP responses

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::Serialize;
use thiserror::Error;

use registro_core::{ErrorKind, FieldErrors};
use registro_workflows::Level;

use crate::router::paths;
use crate::session::SeeOther;

/// Errors returned by HTTP handlers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    /// Error raised by a workflow
    #[error(transparent)]
    Workflow(#[from] registro_core::Error),

    /// Path segment that is not a record id
    #[error("Invalid {entity} id: {raw}")]
    InvalidId {
        /// Record kind
        entity: &'static str,
        /// Offending segment
        raw: String,
    },
}

/// Result type alias for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// User-visible message
    pub error: String,
    /// Machine-readable code
    pub code: &'static str,
    /// Per-field messages on validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errores: Option<FieldErrors>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = match self {
            ApiError::Workflow(err) => err,
            ApiError::InvalidId { entity, raw } => {
                tracing::debug!(entity, raw = %raw, "Unparseable record id");
                let body = ErrorResponse {
                    error: format!("No se encontró el registro de {entity}"),
                    code: "NOT_FOUND",
                    errores: None,
                };
                return (StatusCode::NOT_FOUND, Json(body)).into_response();
            }
        };

        let (status, code) = match err.kind() {
            ErrorKind::ValidationFailed => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ErrorKind::UniquenessConflict => (StatusCode::CONFLICT, "CONFLICT"),
            ErrorKind::StoreFailure => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            // Out-of-order survey step: back to the institution picker
            ErrorKind::PreconditionFailed => {
                return SeeOther::new(paths::SELECT_INSTITUTION)
                    .with_flash(Level::Warning, err.user_message())
                    .into_response();
            }
        };

        let body = ErrorResponse {
            error: err.user_message(),
            code,
            errores: err.field_errors().cloned(),
        };
        (status, Json(body)).into_response()
    }
}

/// Parses a path segment into a record id.
pub fn parse_id<T: std::str::FromStr>(entity: &'static str, raw: &str) -> ApiResult<T> {
    raw.parse().map_err(|_| ApiError::InvalidId {
        entity,
        raw: raw.to_string(),
    })
}
