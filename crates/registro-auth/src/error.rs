//! Rejections raised while resolving the request's actor.

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::{HeaderValue, StatusCode, header};

/// Challenge sent with every 401.
const CHALLENGE: &str = r#"Bearer realm="registro""#;

/// Why a request could not be bound to an actor.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AuthError {
    /// No `Authorization: Bearer` header.
    #[error("missing authentication token")]
    MissingToken,

    /// The token is not known.
    #[error("unknown token")]
    UnknownToken,

    /// The token maps to an empty username.
    #[error("token has no username")]
    MissingUsername,

    /// The identity backend could not be reached.
    #[error("identity backend failed: {0}")]
    Backend(String),
}

impl AuthError {
    /// 401 for anything the caller can fix, 500 otherwise.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::MissingToken | AuthError::UnknownToken | AuthError::MissingUsername => {
                StatusCode::UNAUTHORIZED
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(serde_json::json!({
            "error": self.to_string(),
            "code": "AUTHENTICATION_REQUIRED",
        }));
        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(CHALLENGE));
        }
        response
    }
}
