//! Session cookie, request context and flash plumbing.
//!
//! [`track`] runs around every route. It reads or mints the
//! `registro_session` cookie, exposes the [`SessionId`] to handlers through
//! the request extensions, and queues any [`FlashMessage`] a handler left in
//! its response extensions.

use std::convert::Infallible;

use axum::Json;
use axum::extract::{FromRequestParts, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use http::request::Parts;
use serde::Serialize;

use registro_core::{RequestContext, SessionId};
use registro_workflows::{Flash, FlashMessage, Level};

use crate::error::ApiResult;
use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "registro_session";

fn session_cookie(id: SessionId) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Session middleware, installed with `from_fn_with_state`.
pub async fn track(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let existing = jar
        .get(SESSION_COOKIE)
        .and_then(|c| c.value().parse::<SessionId>().ok());
    let (session, fresh) = match existing {
        Some(id) => (id, false),
        None => (SessionId::new(), true),
    };
    req.extensions_mut().insert(session);

    let mut response = next.run(req).await;

    if let Some(flash) = response.extensions_mut().remove::<FlashMessage>() {
        if let Err(err) =
            Flash::push(state.sessions(), session, flash.level, flash.message).await
        {
            tracing::error!(session = %session, error = %err, "Could not queue flash message");
        }
    }

    if fresh {
        tracing::debug!(session = %session, "Session started");
        (jar.add(session_cookie(session)), response).into_response()
    } else {
        response
    }
}

// ============================================================================
// Extractors
// ============================================================================

/// The [`RequestContext`] of the current request.
///
/// Session comes from [`track`]; the actor, when present, from the auth
/// middleware.
#[derive(Debug, Clone)]
pub struct Ctx(pub RequestContext);

impl<S: Send + Sync> FromRequestParts<S> for Ctx {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<SessionId>()
            .copied()
            .unwrap_or_default();
        let ctx = match registro_auth::actor_from_parts(parts) {
            Some(actor) => RequestContext::with_actor(session, actor.clone()),
            None => RequestContext::anonymous(session),
        };
        Ok(Ctx(ctx))
    }
}

// ============================================================================
// Responses
// ============================================================================

/// A rendered page: its context plus the flash messages it consumed.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    /// Flash messages queued by earlier requests
    pub mensajes: Vec<FlashMessage>,
    /// Page context
    pub contexto: T,
}

impl<T: Serialize> Page<T> {
    /// Drains the session's flash queue into a page.
    pub async fn render(state: &AppState, ctx: &RequestContext, contexto: T) -> ApiResult<Json<Self>> {
        let mensajes = Flash::drain(state.sessions(), ctx.session).await?;
        Ok(Json(Self { mensajes, contexto }))
    }
}

/// `303 See Other`, optionally queueing a flash message.
#[derive(Debug, Clone)]
pub struct SeeOther {
    location: String,
    flash: Option<FlashMessage>,
}

impl SeeOther {
    /// Redirect to `location`.
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            flash: None,
        }
    }

    /// Queue `message` for the next rendered page.
    pub fn with_flash(mut self, level: Level, message: impl Into<String>) -> Self {
        self.flash = Some(FlashMessage {
            level,
            message: message.into(),
        });
        self
    }

    /// Queue a success message.
    pub fn success(self, message: impl Into<String>) -> Self {
        self.with_flash(Level::Success, message)
    }
}

impl IntoResponse for SeeOther {
    fn into_response(self) -> Response {
        let mut response = Redirect::to(&self.location).into_response();
        if let Some(flash) = self.flash {
            response.extensions_mut().insert(flash);
        }
        response
    }
}
