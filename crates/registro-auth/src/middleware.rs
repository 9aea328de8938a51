//! Tower middleware binding requests to an [`Actor`].
//!
//! [`AuthLayer`] wraps a route (or a whole router) in an [`AuthService`].
//! When enabled, every request must carry `Authorization: Bearer <token>`;
//! the token is resolved through the [`TokenValidator`] and the resulting
//! [`Actor`] is inserted into the request extensions. Rejections are
//! answered directly with [`AuthError`]'s response.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::response::{IntoResponse, Response};
use http::{HeaderMap, Request};
use registro_core::Actor;
use tower::{Layer, Service};

use crate::{AuthConfig, AuthError, TokenValidator};

/// Validator plus on/off switch, shared by every service the layer builds.
struct Gate<V> {
    validator: Arc<V>,
    enabled: bool,
}

impl<V: TokenValidator> Gate<V> {
    async fn admit(&self, headers: &HeaderMap) -> Result<Actor, AuthError> {
        let token = bearer_token(headers).ok_or(AuthError::MissingToken)?;
        self.validator.validate(token).await
    }
}

/// Layer producing [`AuthService`]s.
pub struct AuthLayer<V> {
    gate: Arc<Gate<V>>,
}

impl<V> Clone for AuthLayer<V> {
    fn clone(&self) -> Self {
        Self {
            gate: Arc::clone(&self.gate),
        }
    }
}

impl<V: TokenValidator> AuthLayer<V> {
    /// Layer over `validator`; with `config.enabled == false` every request
    /// passes through without an actor.
    pub fn new(validator: Arc<V>, config: AuthConfig) -> Self {
        Self {
            gate: Arc::new(Gate {
                validator,
                enabled: config.enabled,
            }),
        }
    }
}

impl<V, S> Layer<S> for AuthLayer<V> {
    type Service = AuthService<V, S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            gate: Arc::clone(&self.gate),
        }
    }
}

/// Service resolving the actor before calling `S`.
pub struct AuthService<V, S> {
    inner: S,
    gate: Arc<Gate<V>>,
}

impl<V, S: Clone> Clone for AuthService<V, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            gate: Arc::clone(&self.gate),
        }
    }
}

impl<V, S> Service<Request<Body>> for AuthService<V, S>
where
    V: TokenValidator,
    S: Service<Request<Body>, Error = Infallible> + Clone + Send + 'static,
    S::Response: IntoResponse,
    S::Future: Send,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Infallible>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        // Keep the service that was polled ready; leave a fresh clone behind.
        let ready = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, ready);
        let gate = Arc::clone(&self.gate);

        Box::pin(async move {
            if gate.enabled {
                let admitted = gate.admit(req.headers()).await;
                match admitted {
                    Ok(actor) => {
                        log::debug!("{} {} as {}", req.method(), req.uri().path(), actor.username);
                        req.extensions_mut().insert(actor);
                    }
                    Err(err) => {
                        log::warn!("Rejected {} {}: {err}", req.method(), req.uri().path());
                        return Ok(err.into_response());
                    }
                }
            }
            let Ok(response) = inner.call(req).await;
            Ok(response.into_response())
        })
    }
}

/// The credentials of an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(http::header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
