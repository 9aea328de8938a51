#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Provides:
//! - [`TokenValidator`]: async token to [`Actor`] resolution
//! - [`StaticTokenValidator`]: fixed token table from configuration
//! - [`AuthLayer`] / [`AuthService`]: Tower middleware over any validator
//! - [`actor_from_parts`]: extension lookup

mod actor;
mod error;
mod middleware;
mod static_tokens;

use std::future::Future;
use std::pin::Pin;

use registro_core::Actor;

pub use actor::actor_from_parts;
pub use error::AuthError;
pub use middleware::{AuthLayer, AuthService};
pub use static_tokens::StaticTokenValidator;

/// Configuration for the auth middleware.
#[derive(Clone, Debug, Default)]
pub struct AuthConfig {
    /// Whether authentication is enabled. When false, all requests pass through.
    pub enabled: bool,
}

/// Resolves a bearer token to the actor it belongs to.
pub trait TokenValidator: Send + Sync + 'static {
    /// Validate a token and return its actor.
    fn validate(
        &self,
        token: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Actor, AuthError>> + Send + '_>>;
}
