//! Token table validator.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use registro_core::Actor;

use crate::{AuthError, TokenValidator};

/// Accepts a fixed set of tokens, each bound to one username.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenValidator {
    tokens: HashMap<String, String>,
}

impl StaticTokenValidator {
    /// Creates a validator from a token to username table.
    pub fn new(tokens: HashMap<String, String>) -> Self {
        Self { tokens }
    }

    /// Adds one token.
    pub fn with_token(mut self, token: impl Into<String>, username: impl Into<String>) -> Self {
        self.tokens.insert(token.into(), username.into());
        self
    }

    /// Number of known tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True when no token is accepted.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl TokenValidator for StaticTokenValidator {
    fn validate(
        &self,
        token: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Actor, AuthError>> + Send + '_>> {
        let result = match self.tokens.get(token) {
            Some(username) if username.trim().is_empty() => Err(AuthError::MissingUsername),
            Some(username) => Ok(Actor::new(username.trim())),
            None => Err(AuthError::UnknownToken),
        };
        Box::pin(async move { result })
    }
}
