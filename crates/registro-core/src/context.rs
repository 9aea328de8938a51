//! Per-request caller context.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::SessionId;

/// The logged-in person making a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    /// Login name
    pub username: String,
}

impl Actor {
    /// Creates an actor.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.username)
    }
}

/// Who is asking, and from which browser session.
///
/// Passed explicitly to every workflow operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Browser session
    pub session: SessionId,
    /// Logged-in actor, if any
    pub actor: Option<Actor>,
}

impl RequestContext {
    /// Context for an anonymous request.
    pub fn anonymous(session: SessionId) -> Self {
        Self {
            session,
            actor: None,
        }
    }

    /// Context for a request made by `actor`.
    pub fn with_actor(session: SessionId, actor: Actor) -> Self {
        Self {
            session,
            actor: Some(actor),
        }
    }

    /// Username of the actor, if logged in.
    pub fn username(&self) -> Option<&str> {
        self.actor.as_ref().map(|a| a.username.as_str())
    }
}
