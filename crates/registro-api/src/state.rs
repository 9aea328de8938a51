//! Application state for API handlers

use std::sync::Arc;

use registro_workflows::{SessionStore, Workflows};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Survey, inventory and dashboard workflows
    pub workflows: Workflows,
}

impl AppState {
    /// Create new application state
    pub fn new(workflows: Workflows) -> Self {
        Self { workflows }
    }

    /// The session store behind the workflows.
    pub fn sessions(&self) -> &dyn SessionStore {
        self.workflows.sessions.as_ref()
    }

    /// A shared handle to the session store.
    pub fn session_store(&self) -> Arc<dyn SessionStore> {
        self.workflows.sessions.clone()
    }
}
