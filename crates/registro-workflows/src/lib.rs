#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::sync::Arc;

use registro_core::{Error, ErrorKind};
use registro_storage::RecordStore;

pub mod inventory;
pub mod reports;
pub mod session;
pub mod survey;
pub mod views;

pub use inventory::InventoryWorkflow;
pub use reports::Reports;
pub use session::{
    DEFAULT_SESSION_TTL, Flash, FlashMessage, Level, MemorySessionStore, PendingSelection,
    SessionStore,
};
pub use survey::{SavedSurvey, SurveyStage, SurveyWorkflow};
pub use views::FormPage;

/// Every workflow over one record store and one session store.
#[derive(Clone)]
pub struct Workflows {
    /// Institutions and surveys
    pub survey: SurveyWorkflow,
    /// Equipment, locations, maintenance, assignments
    pub inventory: InventoryWorkflow,
    /// Dashboards
    pub reports: Reports,
    /// Session state shared with the survey workflow
    pub sessions: Arc<dyn SessionStore>,
}

impl Workflows {
    /// Wires the workflows together.
    pub fn new(store: Arc<dyn RecordStore>, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            survey: SurveyWorkflow::new(store.clone(), sessions.clone()),
            inventory: InventoryWorkflow::new(store.clone()),
            reports: Reports::new(store),
            sessions,
        }
    }
}

/// Converts a storage error, logging backend failures.
pub(crate) fn store_err(err: registro_storage::Error) -> Error {
    let err = Error::from(err);
    if err.kind() == ErrorKind::StoreFailure {
        tracing::error!(error = %err, "Record store failure");
    }
    err
}
