#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Registro Storage
//!
//! - [`traits`]: One store trait per record type and the [`RecordStore`] umbrella
//! - [`memory`]: In-memory backend
//! - [`sqlite`]: SQLite backend (feature `sqlite`)

pub mod error;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod traits;

pub use error::{Error, Result};
pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
pub use traits::{
    AssignmentStore, EquipmentStore, InstitutionStore, LocationStore, MaintenanceStore,
    RecordStore, SurveyStore,
};
