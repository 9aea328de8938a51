//! Record store contract.
//!
//! One trait per record type, plus the [`RecordStore`] umbrella that every
//! backend gets through a blanket impl. Writes stamp their own timestamps;
//! reads return records in the default order noted on each method.

use async_trait::async_trait;
use rust_decimal::Decimal;

use registro_core::types::{
    Assignment, Equipment, EquipmentFilter, EquipmentType, Institution, Location, Maintenance,
    NewAssignment, NewEquipment, NewInstitution, NewLocation, NewMaintenance, NewSurvey, Survey,
};
use registro_core::{EquipmentId, InstitutionId, LocationId, SurveyId};

use crate::Result;

/// Educational institutions.
#[async_trait]
pub trait InstitutionStore: Send + Sync {
    /// Stores a new institution. `Conflict` on a taken AMIE code.
    async fn insert_institution(&self, new: NewInstitution) -> Result<Institution>;

    /// One institution by id.
    async fn get_institution(&self, id: InstitutionId) -> Result<Option<Institution>>;

    /// All institutions by name.
    async fn list_institutions(&self) -> Result<Vec<Institution>>;

    /// Most recently registered first.
    async fn recent_institutions(&self, limit: usize) -> Result<Vec<Institution>>;

    /// Number of institutions.
    async fn count_institutions(&self) -> Result<u64>;
}

/// Accessibility surveys.
#[async_trait]
pub trait SurveyStore: Send + Sync {
    /// Stores a new survey. `MissingReference` if the institution is gone.
    async fn insert_survey(&self, new: NewSurvey) -> Result<Survey>;

    /// One survey by id.
    async fn get_survey(&self, id: SurveyId) -> Result<Option<Survey>>;

    /// All surveys, newest survey date first.
    async fn list_surveys(&self) -> Result<Vec<Survey>>;

    /// Surveys of one institution, newest survey date first.
    async fn surveys_for_institution(&self, id: InstitutionId) -> Result<Vec<Survey>>;

    /// Most recently registered first.
    async fn recent_surveys(&self, limit: usize) -> Result<Vec<Survey>>;

    /// Number of surveys.
    async fn count_surveys(&self) -> Result<u64>;
}

/// IT equipment.
#[async_trait]
pub trait EquipmentStore: Send + Sync {
    /// Stores new equipment. `Conflict` on a taken inventory code or serial.
    async fn insert_equipment(&self, new: NewEquipment) -> Result<Equipment>;

    /// Replaces the data of existing equipment and refreshes `updated_at`.
    async fn update_equipment(&self, id: EquipmentId, data: NewEquipment) -> Result<Equipment>;

    /// One piece of equipment by id.
    async fn get_equipment(&self, id: EquipmentId) -> Result<Option<Equipment>>;

    /// Equipment matching `filter`, by inventory code.
    async fn list_equipment(&self, filter: &EquipmentFilter) -> Result<Vec<Equipment>>;

    /// Number of pieces matching `filter`.
    async fn count_equipment(&self, filter: &EquipmentFilter) -> Result<u64> {
        Ok(self.list_equipment(filter).await?.len() as u64)
    }

    /// Sum of every equipment cost, zero when empty.
    async fn total_equipment_cost(&self) -> Result<Decimal>;

    /// Count per type, for types with at least one piece, in type order.
    async fn count_equipment_by_type(&self) -> Result<Vec<(EquipmentType, u64)>>;
}

/// Physical locations.
#[async_trait]
pub trait LocationStore: Send + Sync {
    /// Stores a new location.
    async fn insert_location(&self, new: NewLocation) -> Result<Location>;

    /// Replaces the data of an existing location.
    async fn update_location(&self, id: LocationId, data: NewLocation) -> Result<Location>;

    /// One location by id.
    async fn get_location(&self, id: LocationId) -> Result<Option<Location>>;

    /// All locations by area, then room.
    async fn list_locations(&self) -> Result<Vec<Location>>;
}

/// Equipment assignments.
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// Stores an assignment dated today. `Conflict` if the equipment already
    /// has one; `MissingReference` if equipment or location is gone.
    async fn insert_assignment(&self, new: NewAssignment) -> Result<Assignment>;

    /// The assignment of one piece of equipment.
    async fn assignment_for_equipment(&self, id: EquipmentId) -> Result<Option<Assignment>>;

    /// Every assignment, newest first.
    async fn list_assignments(&self) -> Result<Vec<Assignment>>;
}

/// Maintenance log.
#[async_trait]
pub trait MaintenanceStore: Send + Sync {
    /// Stores a maintenance event. `MissingReference` if the equipment is gone.
    async fn insert_maintenance(&self, new: NewMaintenance) -> Result<Maintenance>;

    /// All events, newest maintenance date first.
    async fn list_maintenance(&self) -> Result<Vec<Maintenance>>;

    /// Events of one piece of equipment, newest maintenance date first.
    async fn maintenance_for_equipment(&self, id: EquipmentId) -> Result<Vec<Maintenance>>;

    /// The `limit` newest events by maintenance date.
    async fn recent_maintenance(&self, limit: usize) -> Result<Vec<Maintenance>>;

    /// Number of events.
    async fn count_maintenance(&self) -> Result<u64>;
}

/// Every record store trait at once.
pub trait RecordStore:
    InstitutionStore + SurveyStore + EquipmentStore + LocationStore + AssignmentStore + MaintenanceStore
{
}

impl<T> RecordStore for T where
    T: InstitutionStore
        + SurveyStore
        + EquipmentStore
        + LocationStore
        + AssignmentStore
        + MaintenanceStore
{
}
