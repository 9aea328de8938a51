//! Equipment, locations, maintenance and assignments.
//!
//! Maintenance and assignment forms have two entry points: a general one
//! where the equipment is picked in the form, and an equipment-specific one
//! where the equipment comes from the path and any form value is ignored.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use registro_core::types::{
    ASSIGNMENT_SCHEMA, Assignment, Choice, EQUIPMENT_SCHEMA, Equipment, EquipmentFilter,
    EquipmentState, EquipmentType, LOCATION_SCHEMA, Location, MAINTENANCE_SCHEMA, Maintenance,
    NewAssignment, NewEquipment, NewLocation, NewMaintenance,
};
use registro_core::{EquipmentId, Error, FormData, LocationId, RequestContext, Result};
use registro_storage::RecordStore;

use crate::store_err;
use crate::views::FormPage;

// ============================================================================
// Context mappings
// ============================================================================

/// Filtered equipment listing.
#[derive(Debug, Clone, Serialize)]
pub struct EquipmentList {
    /// Matching equipment, by inventory code
    pub equipos: Vec<Equipment>,
    /// Filters applied
    pub filtros: EquipmentFilter,
    /// Type choices for the filter form
    pub tipos: Vec<Choice>,
    /// State choices for the filter form
    pub estados: Vec<Choice>,
}

/// An assignment with its location resolved.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentView {
    /// The assignment
    #[serde(flatten)]
    pub asignacion: Assignment,
    /// Assigned location
    pub ubicacion: Option<Location>,
}

/// Equipment with its maintenance history and current assignment.
#[derive(Debug, Clone, Serialize)]
pub struct EquipmentDetail {
    /// The equipment
    pub equipo: Equipment,
    /// Maintenance events, newest first
    pub mantenimientos: Vec<Maintenance>,
    /// Current assignment
    pub asignacion: Option<AssignmentView>,
}

/// A location with the equipment assigned to it.
#[derive(Debug, Clone, Serialize)]
pub struct LocationDetail {
    /// The location
    pub ubicacion: Location,
    /// Equipment assigned here
    pub equipos: Vec<Equipment>,
}

/// A maintenance event with its equipment resolved.
#[derive(Debug, Clone, Serialize)]
pub struct MaintenanceView {
    /// The event
    #[serde(flatten)]
    pub mantenimiento: Maintenance,
    /// Serviced equipment
    pub equipo: Option<Equipment>,
}

/// Maintenance or assignment form, with the records it can refer to.
#[derive(Debug, Clone, Serialize)]
pub struct ReferenceFormPage {
    /// The form
    #[serde(flatten)]
    pub formulario: FormPage,
    /// Equipment fixed by the entry point, if any
    pub equipo: Option<Equipment>,
    /// Equipment the form may pick from
    pub equipos: Vec<Equipment>,
    /// Locations the form may pick from (assignment forms only)
    pub ubicaciones: Vec<Location>,
}

// ============================================================================
// Workflow
// ============================================================================

/// Inventory operations.
#[derive(Clone)]
pub struct InventoryWorkflow {
    store: Arc<dyn RecordStore>,
}

impl InventoryWorkflow {
    /// Creates the workflow over a record store.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    // ------------------------------------------------------------------------
    // Equipment
    // ------------------------------------------------------------------------

    /// The blank equipment form.
    pub fn equipment_form(&self) -> FormPage {
        FormPage::new("Agregar Equipo", &EQUIPMENT_SCHEMA)
    }

    /// Validates and stores new equipment.
    pub async fn create_equipment(
        &self,
        ctx: &RequestContext,
        form: &FormData,
    ) -> Result<Equipment> {
        let new = NewEquipment::from_form(form).inspect_err(|err| {
            tracing::warn!(session = %ctx.session, error = %err, "Rejected equipment form");
        })?;
        let equipment = self.store.insert_equipment(new).await.map_err(store_err)?;
        tracing::info!(
            equipment = %equipment.id,
            code = %equipment.data.inventory_code,
            actor = ?ctx.username(),
            "Equipment added"
        );
        Ok(equipment)
    }

    /// The edit form for existing equipment, prefilled.
    pub async fn edit_equipment_form(&self, id: EquipmentId) -> Result<FormPage> {
        let equipment = self.fetch_equipment(id).await?;
        Ok(
            FormPage::new(format!("Editar Equipo: {equipment}"), &EQUIPMENT_SCHEMA)
                .with_values(equipment.data.to_form()),
        )
    }

    /// Validates and applies an equipment edit.
    ///
    /// # Errors
    ///
    /// `NotFound` before any validation if the equipment does not exist.
    pub async fn update_equipment(
        &self,
        ctx: &RequestContext,
        id: EquipmentId,
        form: &FormData,
    ) -> Result<Equipment> {
        self.fetch_equipment(id).await?;
        let data = NewEquipment::from_form(form).inspect_err(|err| {
            tracing::warn!(session = %ctx.session, equipment = %id, error = %err, "Rejected equipment edit");
        })?;
        let equipment = self
            .store
            .update_equipment(id, data)
            .await
            .map_err(store_err)?;
        tracing::info!(equipment = %id, actor = ?ctx.username(), "Equipment updated");
        Ok(equipment)
    }

    /// Equipment with maintenance history and current assignment.
    pub async fn equipment_detail(&self, id: EquipmentId) -> Result<EquipmentDetail> {
        let equipo = self.fetch_equipment(id).await?;
        let mantenimientos = self
            .store
            .maintenance_for_equipment(id)
            .await
            .map_err(store_err)?;
        let asignacion = match self
            .store
            .assignment_for_equipment(id)
            .await
            .map_err(store_err)?
        {
            Some(asignacion) => {
                let ubicacion = self
                    .store
                    .get_location(asignacion.data.location)
                    .await
                    .map_err(store_err)?;
                Some(AssignmentView {
                    asignacion,
                    ubicacion,
                })
            }
            None => None,
        };
        Ok(EquipmentDetail {
            equipo,
            mantenimientos,
            asignacion,
        })
    }

    /// Equipment matching the `q`, `tipo` and `estado` query parameters.
    ///
    /// # Errors
    ///
    /// `Validation` when `tipo` or `estado` is not a known code.
    pub async fn list_equipment(&self, params: &FormData) -> Result<EquipmentList> {
        let filtros = EquipmentFilter::from_query(params)?;
        let equipos = self.store.list_equipment(&filtros).await.map_err(store_err)?;
        Ok(EquipmentList {
            equipos,
            filtros,
            tipos: EquipmentType::choices(),
            estados: EquipmentState::choices(),
        })
    }

    // ------------------------------------------------------------------------
    // Locations
    // ------------------------------------------------------------------------

    /// The blank location form.
    pub fn location_form(&self) -> FormPage {
        FormPage::new("Agregar Ubicación", &LOCATION_SCHEMA)
    }

    /// Validates and stores a new location.
    pub async fn create_location(&self, ctx: &RequestContext, form: &FormData) -> Result<Location> {
        let new = NewLocation::from_form(form).inspect_err(|err| {
            tracing::warn!(session = %ctx.session, error = %err, "Rejected location form");
        })?;
        let location = self.store.insert_location(new).await.map_err(store_err)?;
        tracing::info!(location = %location.id, "Location added");
        Ok(location)
    }

    /// The edit form for an existing location, prefilled.
    pub async fn edit_location_form(&self, id: LocationId) -> Result<FormPage> {
        let location = self.fetch_location(id).await?;
        Ok(
            FormPage::new(format!("Editar Ubicación: {location}"), &LOCATION_SCHEMA)
                .with_values(location.data.to_form()),
        )
    }

    /// Validates and applies a location edit.
    pub async fn update_location(
        &self,
        ctx: &RequestContext,
        id: LocationId,
        form: &FormData,
    ) -> Result<Location> {
        self.fetch_location(id).await?;
        let data = NewLocation::from_form(form).inspect_err(|err| {
            tracing::warn!(session = %ctx.session, location = %id, error = %err, "Rejected location edit");
        })?;
        let location = self
            .store
            .update_location(id, data)
            .await
            .map_err(store_err)?;
        tracing::info!(location = %id, "Location updated");
        Ok(location)
    }

    /// A location and the equipment assigned to it.
    pub async fn location_detail(&self, id: LocationId) -> Result<LocationDetail> {
        let ubicacion = self.fetch_location(id).await?;
        let mut equipos = Vec::new();
        for assignment in self.store.list_assignments().await.map_err(store_err)? {
            if assignment.data.location != id {
                continue;
            }
            if let Some(equipment) = self
                .store
                .get_equipment(assignment.data.equipment)
                .await
                .map_err(store_err)?
            {
                equipos.push(equipment);
            }
        }
        equipos.sort_by(|a, b| a.data.inventory_code.cmp(&b.data.inventory_code));
        Ok(LocationDetail { ubicacion, equipos })
    }

    /// Every location, by area then room.
    pub async fn list_locations(&self) -> Result<Vec<Location>> {
        self.store.list_locations().await.map_err(store_err)
    }

    // ------------------------------------------------------------------------
    // Maintenance
    // ------------------------------------------------------------------------

    /// The maintenance form, optionally fixed to one piece of equipment.
    pub async fn maintenance_form(&self, equipment: Option<EquipmentId>) -> Result<ReferenceFormPage> {
        let equipo = match equipment {
            Some(id) => Some(self.fetch_equipment(id).await?),
            None => None,
        };
        let titulo = match &equipo {
            Some(e) => format!("Registrar Mantenimiento: {e}"),
            None => "Registrar Mantenimiento".to_string(),
        };
        Ok(ReferenceFormPage {
            formulario: FormPage::new(titulo, &MAINTENANCE_SCHEMA),
            equipo,
            equipos: self.all_equipment().await?,
            ubicaciones: Vec::new(),
        })
    }

    /// Validates and logs a maintenance event, stamped with the actor.
    ///
    /// # Errors
    ///
    /// `NotFound` if the equipment fixed by the entry point or picked in the
    /// form does not exist; `Validation` on bad fields.
    pub async fn create_maintenance(
        &self,
        ctx: &RequestContext,
        form: &FormData,
        equipment: Option<EquipmentId>,
    ) -> Result<Maintenance> {
        if let Some(id) = equipment {
            self.fetch_equipment(id).await?;
        }
        let mut new = NewMaintenance::from_form(form, equipment).inspect_err(|err| {
            tracing::warn!(session = %ctx.session, error = %err, "Rejected maintenance form");
        })?;
        new.performed_by = ctx.username().map(str::to_string);

        let event = self.store.insert_maintenance(new).await.map_err(store_err)?;
        tracing::info!(
            maintenance = %event.id,
            equipment = %event.data.equipment,
            actor = ?ctx.username(),
            "Maintenance logged"
        );
        Ok(event)
    }

    /// Every maintenance event, newest first, with its equipment.
    pub async fn list_maintenance(&self) -> Result<Vec<MaintenanceView>> {
        let equipment: HashMap<EquipmentId, Equipment> = self
            .all_equipment()
            .await?
            .into_iter()
            .map(|e| (e.id, e))
            .collect();
        let events = self.store.list_maintenance().await.map_err(store_err)?;
        Ok(events
            .into_iter()
            .map(|mantenimiento| MaintenanceView {
                equipo: equipment.get(&mantenimiento.data.equipment).cloned(),
                mantenimiento,
            })
            .collect())
    }

    // ------------------------------------------------------------------------
    // Assignments
    // ------------------------------------------------------------------------

    /// The assignment form, optionally fixed to one piece of equipment.
    pub async fn assignment_form(&self, equipment: Option<EquipmentId>) -> Result<ReferenceFormPage> {
        let equipo = match equipment {
            Some(id) => Some(self.fetch_equipment(id).await?),
            None => None,
        };
        let titulo = match &equipo {
            Some(e) => format!("Asignar Equipo: {e}"),
            None => "Asignar Equipo".to_string(),
        };
        Ok(ReferenceFormPage {
            formulario: FormPage::new(titulo, &ASSIGNMENT_SCHEMA),
            equipo,
            equipos: self.all_equipment().await?,
            ubicaciones: self.list_locations().await?,
        })
    }

    /// Validates and stores an assignment.
    ///
    /// `responsable` defaults to the acting user when left blank.
    ///
    /// # Errors
    ///
    /// `NotFound` for missing equipment or location, `Conflict` when the
    /// equipment is already assigned, `Validation` on bad fields.
    pub async fn create_assignment(
        &self,
        ctx: &RequestContext,
        form: &FormData,
        equipment: Option<EquipmentId>,
    ) -> Result<Assignment> {
        if let Some(id) = equipment {
            self.fetch_equipment(id).await?;
        }
        let mut new = NewAssignment::from_form(form, equipment).inspect_err(|err| {
            tracing::warn!(session = %ctx.session, error = %err, "Rejected assignment form");
        })?;
        if new.responsible.is_none() {
            new.responsible = ctx.username().map(str::to_string);
        }

        let assignment = self.store.insert_assignment(new).await.map_err(store_err)?;
        tracing::info!(
            assignment = %assignment.id,
            equipment = %assignment.data.equipment,
            location = %assignment.data.location,
            "Equipment assigned"
        );
        Ok(assignment)
    }

    /// Every assignment, newest first.
    pub async fn list_assignments(&self) -> Result<Vec<Assignment>> {
        self.store.list_assignments().await.map_err(store_err)
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    async fn all_equipment(&self) -> Result<Vec<Equipment>> {
        self.store
            .list_equipment(&EquipmentFilter::default())
            .await
            .map_err(store_err)
    }

    async fn fetch_equipment(&self, id: EquipmentId) -> Result<Equipment> {
        self.store
            .get_equipment(id)
            .await
            .map_err(store_err)?
            .ok_or_else(|| Error::not_found("equipo", id))
    }

    async fn fetch_location(&self, id: LocationId) -> Result<Location> {
        self.store
            .get_location(id)
            .await
            .map_err(store_err)?
            .ok_or_else(|| Error::not_found("ubicacion", id))
    }
}
