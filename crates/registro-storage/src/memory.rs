//! In-memory record store.
//!
//! All tables sit behind one `RwLock`, so reference and uniqueness checks
//! and the write they guard happen atomically. Used by tests and by the
//! `memory` storage backend.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use registro_core::types::{
    Assignment, Equipment, EquipmentFilter, EquipmentType, Institution, Location, Maintenance,
    NewAssignment, NewEquipment, NewInstitution, NewLocation, NewMaintenance, NewSurvey, Survey,
};
use registro_core::{
    AssignmentId, EquipmentId, InstitutionId, LocationId, MaintenanceId, SurveyId,
};

use crate::traits::{
    AssignmentStore, EquipmentStore, InstitutionStore, LocationStore, MaintenanceStore,
    SurveyStore,
};
use crate::{Error, Result};

#[derive(Default)]
struct Tables {
    next_id: i64,
    institutions: BTreeMap<InstitutionId, Institution>,
    surveys: BTreeMap<SurveyId, Survey>,
    equipment: BTreeMap<EquipmentId, Equipment>,
    locations: BTreeMap<LocationId, Location>,
    assignments: BTreeMap<AssignmentId, Assignment>,
    maintenance: BTreeMap<MaintenanceId, Maintenance>,
}

impl Tables {
    fn allocate(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn check_equipment_unique(
        &self,
        data: &NewEquipment,
        except: Option<EquipmentId>,
    ) -> Result<()> {
        for other in self.equipment.values().filter(|e| Some(e.id) != except) {
            if other.data.inventory_code == data.inventory_code {
                return Err(Error::conflict(
                    "equipo",
                    "codigo_inventario",
                    &data.inventory_code,
                ));
            }
            if other.data.serial_number == data.serial_number {
                return Err(Error::conflict("equipo", "numero_serie", &data.serial_number));
            }
        }
        Ok(())
    }
}

/// In-memory implementation of every record store trait.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| Error::poisoned())
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| Error::poisoned())
    }
}

fn newest<T>(
    values: impl Iterator<Item = T>,
    limit: usize,
    key: impl Fn(&T) -> (DateTime<Utc>, i64),
) -> Vec<T> {
    let mut values: Vec<T> = values.collect();
    values.sort_by_key(|v| std::cmp::Reverse(key(v)));
    values.truncate(limit);
    values
}

fn by_survey_date_desc(surveys: &mut [Survey]) {
    surveys.sort_by(|a, b| {
        b.data
            .survey_date
            .cmp(&a.data.survey_date)
            .then(b.id.cmp(&a.id))
    });
}

fn by_maintenance_date_desc(events: &mut [Maintenance]) {
    events.sort_by(|a, b| b.data.date.cmp(&a.data.date).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl InstitutionStore for MemoryStore {
    async fn insert_institution(&self, new: NewInstitution) -> Result<Institution> {
        let mut tables = self.write()?;
        if tables
            .institutions
            .values()
            .any(|i| i.data.amie_code == new.amie_code)
        {
            return Err(Error::conflict("institucion", "codigo_amie", &new.amie_code));
        }
        let id = InstitutionId::new(tables.allocate());
        let record = Institution {
            id,
            data: new,
            registered_at: Utc::now(),
        };
        tables.institutions.insert(id, record.clone());
        Ok(record)
    }

    async fn get_institution(&self, id: InstitutionId) -> Result<Option<Institution>> {
        Ok(self.read()?.institutions.get(&id).cloned())
    }

    async fn list_institutions(&self) -> Result<Vec<Institution>> {
        let mut all: Vec<Institution> = self.read()?.institutions.values().cloned().collect();
        all.sort_by(|a, b| a.data.name.cmp(&b.data.name).then(a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn recent_institutions(&self, limit: usize) -> Result<Vec<Institution>> {
        let tables = self.read()?;
        Ok(newest(tables.institutions.values().cloned(), limit, |i| {
            (i.registered_at, i.id.get())
        }))
    }

    async fn count_institutions(&self) -> Result<u64> {
        Ok(self.read()?.institutions.len() as u64)
    }
}

#[async_trait]
impl SurveyStore for MemoryStore {
    async fn insert_survey(&self, new: NewSurvey) -> Result<Survey> {
        let mut tables = self.write()?;
        if !tables.institutions.contains_key(&new.institution) {
            return Err(Error::missing_reference("institucion", new.institution));
        }
        let id = SurveyId::new(tables.allocate());
        let record = Survey {
            id,
            data: new,
            registered_at: Utc::now(),
        };
        tables.surveys.insert(id, record.clone());
        Ok(record)
    }

    async fn get_survey(&self, id: SurveyId) -> Result<Option<Survey>> {
        Ok(self.read()?.surveys.get(&id).cloned())
    }

    async fn list_surveys(&self) -> Result<Vec<Survey>> {
        let mut all: Vec<Survey> = self.read()?.surveys.values().cloned().collect();
        by_survey_date_desc(&mut all);
        Ok(all)
    }

    async fn surveys_for_institution(&self, id: InstitutionId) -> Result<Vec<Survey>> {
        let mut matching: Vec<Survey> = self
            .read()?
            .surveys
            .values()
            .filter(|s| s.data.institution == id)
            .cloned()
            .collect();
        by_survey_date_desc(&mut matching);
        Ok(matching)
    }

    async fn recent_surveys(&self, limit: usize) -> Result<Vec<Survey>> {
        let tables = self.read()?;
        Ok(newest(tables.surveys.values().cloned(), limit, |s| {
            (s.registered_at, s.id.get())
        }))
    }

    async fn count_surveys(&self) -> Result<u64> {
        Ok(self.read()?.surveys.len() as u64)
    }
}

#[async_trait]
impl EquipmentStore for MemoryStore {
    async fn insert_equipment(&self, new: NewEquipment) -> Result<Equipment> {
        let mut tables = self.write()?;
        tables.check_equipment_unique(&new, None)?;
        let id = EquipmentId::new(tables.allocate());
        let now = Utc::now();
        let record = Equipment {
            id,
            data: new,
            registered_at: now,
            updated_at: now,
        };
        tables.equipment.insert(id, record.clone());
        Ok(record)
    }

    async fn update_equipment(&self, id: EquipmentId, data: NewEquipment) -> Result<Equipment> {
        let mut tables = self.write()?;
        if !tables.equipment.contains_key(&id) {
            return Err(Error::not_found("equipo", id));
        }
        tables.check_equipment_unique(&data, Some(id))?;
        let record = tables
            .equipment
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("equipo", id))?;
        record.data = data;
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn get_equipment(&self, id: EquipmentId) -> Result<Option<Equipment>> {
        Ok(self.read()?.equipment.get(&id).cloned())
    }

    async fn list_equipment(&self, filter: &EquipmentFilter) -> Result<Vec<Equipment>> {
        let mut matching: Vec<Equipment> = self
            .read()?
            .equipment
            .values()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.data.inventory_code.cmp(&b.data.inventory_code));
        Ok(matching)
    }

    async fn total_equipment_cost(&self) -> Result<Decimal> {
        let tables = self.read()?;
        let mut total: Decimal = tables.equipment.values().map(|e| e.data.cost).sum();
        total.rescale(2);
        Ok(total)
    }

    async fn count_equipment_by_type(&self) -> Result<Vec<(EquipmentType, u64)>> {
        let tables = self.read()?;
        Ok(EquipmentType::ALL
            .iter()
            .map(|kind| {
                let count = tables
                    .equipment
                    .values()
                    .filter(|e| e.data.equipment_type == *kind)
                    .count() as u64;
                (*kind, count)
            })
            .filter(|(_, count)| *count > 0)
            .collect())
    }
}

#[async_trait]
impl LocationStore for MemoryStore {
    async fn insert_location(&self, new: NewLocation) -> Result<Location> {
        let mut tables = self.write()?;
        let id = LocationId::new(tables.allocate());
        let record = Location { id, data: new };
        tables.locations.insert(id, record.clone());
        Ok(record)
    }

    async fn update_location(&self, id: LocationId, data: NewLocation) -> Result<Location> {
        let mut tables = self.write()?;
        let record = tables
            .locations
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("ubicacion", id))?;
        record.data = data;
        Ok(record.clone())
    }

    async fn get_location(&self, id: LocationId) -> Result<Option<Location>> {
        Ok(self.read()?.locations.get(&id).cloned())
    }

    async fn list_locations(&self) -> Result<Vec<Location>> {
        let mut all: Vec<Location> = self.read()?.locations.values().cloned().collect();
        all.sort_by(|a, b| {
            a.data
                .area
                .cmp(&b.data.area)
                .then_with(|| a.data.room.cmp(&b.data.room))
        });
        Ok(all)
    }
}

#[async_trait]
impl AssignmentStore for MemoryStore {
    async fn insert_assignment(&self, new: NewAssignment) -> Result<Assignment> {
        let mut tables = self.write()?;
        if !tables.equipment.contains_key(&new.equipment) {
            return Err(Error::missing_reference("equipo", new.equipment));
        }
        if !tables.locations.contains_key(&new.location) {
            return Err(Error::missing_reference("ubicacion", new.location));
        }
        if tables
            .assignments
            .values()
            .any(|a| a.data.equipment == new.equipment)
        {
            return Err(Error::conflict("asignacion", "equipo", new.equipment.to_string()));
        }
        let id = AssignmentId::new(tables.allocate());
        let record = Assignment {
            id,
            data: new,
            assigned_on: Utc::now().date_naive(),
        };
        tables.assignments.insert(id, record.clone());
        Ok(record)
    }

    async fn assignment_for_equipment(&self, id: EquipmentId) -> Result<Option<Assignment>> {
        Ok(self
            .read()?
            .assignments
            .values()
            .find(|a| a.data.equipment == id)
            .cloned())
    }

    async fn list_assignments(&self) -> Result<Vec<Assignment>> {
        Ok(self.read()?.assignments.values().rev().cloned().collect())
    }
}

#[async_trait]
impl MaintenanceStore for MemoryStore {
    async fn insert_maintenance(&self, new: NewMaintenance) -> Result<Maintenance> {
        let mut tables = self.write()?;
        if !tables.equipment.contains_key(&new.equipment) {
            return Err(Error::missing_reference("equipo", new.equipment));
        }
        let id = MaintenanceId::new(tables.allocate());
        let record = Maintenance {
            id,
            data: new,
            registered_at: Utc::now(),
        };
        tables.maintenance.insert(id, record.clone());
        Ok(record)
    }

    async fn list_maintenance(&self) -> Result<Vec<Maintenance>> {
        let mut all: Vec<Maintenance> = self.read()?.maintenance.values().cloned().collect();
        by_maintenance_date_desc(&mut all);
        Ok(all)
    }

    async fn maintenance_for_equipment(&self, id: EquipmentId) -> Result<Vec<Maintenance>> {
        let mut matching: Vec<Maintenance> = self
            .read()?
            .maintenance
            .values()
            .filter(|m| m.data.equipment == id)
            .cloned()
            .collect();
        by_maintenance_date_desc(&mut matching);
        Ok(matching)
    }

    async fn recent_maintenance(&self, limit: usize) -> Result<Vec<Maintenance>> {
        let mut all = self.list_maintenance().await?;
        all.truncate(limit);
        Ok(all)
    }

    async fn count_maintenance(&self) -> Result<u64> {
        Ok(self.read()?.maintenance.len() as u64)
    }
}
