//! Fixtures shared by the storage integration tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tempfile::TempDir;

use registro_core::types::{
    EquipmentState, EquipmentType, InstitutionType, MaintenanceType, NewAssignment, NewEquipment,
    NewInstitution, NewLocation, NewMaintenance, NewSurvey, PhysicalCondition, Response,
    SurveyAnswers,
};
use registro_core::{EquipmentId, InstitutionId, LocationId};
use registro_storage::{MemoryStore, SqliteStore};

/// A fresh in-memory store.
pub fn memory_store() -> MemoryStore {
    MemoryStore::new()
}

/// A fresh SQLite store in a temporary directory.
///
/// The directory is returned so the database outlives the test body.
pub async fn sqlite_store() -> (TempDir, SqliteStore) {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::open_file(dir.path().join("registro.db"))
        .await
        .unwrap();
    (dir, store)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn institution(name: &str, amie: &str) -> NewInstitution {
    NewInstitution {
        name: name.to_string(),
        amie_code: amie.to_string(),
        province: "Pichincha".to_string(),
        canton: "Quito".to_string(),
        address: "Av. Amazonas N34-12".to_string(),
        institution_type: InstitutionType::Publica,
        phone: Some("022345678".to_string()),
        email: None,
    }
}

pub fn survey(institution: InstitutionId, on: NaiveDate) -> NewSurvey {
    NewSurvey {
        institution,
        survey_date: on,
        surveyor: Some("Ana Torres".to_string()),
        surveyor_role: None,
        answers: SurveyAnswers::uniform(Response::CasiSiempre),
        notes: Some("Rampa en reparación".to_string()),
        recommendations: None,
    }
}

pub fn equipment(code: &str, serial: &str, kind: EquipmentType, cost: Decimal) -> NewEquipment {
    NewEquipment {
        inventory_code: code.to_string(),
        equipment_type: kind,
        brand: "Dell".to_string(),
        model: "Latitude 5420".to_string(),
        serial_number: serial.to_string(),
        acquisition_year: 2022,
        cost,
        state: EquipmentState::Operativo,
        condition: PhysicalCondition::Bueno,
        description: None,
    }
}

pub fn location(area: &str, room: &str) -> NewLocation {
    NewLocation {
        area: area.to_string(),
        room: room.to_string(),
        floor: Some("2".to_string()),
        building: None,
        description: None,
    }
}

pub fn assignment(equipment: EquipmentId, location: LocationId) -> NewAssignment {
    NewAssignment {
        equipment,
        location,
        responsible: Some("rvaca".to_string()),
        notes: None,
    }
}

pub fn maintenance(equipment: EquipmentId, on: NaiveDate) -> NewMaintenance {
    NewMaintenance {
        equipment,
        performed_by: Some("tecnico".to_string()),
        date: on,
        maintenance_type: MaintenanceType::Preventivo,
        description: "Limpieza interna".to_string(),
        activities: "Soplado y cambio de pasta térmica".to_string(),
        parts: None,
        cost: Decimal::new(2500, 2),
        resulting_state: "Operativo".to_string(),
        notes: None,
        next_due: Some(on + chrono::Duration::days(180)),
    }
}
