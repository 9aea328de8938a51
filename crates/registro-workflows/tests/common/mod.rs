//! Common test harness for the workflow integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use registro_core::types::{Institution, Question};
use registro_core::{Actor, FormData, RequestContext, SessionId};
use registro_storage::{MemoryStore, RecordStore};
use registro_workflows::{MemorySessionStore, SessionStore, Workflows};

/// Workflows over fresh in-memory stores.
pub struct TestHarness {
    /// Record store, for direct inspection
    pub store: Arc<MemoryStore>,
    /// Session store, for direct inspection
    pub sessions: Arc<MemorySessionStore>,
    /// The workflows under test
    pub workflows: Workflows,
}

impl TestHarness {
    /// Creates a harness with empty stores.
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let sessions = Arc::new(MemorySessionStore::new());
        let workflows = Workflows::new(
            store.clone() as Arc<dyn RecordStore>,
            sessions.clone() as Arc<dyn SessionStore>,
        );
        Self {
            store,
            sessions,
            workflows,
        }
    }

    /// A new anonymous browser session.
    pub fn visitor(&self) -> RequestContext {
        RequestContext::anonymous(SessionId::new())
    }

    /// A new browser session logged in as `username`.
    pub fn user(&self, username: &str) -> RequestContext {
        RequestContext::with_actor(SessionId::new(), Actor::new(username))
    }

    /// Registers an institution through the workflow.
    pub async fn institution(&self, name: &str, amie: &str) -> Institution {
        self.workflows
            .survey
            .register_institution(&self.visitor(), &institution_form(name, amie))
            .await
            .unwrap()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

pub fn institution_form(name: &str, amie: &str) -> FormData {
    FormData::new()
        .with("nombre_institucion", name)
        .with("codigo_amie", amie)
        .with("provincia", "Pichincha")
        .with("canton", "Quito")
        .with("direccion", "Av. 10 de Agosto N21-55")
        .with("tipo_institucion", "PUBLICA")
        .with("telefono", "022555111")
        .with("email", "rectorado@escuela.edu.ec")
}

/// A complete survey submission answering every question with `answer`.
pub fn survey_form(answer: &str) -> FormData {
    let mut form = FormData::new()
        .with("fecha_encuesta", "2024-05-14")
        .with("encuestador", "María Pérez")
        .with("cargo_encuestador", "Docente");
    for question in Question::ALL {
        form.insert(question.field(), answer);
    }
    form
}

pub fn selection(id: impl ToString) -> FormData {
    FormData::new().with("institucion_id", id.to_string())
}

pub fn equipment_form(code: &str, serial: &str, kind: &str, state: &str, cost: &str) -> FormData {
    FormData::new()
        .with("codigo_inventario", code)
        .with("tipo", kind)
        .with("marca", "HP")
        .with("modelo", "ProDesk 400")
        .with("numero_serie", serial)
        .with("anio_adquisicion", "2021")
        .with("costo", cost)
        .with("estado", state)
        .with("condicion_fisica", "BUENO")
}

pub fn location_form(area: &str, room: &str) -> FormData {
    FormData::new()
        .with("area", area)
        .with("aula_laboratorio", room)
        .with("piso", "1")
}

pub fn maintenance_form(equipment: impl ToString, date: &str) -> FormData {
    FormData::new()
        .with("equipo", equipment.to_string())
        .with("tipo", "CORRECTIVO")
        .with("fecha", date)
        .with("descripcion", "No enciende")
        .with("actividades_realizadas", "Cambio de fuente de poder")
        .with("repuestos", "Fuente 500W")
        .with("costo_mantenimiento", "45.5")
        .with("estado_posterior", "Operativo")
}

pub fn assignment_form(equipment: impl ToString, location: impl ToString) -> FormData {
    FormData::new()
        .with("equipo", equipment.to_string())
        .with("ubicacion", location.to_string())
}
