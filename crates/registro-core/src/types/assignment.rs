//! Equipment-to-location assignments. At most one per equipment.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{AssignmentId, EquipmentId, LocationId};
use crate::error::Result;
use crate::validation::{Constraint, FieldSpec, FormData, Schema, validate};

/// Validation table for the assignment form.
pub const ASSIGNMENT_SCHEMA: Schema = Schema {
    record: "asignacion",
    fields: &[
        FieldSpec {
            name: "equipo",
            label: "Equipo",
            constraints: &[Constraint::Required, Constraint::Reference],
        },
        FieldSpec {
            name: "ubicacion",
            label: "Ubicación",
            constraints: &[Constraint::Required, Constraint::Reference],
        },
        FieldSpec {
            name: "responsable",
            label: "Responsable",
            constraints: &[Constraint::MaxLength(150)],
        },
        FieldSpec {
            name: "observaciones",
            label: "Observaciones",
            constraints: &[],
        },
    ],
};

/// A validated assignment, not yet stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAssignment {
    /// Equipment being placed
    #[serde(rename = "equipo")]
    pub equipment: EquipmentId,
    /// Where it goes
    #[serde(rename = "ubicacion")]
    pub location: LocationId,
    /// Person responsible for it
    #[serde(rename = "responsable")]
    pub responsible: Option<String>,
    /// Free-text notes
    #[serde(rename = "observaciones")]
    pub notes: Option<String>,
}

impl NewAssignment {
    /// Validates an assignment form.
    ///
    /// When `equipment` is given it replaces whatever the form submitted.
    pub fn from_form(form: &FormData, equipment: Option<EquipmentId>) -> Result<Self> {
        let cleaned = match equipment {
            Some(id) => validate(
                &ASSIGNMENT_SCHEMA,
                &form.clone().with("equipo", id.to_string()),
            )?,
            None => validate(&ASSIGNMENT_SCHEMA, form)?,
        };
        Ok(Self {
            equipment: cleaned.require_id("equipo")?,
            location: cleaned.require_id("ubicacion")?,
            responsible: cleaned.text("responsable"),
            notes: cleaned.text("observaciones"),
        })
    }
}

/// A stored assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Store-assigned identifier
    pub id: AssignmentId,
    /// Assignment data
    #[serde(flatten)]
    pub data: NewAssignment,
    /// Day the assignment was recorded
    #[serde(rename = "fecha_asignacion")]
    pub assigned_on: NaiveDate,
}
