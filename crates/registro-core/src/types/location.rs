//! Physical locations equipment can be assigned to.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::LocationId;
use crate::error::Result;
use crate::validation::{Constraint, FieldSpec, FormData, Schema, validate};

/// Validation table for the location create and edit forms.
pub const LOCATION_SCHEMA: Schema = Schema {
    record: "ubicacion",
    fields: &[
        FieldSpec {
            name: "area",
            label: "Área",
            constraints: &[Constraint::Required, Constraint::MaxLength(100)],
        },
        FieldSpec {
            name: "aula_laboratorio",
            label: "Aula/Laboratorio",
            constraints: &[Constraint::Required, Constraint::MaxLength(100)],
        },
        FieldSpec {
            name: "piso",
            label: "Piso",
            constraints: &[Constraint::MaxLength(20)],
        },
        FieldSpec {
            name: "edificio",
            label: "Edificio",
            constraints: &[Constraint::MaxLength(50)],
        },
        FieldSpec {
            name: "descripcion",
            label: "Descripción",
            constraints: &[],
        },
    ],
};

/// Validated location data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLocation {
    /// Department or area
    pub area: String,
    /// Room or laboratory
    #[serde(rename = "aula_laboratorio")]
    pub room: String,
    /// Floor
    #[serde(rename = "piso")]
    pub floor: Option<String>,
    /// Building
    #[serde(rename = "edificio")]
    pub building: Option<String>,
    /// Free-text description
    #[serde(rename = "descripcion")]
    pub description: Option<String>,
}

impl NewLocation {
    /// Validates a location form.
    pub fn from_form(form: &FormData) -> Result<Self> {
        let cleaned = validate(&LOCATION_SCHEMA, form)?;
        Ok(Self {
            area: cleaned.require_text("area")?,
            room: cleaned.require_text("aula_laboratorio")?,
            floor: cleaned.text("piso"),
            building: cleaned.text("edificio"),
            description: cleaned.text("descripcion"),
        })
    }

    /// Form values for redisplaying this location in the edit form.
    pub fn to_form(&self) -> FormData {
        let mut form = FormData::new()
            .with("area", &self.area)
            .with("aula_laboratorio", &self.room);
        for (field, value) in [
            ("piso", &self.floor),
            ("edificio", &self.building),
            ("descripcion", &self.description),
        ] {
            if let Some(value) = value {
                form.insert(field, value);
            }
        }
        form
    }
}

/// A stored location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Store-assigned identifier
    pub id: LocationId,
    /// Current data
    #[serde(flatten)]
    pub data: NewLocation,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.data.area, self.data.room)
    }
}
