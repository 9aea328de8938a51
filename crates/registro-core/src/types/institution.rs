//! Educational institutions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{InstitutionId, InstitutionType};
use crate::error::Result;
use crate::validation::{Constraint, FieldSpec, FormData, Schema, validate};

/// Validation table for the institution registration form.
pub const INSTITUTION_SCHEMA: Schema = Schema {
    record: "institucion",
    fields: &[
        FieldSpec {
            name: "nombre_institucion",
            label: "Nombre de la Institución",
            constraints: &[Constraint::Required, Constraint::MaxLength(200)],
        },
        FieldSpec {
            name: "codigo_amie",
            label: "Código AMIE",
            constraints: &[Constraint::Required, Constraint::MaxLength(20)],
        },
        FieldSpec {
            name: "provincia",
            label: "Provincia",
            constraints: &[Constraint::Required, Constraint::MaxLength(50)],
        },
        FieldSpec {
            name: "canton",
            label: "Cantón",
            constraints: &[Constraint::Required, Constraint::MaxLength(50)],
        },
        FieldSpec {
            name: "direccion",
            label: "Dirección",
            constraints: &[Constraint::Required],
        },
        FieldSpec {
            name: "tipo_institucion",
            label: "Tipo de Institución",
            constraints: &[
                Constraint::Required,
                Constraint::OneOf(InstitutionType::CODES),
            ],
        },
        FieldSpec {
            name: "telefono",
            label: "Teléfono",
            constraints: &[Constraint::MaxLength(20)],
        },
        FieldSpec {
            name: "email",
            label: "Email",
            constraints: &[Constraint::MaxLength(254), Constraint::Email],
        },
    ],
};

/// A validated institution registration, not yet stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInstitution {
    /// Full name
    #[serde(rename = "nombre_institucion")]
    pub name: String,
    /// Ministry of Education AMIE code, unique
    #[serde(rename = "codigo_amie")]
    pub amie_code: String,
    /// Province
    #[serde(rename = "provincia")]
    pub province: String,
    /// Canton
    pub canton: String,
    /// Street address
    #[serde(rename = "direccion")]
    pub address: String,
    /// Legal regime
    #[serde(rename = "tipo_institucion")]
    pub institution_type: InstitutionType,
    /// Contact phone
    #[serde(rename = "telefono")]
    pub phone: Option<String>,
    /// Contact e-mail
    pub email: Option<String>,
}

impl NewInstitution {
    /// Validates a registration form.
    pub fn from_form(form: &FormData) -> Result<Self> {
        let cleaned = validate(&INSTITUTION_SCHEMA, form)?;
        Ok(Self {
            name: cleaned.require_text("nombre_institucion")?,
            amie_code: cleaned.require_text("codigo_amie")?,
            province: cleaned.require_text("provincia")?,
            canton: cleaned.require_text("canton")?,
            address: cleaned.require_text("direccion")?,
            institution_type: cleaned.require_choice("tipo_institucion")?,
            phone: cleaned.text("telefono"),
            email: cleaned.text("email"),
        })
    }
}

/// A stored institution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Institution {
    /// Store-assigned identifier
    pub id: InstitutionId,
    /// Registered data
    #[serde(flatten)]
    pub data: NewInstitution,
    /// When the record was created
    #[serde(rename = "fecha_registro")]
    pub registered_at: DateTime<Utc>,
}

impl fmt::Display for Institution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.data.name, self.data.amie_code)
    }
}
