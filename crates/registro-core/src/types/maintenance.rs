//! Maintenance events. Immutable once recorded.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{EquipmentId, MaintenanceId, MaintenanceType};
use crate::error::Result;
use crate::validation::{Constraint, FieldSpec, FormData, Schema, validate};

/// Validation table for the maintenance form.
pub const MAINTENANCE_SCHEMA: Schema = Schema {
    record: "mantenimiento",
    fields: &[
        FieldSpec {
            name: "equipo",
            label: "Equipo",
            constraints: &[Constraint::Required, Constraint::Reference],
        },
        FieldSpec {
            name: "tipo",
            label: "Tipo de Mantenimiento",
            constraints: &[
                Constraint::Required,
                Constraint::OneOf(MaintenanceType::CODES),
            ],
        },
        FieldSpec {
            name: "fecha",
            label: "Fecha de Mantenimiento",
            constraints: &[Constraint::Required, Constraint::Date],
        },
        FieldSpec {
            name: "descripcion",
            label: "Descripción",
            constraints: &[Constraint::Required],
        },
        FieldSpec {
            name: "actividades_realizadas",
            label: "Actividades Realizadas",
            constraints: &[Constraint::Required],
        },
        FieldSpec {
            name: "repuestos",
            label: "Repuestos Utilizados",
            constraints: &[],
        },
        FieldSpec {
            name: "costo_mantenimiento",
            label: "Costo de Mantenimiento ($)",
            constraints: &[
                Constraint::Decimal {
                    max_digits: 10,
                    decimal_places: 2,
                },
                Constraint::NonNegative,
            ],
        },
        FieldSpec {
            name: "estado_posterior",
            label: "Estado Posterior",
            constraints: &[Constraint::Required, Constraint::MaxLength(50)],
        },
        FieldSpec {
            name: "observaciones",
            label: "Observaciones",
            constraints: &[],
        },
        FieldSpec {
            name: "proximo_mantenimiento",
            label: "Próximo Mantenimiento",
            constraints: &[Constraint::Date],
        },
    ],
};

/// A validated maintenance event, not yet stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMaintenance {
    /// Equipment serviced
    #[serde(rename = "equipo")]
    pub equipment: EquipmentId,
    /// Who recorded it
    #[serde(rename = "usuario")]
    pub performed_by: Option<String>,
    /// Day of the service
    #[serde(rename = "fecha")]
    pub date: NaiveDate,
    /// Kind of service
    #[serde(rename = "tipo")]
    pub maintenance_type: MaintenanceType,
    /// What was wrong or planned
    #[serde(rename = "descripcion")]
    pub description: String,
    /// What was done
    #[serde(rename = "actividades_realizadas")]
    pub activities: String,
    /// Parts used
    #[serde(rename = "repuestos")]
    pub parts: Option<String>,
    /// Cost, zero when not given
    #[serde(rename = "costo_mantenimiento")]
    pub cost: Decimal,
    /// State of the equipment afterwards
    #[serde(rename = "estado_posterior")]
    pub resulting_state: String,
    /// Free-text notes
    #[serde(rename = "observaciones")]
    pub notes: Option<String>,
    /// When the next service is due
    #[serde(rename = "proximo_mantenimiento")]
    pub next_due: Option<NaiveDate>,
}

impl NewMaintenance {
    /// Validates a maintenance form.
    ///
    /// When `equipment` is given it replaces whatever the form submitted.
    /// The acting user is stamped by the caller.
    pub fn from_form(form: &FormData, equipment: Option<EquipmentId>) -> Result<Self> {
        let cleaned = match equipment {
            Some(id) => validate(
                &MAINTENANCE_SCHEMA,
                &form.clone().with("equipo", id.to_string()),
            )?,
            None => validate(&MAINTENANCE_SCHEMA, form)?,
        };
        let mut cost = cleaned.decimal("costo_mantenimiento").unwrap_or_default();
        cost.rescale(2);
        Ok(Self {
            equipment: cleaned.require_id("equipo")?,
            performed_by: None,
            date: cleaned.require_date("fecha")?,
            maintenance_type: cleaned.require_choice("tipo")?,
            description: cleaned.require_text("descripcion")?,
            activities: cleaned.require_text("actividades_realizadas")?,
            parts: cleaned.text("repuestos"),
            cost,
            resulting_state: cleaned.require_text("estado_posterior")?,
            notes: cleaned.text("observaciones"),
            next_due: cleaned.date("proximo_mantenimiento"),
        })
    }
}

/// A stored maintenance event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maintenance {
    /// Store-assigned identifier
    pub id: MaintenanceId,
    /// Event data
    #[serde(flatten)]
    pub data: NewMaintenance,
    /// When the record was created
    #[serde(rename = "fecha_registro")]
    pub registered_at: DateTime<Utc>,
}

impl fmt::Display for Maintenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "equipo {} - {} - {}",
            self.data.equipment, self.data.maintenance_type, self.data.date
        )
    }
}
