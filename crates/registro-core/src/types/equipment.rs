//! IT equipment records and the listing filter.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{EquipmentId, EquipmentState, EquipmentType, PhysicalCondition};
use crate::error::{Error, Result};
use crate::validation::{Constraint, FieldSpec, FormData, Schema, validate};

/// Validation table for the equipment create and edit forms.
pub const EQUIPMENT_SCHEMA: Schema = Schema {
    record: "equipo",
    fields: &[
        FieldSpec {
            name: "codigo_inventario",
            label: "Código de Inventario",
            constraints: &[Constraint::Required, Constraint::MaxLength(50)],
        },
        FieldSpec {
            name: "tipo",
            label: "Tipo de Equipo",
            constraints: &[Constraint::Required, Constraint::OneOf(EquipmentType::CODES)],
        },
        FieldSpec {
            name: "marca",
            label: "Marca",
            constraints: &[Constraint::Required, Constraint::MaxLength(100)],
        },
        FieldSpec {
            name: "modelo",
            label: "Modelo",
            constraints: &[Constraint::Required, Constraint::MaxLength(100)],
        },
        FieldSpec {
            name: "numero_serie",
            label: "Número de Serie",
            constraints: &[Constraint::Required, Constraint::MaxLength(100)],
        },
        FieldSpec {
            name: "anio_adquisicion",
            label: "Año de Adquisición",
            constraints: &[
                Constraint::Required,
                Constraint::IntRange {
                    min: 2000,
                    max: 2100,
                },
            ],
        },
        FieldSpec {
            name: "costo",
            label: "Costo ($)",
            constraints: &[
                Constraint::Required,
                Constraint::Decimal {
                    max_digits: 10,
                    decimal_places: 2,
                },
                Constraint::NonNegative,
            ],
        },
        FieldSpec {
            name: "estado",
            label: "Estado",
            constraints: &[Constraint::Required, Constraint::OneOf(EquipmentState::CODES)],
        },
        FieldSpec {
            name: "condicion_fisica",
            label: "Condición Física",
            constraints: &[
                Constraint::Required,
                Constraint::OneOf(PhysicalCondition::CODES),
            ],
        },
        FieldSpec {
            name: "descripcion",
            label: "Descripción",
            constraints: &[],
        },
    ],
};

/// Validated equipment data, used for both create and edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEquipment {
    /// Inventory code, unique
    #[serde(rename = "codigo_inventario")]
    pub inventory_code: String,
    /// Kind of device
    #[serde(rename = "tipo")]
    pub equipment_type: EquipmentType,
    /// Manufacturer
    #[serde(rename = "marca")]
    pub brand: String,
    /// Model name
    #[serde(rename = "modelo")]
    pub model: String,
    /// Serial number, unique
    #[serde(rename = "numero_serie")]
    pub serial_number: String,
    /// Year of acquisition, 2000–2100
    #[serde(rename = "anio_adquisicion")]
    pub acquisition_year: i32,
    /// Purchase cost, two decimal places
    #[serde(rename = "costo")]
    pub cost: Decimal,
    /// Operational state
    #[serde(rename = "estado")]
    pub state: EquipmentState,
    /// Physical condition
    #[serde(rename = "condicion_fisica")]
    pub condition: PhysicalCondition,
    /// Free-text description
    #[serde(rename = "descripcion")]
    pub description: Option<String>,
}

impl NewEquipment {
    /// Validates an equipment form.
    pub fn from_form(form: &FormData) -> Result<Self> {
        let cleaned = validate(&EQUIPMENT_SCHEMA, form)?;
        let year = cleaned.require_int("anio_adquisicion")?;
        let mut cost = cleaned.require_decimal("costo")?;
        cost.rescale(2);
        Ok(Self {
            inventory_code: cleaned.require_text("codigo_inventario")?,
            equipment_type: cleaned.require_choice("tipo")?,
            brand: cleaned.require_text("marca")?,
            model: cleaned.require_text("modelo")?,
            serial_number: cleaned.require_text("numero_serie")?,
            acquisition_year: i32::try_from(year).map_err(|_| {
                Error::validation_field("anio_adquisicion", crate::validation::INVALID_INTEGER)
            })?,
            cost,
            state: cleaned.require_choice("estado")?,
            condition: cleaned.require_choice("condicion_fisica")?,
            description: cleaned.text("descripcion"),
        })
    }

    /// The form values this record would redisplay with when edited.
    pub fn to_form(&self) -> FormData {
        let mut form = FormData::new()
            .with("codigo_inventario", &self.inventory_code)
            .with("tipo", self.equipment_type.code())
            .with("marca", &self.brand)
            .with("modelo", &self.model)
            .with("numero_serie", &self.serial_number)
            .with("anio_adquisicion", self.acquisition_year.to_string())
            .with("costo", self.cost.to_string())
            .with("estado", self.state.code())
            .with("condicion_fisica", self.condition.code());
        if let Some(description) = &self.description {
            form.insert("descripcion", description);
        }
        form
    }
}

/// A stored piece of equipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    /// Store-assigned identifier
    pub id: EquipmentId,
    /// Current data
    #[serde(flatten)]
    pub data: NewEquipment,
    /// When the record was created
    #[serde(rename = "fecha_registro")]
    pub registered_at: DateTime<Utc>,
    /// When the record was last edited
    #[serde(rename = "fecha_actualizacion")]
    pub updated_at: DateTime<Utc>,
}

impl fmt::Display for Equipment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} {} ({})",
            self.data.equipment_type,
            self.data.brand,
            self.data.model,
            self.data.inventory_code
        )
    }
}

/// Listing filter. Every set criterion must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EquipmentFilter {
    /// Case-insensitive substring of code, brand, model or serial number
    #[serde(rename = "q")]
    pub query: Option<String>,
    /// Exact type
    #[serde(rename = "tipo")]
    pub equipment_type: Option<EquipmentType>,
    /// Exact state
    #[serde(rename = "estado")]
    pub state: Option<EquipmentState>,
}

impl EquipmentFilter {
    /// Builds a filter from query parameters `q`, `tipo` and `estado`.
    ///
    /// Blank parameters are ignored; unknown codes are a validation error.
    pub fn from_query(params: &FormData) -> Result<Self> {
        let query = params.value("q").map(str::to_string);
        let equipment_type = params
            .value("tipo")
            .map(|code| code.parse::<EquipmentType>())
            .transpose()
            .map_err(|e| Error::validation_field("tipo", invalid_choice(&e.value)))?;
        let state = params
            .value("estado")
            .map(|code| code.parse::<EquipmentState>())
            .transpose()
            .map_err(|e| Error::validation_field("estado", invalid_choice(&e.value)))?;
        Ok(Self {
            query,
            equipment_type,
            state,
        })
    }

    /// Filter on state only.
    pub fn by_state(state: EquipmentState) -> Self {
        Self {
            state: Some(state),
            ..Self::default()
        }
    }

    /// Whether no criterion is set.
    pub fn is_empty(&self) -> bool {
        self.query.is_none() && self.equipment_type.is_none() && self.state.is_none()
    }

    /// Whether a record satisfies every set criterion.
    pub fn matches(&self, equipment: &Equipment) -> bool {
        let data = &equipment.data;
        if let Some(kind) = self.equipment_type {
            if data.equipment_type != kind {
                return false;
            }
        }
        if let Some(state) = self.state {
            if data.state != state {
                return false;
            }
        }
        match &self.query {
            Some(q) => {
                let needle = q.to_lowercase();
                [
                    &data.inventory_code,
                    &data.brand,
                    &data.model,
                    &data.serial_number,
                ]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
            }
            None => true,
        }
    }
}

fn invalid_choice(value: &str) -> String {
    format!("Escoja una opción válida. {value} no es una de las opciones disponibles.")
}
