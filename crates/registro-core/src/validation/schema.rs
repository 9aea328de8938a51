//! Declarative field schemas and the generic validator.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;

use super::{FieldErrors, FormData};
use crate::error::{Error, Result};

// ============================================================================
// Messages
// ============================================================================

/// Message for a required field that was missing or blank.
pub const REQUIRED: &str = "Este campo es obligatorio.";
/// Message for an unparseable date.
pub const INVALID_DATE: &str = "Introduzca una fecha válida.";
/// Message for an unparseable integer.
pub const INVALID_INTEGER: &str = "Introduzca un número entero.";
/// Message for an unparseable decimal number.
pub const INVALID_NUMBER: &str = "Introduzca un número.";
/// Message for a malformed e-mail address.
pub const INVALID_EMAIL: &str = "Introduzca una dirección de correo electrónico válida.";
/// Message for a reference that is not a positive identifier.
pub const INVALID_REFERENCE: &str =
    "Escoja una opción válida. Esa opción no es una de las disponibles.";

/// Date format accepted by date fields.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[allow(clippy::expect_used)]
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .expect("Invalid e-mail regex")
});

// ============================================================================
// Schema
// ============================================================================

/// One rule a submitted field value must satisfy.
///
/// Constraints are checked in declaration order; the first failure is the
/// one reported. Parsing constraints (`IntRange`, `Decimal`, `Date`,
/// `Reference`) also decide the typed [`Value`] the field cleans to, so
/// value checks such as `NonNegative` must come after them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// Missing or blank is an error.
    Required,
    /// At most this many characters.
    MaxLength(usize),
    /// Must be one of these codes.
    OneOf(&'static [&'static str]),
    /// Integer within `min..=max`.
    IntRange {
        /// Inclusive lower bound
        min: i64,
        /// Inclusive upper bound
        max: i64,
    },
    /// Fixed-point decimal with bounded precision.
    Decimal {
        /// Total significant digits
        max_digits: u32,
        /// Digits after the point
        decimal_places: u32,
    },
    /// Parsed number must not be negative.
    NonNegative,
    /// Calendar date in `YYYY-MM-DD`.
    Date,
    /// E-mail address.
    Email,
    /// Positive identifier of another record.
    Reference,
}

/// Validation rules for one form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Submitted field name
    pub name: &'static str,
    /// Human-readable label
    pub label: &'static str,
    /// Rules, checked in order
    pub constraints: &'static [Constraint],
}

/// Static validation table for one record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    /// Record type name, used in log events
    pub record: &'static str,
    /// Field rules in form order
    pub fields: &'static [FieldSpec],
}

/// Field description handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormField {
    /// Submitted field name
    pub name: &'static str,
    /// Human-readable label
    pub label: &'static str,
    /// Whether the field must be filled in
    pub required: bool,
    /// Maximum length, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Allowed codes, if the field is a choice
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<&'static [&'static str]>,
}

impl Schema {
    /// Looks up a field rule by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Describes every field for rendering a blank or bound form.
    pub fn form_fields(&self) -> Vec<FormField> {
        self.fields.iter().map(FieldSpec::describe).collect()
    }
}

impl FieldSpec {
    /// Whether the field carries [`Constraint::Required`].
    pub fn is_required(&self) -> bool {
        self.constraints.contains(&Constraint::Required)
    }

    fn describe(&self) -> FormField {
        FormField {
            name: self.name,
            label: self.label,
            required: self.is_required(),
            max_length: self.constraints.iter().find_map(|c| match c {
                Constraint::MaxLength(n) => Some(*n),
                _ => None,
            }),
            choices: self.constraints.iter().find_map(|c| match c {
                Constraint::OneOf(codes) => Some(*codes),
                _ => None,
            }),
        }
    }

    fn clean(&self, raw: Option<&str>) -> std::result::Result<Option<Value>, String> {
        let Some(raw) = raw else {
            return if self.is_required() {
                Err(REQUIRED.to_string())
            } else {
                Ok(None)
            };
        };

        let mut value = Value::Text(raw.to_string());
        for constraint in self.constraints {
            value = constraint.check(raw, value)?;
        }
        Ok(Some(value))
    }
}

impl Constraint {
    fn check(&self, raw: &str, value: Value) -> std::result::Result<Value, String> {
        match *self {
            Constraint::Required => Ok(value),
            Constraint::MaxLength(limit) => {
                let len = raw.chars().count();
                if len > limit {
                    Err(format!(
                        "Asegúrese de que este valor tenga a lo sumo {limit} caracteres (tiene {len})."
                    ))
                } else {
                    Ok(value)
                }
            }
            Constraint::OneOf(codes) => {
                if codes.contains(&raw) {
                    Ok(value)
                } else {
                    Err(format!(
                        "Escoja una opción válida. {raw} no es una de las opciones disponibles."
                    ))
                }
            }
            Constraint::IntRange { min, max } => {
                let n: i64 = raw.parse().map_err(|_| INVALID_INTEGER.to_string())?;
                if n < min {
                    Err(format!(
                        "Asegúrese de que este valor es mayor o igual a {min}."
                    ))
                } else if n > max {
                    Err(format!(
                        "Asegúrese de que este valor es menor o igual a {max}."
                    ))
                } else {
                    Ok(Value::Int(n))
                }
            }
            Constraint::Decimal {
                max_digits,
                decimal_places,
            } => {
                let d = Decimal::from_str(raw).map_err(|_| INVALID_NUMBER.to_string())?;
                check_precision(d, max_digits, decimal_places)?;
                Ok(Value::Decimal(d))
            }
            Constraint::NonNegative => match value {
                Value::Int(n) if n < 0 => Err(non_negative_message()),
                Value::Decimal(d) if d.is_sign_negative() && !d.is_zero() => {
                    Err(non_negative_message())
                }
                other => Ok(other),
            },
            Constraint::Date => NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .map(Value::Date)
                .map_err(|_| INVALID_DATE.to_string()),
            Constraint::Email => {
                if raw.len() <= 254 && EMAIL_RE.is_match(raw) {
                    Ok(value)
                } else {
                    Err(INVALID_EMAIL.to_string())
                }
            }
            Constraint::Reference => match raw.parse::<i64>() {
                Ok(id) if id > 0 => Ok(Value::Id(id)),
                _ => Err(INVALID_REFERENCE.to_string()),
            },
        }
    }
}

fn non_negative_message() -> String {
    "Asegúrese de que este valor es mayor o igual a 0.".to_string()
}

fn check_precision(d: Decimal, max_digits: u32, decimal_places: u32) -> std::result::Result<(), String> {
    let scale = d.scale();
    let mantissa_digits = d.mantissa().unsigned_abs().to_string().len() as u32;
    let digits = mantissa_digits.max(scale);
    let whole_digits = digits - scale;

    if digits > max_digits {
        return Err(format!(
            "Asegúrese de que no hay más de {max_digits} dígitos en total."
        ));
    }
    if scale > decimal_places {
        return Err(format!(
            "Asegúrese de que no hay más de {decimal_places} decimales."
        ));
    }
    let max_whole = max_digits.saturating_sub(decimal_places);
    if whole_digits > max_whole {
        return Err(format!(
            "Asegúrese de que no hay más de {max_whole} dígitos antes del punto decimal."
        ));
    }
    Ok(())
}

// ============================================================================
// Cleaned data
// ============================================================================

/// A field value after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Trimmed text (also choice codes)
    Text(String),
    /// Integer
    Int(i64),
    /// Decimal number
    Decimal(Decimal),
    /// Calendar date
    Date(NaiveDate),
    /// Identifier of another record
    Id(i64),
}

/// Validated, typed form values. Absent optional fields have no entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedForm {
    record: &'static str,
    values: BTreeMap<&'static str, Value>,
}

impl CleanedForm {
    /// Record type this form was validated against.
    pub fn record(&self) -> &'static str {
        self.record
    }

    /// Whether a value is present.
    pub fn has(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    /// Optional text value.
    pub fn text(&self, field: &str) -> Option<String> {
        match self.values.get(field) {
            Some(Value::Text(s)) => Some(s.clone()),
            _ => None,
        }
    }

    /// Required text value.
    pub fn require_text(&self, field: &str) -> Result<String> {
        self.text(field).ok_or_else(|| missing(field))
    }

    /// Optional text value, empty string when absent.
    pub fn text_or_empty(&self, field: &str) -> String {
        self.text(field).unwrap_or_default()
    }

    /// Optional choice value parsed from its code.
    pub fn choice<T: FromStr>(&self, field: &str) -> Result<Option<T>> {
        match self.values.get(field) {
            Some(Value::Text(code)) => code
                .parse()
                .map(Some)
                .map_err(|_| Error::validation_field(field, format!(
                    "Escoja una opción válida. {code} no es una de las opciones disponibles."
                ))),
            _ => Ok(None),
        }
    }

    /// Required choice value.
    pub fn require_choice<T: FromStr>(&self, field: &str) -> Result<T> {
        self.choice(field)?.ok_or_else(|| missing(field))
    }

    /// Optional integer.
    pub fn int(&self, field: &str) -> Option<i64> {
        match self.values.get(field) {
            Some(Value::Int(n)) => Some(*n),
            _ => None,
        }
    }

    /// Required integer.
    pub fn require_int(&self, field: &str) -> Result<i64> {
        self.int(field).ok_or_else(|| missing(field))
    }

    /// Optional decimal.
    pub fn decimal(&self, field: &str) -> Option<Decimal> {
        match self.values.get(field) {
            Some(Value::Decimal(d)) => Some(*d),
            _ => None,
        }
    }

    /// Required decimal.
    pub fn require_decimal(&self, field: &str) -> Result<Decimal> {
        self.decimal(field).ok_or_else(|| missing(field))
    }

    /// Optional date.
    pub fn date(&self, field: &str) -> Option<NaiveDate> {
        match self.values.get(field) {
            Some(Value::Date(d)) => Some(*d),
            _ => None,
        }
    }

    /// Required date.
    pub fn require_date(&self, field: &str) -> Result<NaiveDate> {
        self.date(field).ok_or_else(|| missing(field))
    }

    /// Optional record reference.
    pub fn id<T: From<i64>>(&self, field: &str) -> Option<T> {
        match self.values.get(field) {
            Some(Value::Id(id)) => Some(T::from(*id)),
            _ => None,
        }
    }

    /// Required record reference.
    pub fn require_id<T: From<i64>>(&self, field: &str) -> Result<T> {
        self.id(field).ok_or_else(|| missing(field))
    }
}

fn missing(field: &str) -> Error {
    Error::validation_field(field, REQUIRED)
}

// ============================================================================
// Validator
// ============================================================================

/// Checks a submission against a schema.
///
/// Every field is checked; all failures are reported together. Fields the
/// schema does not name are ignored.
///
/// # Errors
///
/// Returns [`Error::Validation`] with one entry per rejected field.
pub fn validate(schema: &Schema, form: &FormData) -> Result<CleanedForm> {
    let mut errors = FieldErrors::new();
    let mut values = BTreeMap::new();

    for field in schema.fields {
        match field.clean(form.value(field.name)) {
            Ok(Some(value)) => {
                values.insert(field.name, value);
            }
            Ok(None) => {}
            Err(message) => errors.add(field.name, message),
        }
    }

    errors.into_result()?;
    Ok(CleanedForm {
        record: schema.record,
        values,
    })
}
