//! Closed choice sets stored by code and displayed by label.
//!
//! Every enumeration here round-trips through its stored code (`"CASI_SIEMPRE"`,
//! `"DAÑADO"`, ...), which is also what forms submit and what the record
//! store persists.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A code that is not a member of the expected choice set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not a valid {kind}")]
pub struct UnknownChoice {
    /// Name of the choice set
    pub kind: &'static str,
    /// The rejected code
    pub value: String,
}

/// One row of a choice table, as handed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Choice {
    /// Stored code
    pub code: &'static str,
    /// Display label
    pub label: &'static str,
}

macro_rules! choices {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => ($code:literal, $label:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                #[doc = $label]
                $variant
            ),+
        }

        impl $name {
            /// Every member, in display order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Every stored code, in display order.
            pub const CODES: &'static [&'static str] = &[$($code),+];

            /// Stored code.
            pub const fn code(self) -> &'static str {
                match self {
                    $($name::$variant => $code),+
                }
            }

            /// Display label.
            pub const fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// Choice table for the presentation layer.
            pub fn choices() -> Vec<Choice> {
                Self::ALL
                    .iter()
                    .map(|c| Choice {
                        code: c.code(),
                        label: c.label(),
                    })
                    .collect()
            }
        }

        impl FromStr for $name {
            type Err = UnknownChoice;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|c| c.code() == s)
                    .ok_or_else(|| UnknownChoice {
                        kind: stringify!($name),
                        value: s.to_string(),
                    })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.code())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.code())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let code = String::deserialize(deserializer)?;
                code.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

choices!(
    /// Legal regime of an educational institution.
    InstitutionType {
        Publica => ("PUBLICA", "Pública"),
        Privada => ("PRIVADA", "Privada"),
        Fiscomisional => ("FISCOMISIONAL", "Fiscomisional"),
        Municipal => ("MUNICIPAL", "Municipal"),
    }
);

choices!(
    /// Frequency answer to one survey question.
    Response {
        Siempre => ("SIEMPRE", "Siempre"),
        CasiSiempre => ("CASI_SIEMPRE", "Casi Siempre"),
        AVeces => ("AVECES", "A veces"),
        CasiNunca => ("CASI_NUNCA", "Casi Nunca"),
        Nunca => ("NUNCA", "Nunca"),
        NoAplica => ("NO_APLICA", "No aplica"),
    }
);

impl Default for Response {
    fn default() -> Self {
        Response::NoAplica
    }
}

choices!(
    /// Kind of IT equipment.
    EquipmentType {
        Computadora => ("COMPUTADORA", "Computadora"),
        Laptop => ("LAPTOP", "Laptop"),
        Impresora => ("IMPRESORA", "Impresora"),
        Proyector => ("PROYECTOR", "Proyector"),
        Tablet => ("TABLET", "Tablet"),
        Server => ("SERVER", "Servidor"),
        Switch => ("SWITCH", "Switch"),
        Router => ("ROUTER", "Router"),
        Monitor => ("MONITOR", "Monitor"),
        Televisor => ("TELEVISOR", "Televisor"),
    }
);

choices!(
    /// Operational state of a piece of equipment.
    EquipmentState {
        Operativo => ("OPERATIVO", "Operativo"),
        Mantenimiento => ("MANTENIMIENTO", "En Mantenimiento"),
        Danado => ("DAÑADO", "Dañado"),
        Baja => ("BAJA", "Dado de Baja"),
    }
);

choices!(
    /// Physical condition of a piece of equipment.
    PhysicalCondition {
        Excelente => ("EXCELENTE", "Excelente"),
        Bueno => ("BUENO", "Bueno"),
        Regular => ("REGULAR", "Regular"),
        Malo => ("MALO", "Malo"),
    }
);

choices!(
    /// Kind of maintenance event.
    MaintenanceType {
        Preventivo => ("PREVENTIVO", "Preventivo"),
        Correctivo => ("CORRECTIVO", "Correctivo"),
        Predictivo => ("PREDICTIVO", "Predictivo"),
        Calibracion => ("CALIBRACION", "Calibración"),
    }
);
