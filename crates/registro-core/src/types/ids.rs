//! Identifier types for stored records and browser sessions.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Declares an integer record identifier assigned by the record store.
macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw store identifier.
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw store identifier.
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                Ok(Self(s.trim().parse()?))
            }
        }
    };
}

record_id!(
    /// Identifier of an educational institution.
    InstitutionId
);
record_id!(
    /// Identifier of an accessibility survey.
    SurveyId
);
record_id!(
    /// Identifier of a piece of IT equipment.
    EquipmentId
);
record_id!(
    /// Identifier of a physical location.
    LocationId
);
record_id!(
    /// Identifier of an equipment assignment.
    AssignmentId
);
record_id!(
    /// Identifier of a maintenance event.
    MaintenanceId
);

/// Identifier of a browser session.
///
/// Internally represented as a UUID v4 and carried in the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Creates a new random session ID.
    ///
    /// # Examples
    ///
    /// ```
    /// use registro_core::SessionId;
    ///
    /// let id = SessionId::new();
    /// println!("Session ID: {}", id);
    /// ```
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a session ID from a UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}
