//! UUID-backed identifiers for domain entities.
//!
//! Each identifier is a distinct type so a patient id can never be passed
//! where a clinic id is expected. Parsing rejects blanks, padding and
//! anything that is not a UUID.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors raised when parsing an identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
    /// The raw value was empty.
    #[error("{kind} must not be empty")]
    Empty { kind: &'static str },
    /// The raw value was padded or not a UUID.
    #[error("{kind} must be a valid UUID")]
    Invalid { kind: &'static str },
}

fn parse_identifier(raw: &str, kind: &'static str) -> Result<Uuid, IdentifierError> {
    if raw.is_empty() {
        return Err(IdentifierError::Empty { kind });
    }
    if raw.trim() != raw {
        return Err(IdentifierError::Invalid { kind });
    }
    Uuid::parse_str(raw).map_err(|_| IdentifierError::Invalid { kind })
}

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident => $kind:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(Uuid);

        impl $name {
            /// Validate and construct the identifier from a string.
            pub fn new(raw: impl AsRef<str>) -> Result<Self, IdentifierError> {
                parse_identifier(raw.as_ref(), $kind).map(Self)
            }

            /// Wrap an already-parsed UUID.
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Generate a new random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = IdentifierError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdentifierError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0.to_string()
            }
        }
    };
}

uuid_identifier! {
    /// Authenticated account identifier issued by the identity provider.
    UserId => "user id"
}

uuid_identifier! {
    /// Tenant identifier; every clinical record is scoped by one.
    ClinicId => "clinic id"
}

uuid_identifier! {
    /// Patient record identifier.
    PatientId => "patient id"
}

uuid_identifier! {
    /// Visit (treatment record) identifier.
    VisitId => "visit id"
}

uuid_identifier! {
    /// Reservation identifier.
    ReservationId => "reservation id"
}

uuid_identifier! {
    /// Staff member identifier.
    StaffId => "staff id"
}

uuid_identifier! {
    /// Notification identifier.
    NotificationId => "notification id"
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", IdentifierError::Empty { kind: "clinic id" })]
    #[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", IdentifierError::Invalid { kind: "clinic id" })]
    #[case("clinic-deny", IdentifierError::Invalid { kind: "clinic id" })]
    fn rejects_invalid_clinic_ids(#[case] raw: &str, #[case] expected: IdentifierError) {
        assert_eq!(ClinicId::new(raw), Err(expected));
    }

    #[rstest]
    fn serde_round_trips_through_strings() {
        let id = PatientId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id");
        let json = serde_json::to_string(&id).expect("serialise");
        assert_eq!(json, "\"3fa85f64-5717-4562-b3fc-2c963f66afa6\"");
        let back: PatientId = serde_json::from_str(&json).expect("deserialise");
        assert_eq!(back, id);
    }

    #[rstest]
    fn error_message_names_the_kind() {
        let err = StaffId::new("nope").expect_err("invalid");
        assert_eq!(err.to_string(), "staff id must be a valid UUID");
    }
}
