//! Staff roles and deprecated-role compatibility.
//!
//! Permission records may still carry role names from older releases.
//! [`Role::normalize`] maps every raw value onto a canonical role exactly
//! once, when the permission record enters the domain. Nothing downstream
//! compares raw role strings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Deprecated role names and the canonical role that replaced them.
const DEPRECATED_ROLE_ALIASES: &[(&str, Role)] = &[
    ("clinic_manager", Role::ClinicAdmin),
    ("practitioner", Role::Therapist),
];

/// Canonical staff role.
///
/// ## Invariants
/// - `Role::normalize(role.as_str()) == role` for every role.
/// - Only [`Role::Admin`] carries headquarters (cross-clinic) privilege.
/// - [`Role::Unrecognised`] carries no privilege at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// Headquarters administrator acting across the organisation's clinics.
    Admin,
    /// Administrator of a single clinic.
    ClinicAdmin,
    /// Front-desk or operations manager.
    Manager,
    /// Treating practitioner.
    Therapist,
    /// General staff.
    Staff,
    /// A role name this release does not know, kept verbatim (normalised).
    Unrecognised(String),
}

impl Role {
    /// Map a raw role string to its canonical role.
    ///
    /// Total and pure: input is trimmed and lowercased, deprecated names are
    /// replaced, and unknown names become [`Role::Unrecognised`].
    ///
    /// # Examples
    /// ```
    /// use clinic_backend::domain::Role;
    ///
    /// assert_eq!(Role::normalize("clinic_manager"), Role::ClinicAdmin);
    /// assert_eq!(Role::normalize(" Therapist "), Role::Therapist);
    /// let role = Role::normalize("practitioner");
    /// assert_eq!(Role::normalize(role.as_str()), role);
    /// ```
    pub fn normalize(raw: &str) -> Self {
        let lowered = raw.trim().to_ascii_lowercase();
        if let Some((_, role)) = DEPRECATED_ROLE_ALIASES
            .iter()
            .find(|(alias, _)| *alias == lowered)
        {
            return role.clone();
        }
        match lowered.as_str() {
            "admin" => Self::Admin,
            "clinic_admin" => Self::ClinicAdmin,
            "manager" => Self::Manager,
            "therapist" => Self::Therapist,
            "staff" => Self::Staff,
            _ => Self::Unrecognised(lowered),
        }
    }

    /// Canonical wire name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "admin",
            Self::ClinicAdmin => "clinic_admin",
            Self::Manager => "manager",
            Self::Therapist => "therapist",
            Self::Staff => "staff",
            Self::Unrecognised(raw) => raw.as_str(),
        }
    }

    /// Whether the role may act across clinics within its organisation.
    ///
    /// Headquarters privilege bypasses role allow-lists but never the clinic
    /// scope check.
    pub fn is_headquarters(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Whether this role is one the current release recognises.
    pub fn is_recognised(&self) -> bool {
        !matches!(self, Self::Unrecognised(_))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Self::normalize(&value)
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.as_str().to_owned()
    }
}
