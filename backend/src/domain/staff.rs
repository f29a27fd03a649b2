//! Staff members working at a clinic.

use serde::{Deserialize, Serialize};

use super::{ClinicId, Role, StaffId};

/// A staff member as listed on scheduling screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    pub id: StaffId,
    pub clinic_id: ClinicId,
    pub name: String,
    /// Canonical role; deprecated names are normalised on load.
    pub role: Role,
    pub is_active: bool,
}
