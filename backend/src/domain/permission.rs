//! Per-user permission records and clinic scope.

use serde::{Deserialize, Serialize};

use super::{ClinicId, Error, Role, UserId};

/// Permission record loaded for an authenticated principal.
///
/// ## Invariants
/// - `role` is already normalised; deprecated names never reach this type.
/// - An empty `clinic_scope_ids` list is treated the same as no list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPermission {
    pub user_id: UserId,
    pub role: Role,
    /// Home clinic of the user.
    pub clinic_id: Option<ClinicId>,
    /// Explicit multi-clinic scope, used instead of the home clinic when set.
    pub clinic_scope_ids: Option<Vec<ClinicId>>,
}

impl UserPermission {
    /// Build a permission record, normalising the raw role name.
    pub fn from_raw_role(
        user_id: UserId,
        raw_role: &str,
        clinic_id: Option<ClinicId>,
        clinic_scope_ids: Option<Vec<ClinicId>>,
    ) -> Self {
        Self {
            user_id,
            role: Role::normalize(raw_role),
            clinic_id,
            clinic_scope_ids,
        }
    }

    /// Clinics this principal may access.
    ///
    /// # Examples
    /// ```
    /// use clinic_backend::domain::{ClinicId, Role, UserId, UserPermission};
    ///
    /// let home = ClinicId::random();
    /// let permission = UserPermission {
    ///     user_id: UserId::random(),
    ///     role: Role::Staff,
    ///     clinic_id: Some(home),
    ///     clinic_scope_ids: None,
    /// };
    /// assert!(permission.scope().permits(&home));
    /// ```
    pub fn scope(&self) -> ClinicScope {
        match self.clinic_scope_ids.as_deref() {
            Some(ids) if !ids.is_empty() => ClinicScope::new(ids.to_vec()),
            _ => ClinicScope::new(self.clinic_id.into_iter().collect()),
        }
    }
}

/// The set of clinic identifiers a principal is permitted to access.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClinicScope(Vec<ClinicId>);

impl ClinicScope {
    fn new(mut ids: Vec<ClinicId>) -> Self {
        ids.sort();
        ids.dedup();
        Self(ids)
    }

    /// Whether `clinic_id` lies inside the scope.
    pub fn permits(&self, clinic_id: &ClinicId) -> bool {
        self.0.binary_search(clinic_id).is_ok()
    }

    /// Sorted, de-duplicated clinic identifiers.
    pub fn clinic_ids(&self) -> &[ClinicId] {
        &self.0
    }

    /// True when the principal may access no clinic at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Check that `grantor` may store `grant`.
///
/// Callers can only hand out clinics inside their own scope, and only
/// headquarters callers can hand out headquarters privilege.
///
/// # Errors
/// Returns `invalid_request` for unrecognised roles and `forbidden` when the
/// grant exceeds the grantor's own authority.
pub fn authorize_grant(grantor: &UserPermission, grant: &UserPermission) -> Result<(), Error> {
    if !grant.role.is_recognised() {
        return Err(Error::invalid_request(format!(
            "unknown role: {}",
            grant.role
        )));
    }
    if grant.role.is_headquarters() && !grantor.role.is_headquarters() {
        return Err(Error::forbidden(
            "only headquarters administrators may grant the admin role",
        ));
    }
    ensure_within_scope(grantor, grant, "cannot grant access to clinic")
}

/// Check that `grantor` may replace the grantee's `existing` record.
///
/// A record can only be rewritten by someone whose scope covers every clinic
/// it grants, and headquarters records only by headquarters.
///
/// # Errors
/// Returns `forbidden` when the existing record lies beyond the grantor's
/// authority.
pub fn authorize_replacement(
    grantor: &UserPermission,
    existing: &UserPermission,
) -> Result<(), Error> {
    if existing.role.is_headquarters() && !grantor.role.is_headquarters() {
        return Err(Error::forbidden(
            "only headquarters administrators may change an admin record",
        ));
    }
    ensure_within_scope(grantor, existing, "cannot change access held for clinic")
}

fn ensure_within_scope(
    grantor: &UserPermission,
    record: &UserPermission,
    action: &str,
) -> Result<(), Error> {
    let grantor_scope = grantor.scope();
    let outside = record
        .scope()
        .clinic_ids()
        .iter()
        .find(|id| !grantor_scope.permits(id))
        .copied();
    match outside {
        Some(clinic_id) => Err(Error::forbidden(format!(
            "{action} {clinic_id} outside your scope"
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::{fixture, rstest};

    fn clinic(n: u8) -> ClinicId {
        ClinicId::new(format!("00000000-0000-0000-0000-0000000000{n:02}")).expect("clinic id")
    }

    #[fixture]
    fn headquarters() -> UserPermission {
        UserPermission {
            user_id: UserId::random(),
            role: Role::Admin,
            clinic_id: Some(clinic(1)),
            clinic_scope_ids: Some(vec![clinic(1), clinic(2), clinic(3)]),
        }
    }

    #[rstest]
    fn explicit_scope_replaces_home_clinic(headquarters: UserPermission) {
        let scope = headquarters.scope();
        assert!(scope.permits(&clinic(3)));
        assert!(!scope.permits(&clinic(4)));
    }

    #[rstest]
    fn empty_scope_list_falls_back_to_home_clinic() {
        let permission = UserPermission {
            user_id: UserId::random(),
            role: Role::Staff,
            clinic_id: Some(clinic(7)),
            clinic_scope_ids: Some(Vec::new()),
        };
        assert_eq!(permission.scope().clinic_ids(), &[clinic(7)]);
    }

    #[rstest]
    fn no_home_and_no_scope_is_empty() {
        let permission = UserPermission::from_raw_role(UserId::random(), "staff", None, None);
        assert!(permission.scope().is_empty());
    }

    #[rstest]
    fn from_raw_role_normalises_deprecated_names() {
        let permission =
            UserPermission::from_raw_role(UserId::random(), "clinic_manager", None, None);
        assert_eq!(permission.role, Role::ClinicAdmin);
    }

    #[rstest]
    fn grant_within_scope_is_allowed(headquarters: UserPermission) {
        let grant = UserPermission {
            user_id: UserId::random(),
            role: Role::Therapist,
            clinic_id: Some(clinic(2)),
            clinic_scope_ids: None,
        };
        assert!(authorize_grant(&headquarters, &grant).is_ok());
    }

    #[rstest]
    fn grant_outside_scope_is_forbidden(headquarters: UserPermission) {
        let grant = UserPermission {
            user_id: UserId::random(),
            role: Role::Therapist,
            clinic_id: Some(clinic(9)),
            clinic_scope_ids: None,
        };
        let err = authorize_grant(&headquarters, &grant).expect_err("outside scope");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    fn clinic_admin_cannot_grant_admin() {
        let grantor = UserPermission {
            user_id: UserId::random(),
            role: Role::ClinicAdmin,
            clinic_id: Some(clinic(1)),
            clinic_scope_ids: None,
        };
        let grant = UserPermission {
            user_id: UserId::random(),
            role: Role::Admin,
            clinic_id: Some(clinic(1)),
            clinic_scope_ids: None,
        };
        let err = authorize_grant(&grantor, &grant).expect_err("escalation");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    fn clinic_admin_cannot_rewrite_headquarters_records(headquarters: UserPermission) {
        let grantor = UserPermission {
            user_id: UserId::random(),
            role: Role::ClinicAdmin,
            clinic_id: Some(clinic(1)),
            clinic_scope_ids: None,
        };
        let err = authorize_replacement(&grantor, &headquarters).expect_err("hq record");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[case(Some(clinic(2)), None, false)]
    #[case(Some(clinic(1)), Some(vec![clinic(1), clinic(2)]), false)]
    #[case(Some(clinic(1)), None, true)]
    #[case(None, None, true)]
    fn replacement_requires_the_existing_scope(
        #[case] home: Option<ClinicId>,
        #[case] scope: Option<Vec<ClinicId>>,
        #[case] allowed: bool,
    ) {
        let grantor = UserPermission {
            user_id: UserId::random(),
            role: Role::ClinicAdmin,
            clinic_id: Some(clinic(1)),
            clinic_scope_ids: None,
        };
        let existing = UserPermission {
            user_id: UserId::random(),
            role: Role::Therapist,
            clinic_id: home,
            clinic_scope_ids: scope,
        };
        assert_eq!(authorize_replacement(&grantor, &existing).is_ok(), allowed);
    }

    #[rstest]
    fn unrecognised_roles_cannot_be_granted(headquarters: UserPermission) {
        let grant = UserPermission::from_raw_role(UserId::random(), "wizard", Some(clinic(1)), None);
        let err = authorize_grant(&headquarters, &grant).expect_err("unknown role");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }
}
