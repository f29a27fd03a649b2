//! Permission administration use-cases.

use std::sync::Arc;

use tracing::info;

use super::permission::{authorize_grant, authorize_replacement};
use super::ports::PermissionRepository;
use super::{ClinicId, Error, UserPermission};

#[derive(Clone)]
pub struct PermissionService {
    permissions: Arc<dyn PermissionRepository>,
}

impl PermissionService {
    pub fn new(permissions: Arc<dyn PermissionRepository>) -> Self {
        Self { permissions }
    }

    pub async fn list_for_clinic(&self, clinic_id: &ClinicId) -> Result<Vec<UserPermission>, Error> {
        Ok(self.permissions.list_for_clinic(clinic_id).await?)
    }

    /// Store `grant` on behalf of `grantor`.
    ///
    /// The role is normalised before storage.
    ///
    /// An existing record for the grantee must itself lie within the
    /// grantor's authority before it is replaced.
    ///
    /// # Errors
    /// See [`authorize_grant`] and [`authorize_replacement`].
    pub async fn grant(
        &self,
        grantor: &UserPermission,
        grant: UserPermission,
    ) -> Result<UserPermission, Error> {
        let grant = UserPermission::from_raw_role(
            grant.user_id,
            grant.role.as_str(),
            grant.clinic_id,
            grant.clinic_scope_ids,
        );
        authorize_grant(grantor, &grant)?;
        if let Some(existing) = self.permissions.find_by_user(&grant.user_id).await? {
            let existing = UserPermission::from_raw_role(
                existing.user_id,
                existing.role.as_str(),
                existing.clinic_id,
                existing.clinic_scope_ids,
            );
            authorize_replacement(grantor, &existing)?;
        }
        self.permissions.upsert(&grant).await?;
        info!(
            grantor = %grantor.user_id,
            grantee = %grant.user_id,
            role = %grant.role,
            "permission granted"
        );
        Ok(grant)
    }
}
