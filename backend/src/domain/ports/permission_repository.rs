//! Port for per-user permission records.
//!
//! The access guard loads permissions through this port on every request,
//! and the admin endpoints store grants through it.

use async_trait::async_trait;

use crate::domain::{ClinicId, UserId, UserPermission};

use super::define_port_error;

define_port_error! {
    /// Errors raised by permission repository adapters.
    pub enum PermissionRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "permission repository connection failed: {message}" ; service_unavailable,
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "permission repository query failed: {message}" ; internal,
    }
}

/// Storage for [`UserPermission`] records.
///
/// Adapters return roles already normalised; see
/// [`UserPermission::from_raw_role`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Permission record for `user_id`, or `None` when the user has none.
    async fn find_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserPermission>, PermissionRepositoryError>;

    /// Records whose home clinic or scope list includes `clinic_id`.
    async fn list_for_clinic(
        &self,
        clinic_id: &ClinicId,
    ) -> Result<Vec<UserPermission>, PermissionRepositoryError>;

    /// Insert or replace the record for `permission.user_id`.
    async fn upsert(&self, permission: &UserPermission) -> Result<(), PermissionRepositoryError>;
}
