//! PostgreSQL-backed `PermissionRepository`.
//!
//! Roles are stored as written and normalised on read, so rows still holding
//! deprecated names keep working.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PermissionRepository, PermissionRepositoryError};
use crate::domain::{ClinicId, UserId, UserPermission};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::UserPermissionRow;
use super::pool::DbPool;
use super::schema::user_permissions;

#[derive(Clone)]
pub struct DieselPermissionRepository {
    pool: DbPool,
}

impl DieselPermissionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionRepository for DieselPermissionRepository {
    async fn find_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserPermission>, PermissionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserPermissionRow> = user_permissions::table
            .find(*user_id.as_uuid())
            .select(UserPermissionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(UserPermission::from))
    }

    async fn list_for_clinic(
        &self,
        clinic_id: &ClinicId,
    ) -> Result<Vec<UserPermission>, PermissionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserPermissionRow> = user_permissions::table
            .filter(user_permissions::clinic_id.eq(*clinic_id.as_uuid()))
            .select(UserPermissionRow::as_select())
            .order_by(user_permissions::user_id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(UserPermission::from).collect())
    }

    async fn upsert(&self, permission: &UserPermission) -> Result<(), PermissionRepositoryError> {
        let row = UserPermissionRow::from(permission);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(user_permissions::table)
            .values(&row)
            .on_conflict(user_permissions::user_id)
            .do_update()
            .set((
                user_permissions::role.eq(excluded(user_permissions::role)),
                user_permissions::clinic_id.eq(excluded(user_permissions::clinic_id)),
                user_permissions::clinic_scope_ids.eq(excluded(user_permissions::clinic_scope_ids)),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
