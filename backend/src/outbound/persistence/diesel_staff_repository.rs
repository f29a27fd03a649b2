//! PostgreSQL-backed `StaffRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{StaffRepository, StaffRepositoryError};
use crate::domain::{ClinicId, Staff};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::StaffRow;
use super::pool::DbPool;
use super::schema::staff;

#[derive(Clone)]
pub struct DieselStaffRepository {
    pool: DbPool,
}

impl DieselStaffRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StaffRepository for DieselStaffRepository {
    async fn list(&self, clinic_id: &ClinicId) -> Result<Vec<Staff>, StaffRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<StaffRow> = staff::table
            .filter(staff::clinic_id.eq(*clinic_id.as_uuid()))
            .select(StaffRow::as_select())
            .order_by((staff::name.asc(), staff::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(Staff::from).collect())
    }
}
