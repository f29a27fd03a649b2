//! PostgreSQL-backed `ClinicRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ClinicRepository, ClinicRepositoryError};
use crate::domain::{Clinic, ClinicId, ClinicSettings};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{ClinicRow, ClinicSettingsRow};
use super::pool::DbPool;
use super::schema::{clinic_settings, clinics};

/// Diesel implementation of [`ClinicRepository`].
#[derive(Clone)]
pub struct DieselClinicRepository {
    pool: DbPool,
}

impl DieselClinicRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClinicRepository for DieselClinicRepository {
    async fn list_by_ids(&self, ids: &[ClinicId]) -> Result<Vec<Clinic>, ClinicRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ClinicRow> = clinics::table
            .filter(clinics::id.eq_any(ids))
            .select(ClinicRow::as_select())
            .order_by(clinics::name.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(Clinic::from).collect())
    }

    async fn find(&self, id: &ClinicId) -> Result<Option<Clinic>, ClinicRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ClinicRow> = clinics::table
            .find(*id.as_uuid())
            .select(ClinicRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(Clinic::from))
    }

    async fn settings(
        &self,
        clinic_id: &ClinicId,
    ) -> Result<Option<ClinicSettings>, ClinicRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ClinicSettingsRow> = clinic_settings::table
            .find(*clinic_id.as_uuid())
            .select(ClinicSettingsRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(ClinicSettings::try_from)
            .transpose()
            .map_err(ClinicRepositoryError::query)
    }

    async fn save_settings(&self, settings: &ClinicSettings) -> Result<(), ClinicRepositoryError> {
        let row = ClinicSettingsRow::from(settings);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(clinic_settings::table)
            .values(&row)
            .on_conflict(clinic_settings::clinic_id)
            .do_update()
            .set((
                clinic_settings::opening_time.eq(excluded(clinic_settings::opening_time)),
                clinic_settings::closing_time.eq(excluded(clinic_settings::closing_time)),
                clinic_settings::slot_minutes.eq(excluded(clinic_settings::slot_minutes)),
                clinic_settings::reservation_buffer_minutes
                    .eq(excluded(clinic_settings::reservation_buffer_minutes)),
                clinic_settings::allow_online_booking
                    .eq(excluded(clinic_settings::allow_online_booking)),
                clinic_settings::updated_at.eq(excluded(clinic_settings::updated_at)),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
