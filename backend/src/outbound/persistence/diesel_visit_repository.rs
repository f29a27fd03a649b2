//! PostgreSQL-backed `VisitRepository`, including the
//! `patient_visit_summary` view used by analytics.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{VisitRepository, VisitRepositoryError};
use crate::domain::{ClinicId, DateRange, PatientVisitSummary, Visit};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{VisitRow, VisitSummaryRow};
use super::pool::DbPool;
use super::schema::{patient_visit_summary, visits};

#[derive(Clone)]
pub struct DieselVisitRepository {
    pool: DbPool,
}

impl DieselVisitRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VisitRepository for DieselVisitRepository {
    async fn insert(&self, visit: &Visit) -> Result<(), VisitRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(visits::table)
            .values(VisitRow::from(visit))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list(
        &self,
        clinic_id: &ClinicId,
        range: &DateRange,
    ) -> Result<Vec<Visit>, VisitRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<VisitRow> = visits::table
            .filter(visits::clinic_id.eq(*clinic_id.as_uuid()))
            .filter(visits::visit_date.between(range.from(), range.to()))
            .select(VisitRow::as_select())
            .order_by((visits::visit_date.asc(), visits::created_at.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(Visit::from).collect())
    }

    async fn summaries(
        &self,
        clinic_id: &ClinicId,
    ) -> Result<Vec<PatientVisitSummary>, VisitRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<VisitSummaryRow> = patient_visit_summary::table
            .filter(patient_visit_summary::clinic_id.eq(*clinic_id.as_uuid()))
            .select(VisitSummaryRow::as_select())
            .order_by(patient_visit_summary::patient_id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(PatientVisitSummary::from).collect())
    }
}
