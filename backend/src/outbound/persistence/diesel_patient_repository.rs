//! PostgreSQL-backed `PatientRepository`.
//!
//! Listings use keyset pagination on `(created_at, id)`; the search term is
//! matched case-insensitively against `name` and `name_kana`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PatientListQuery, PatientRepository, PatientRepositoryError};
use crate::domain::{Patient, PatientId};

use super::error_mapping::{convert_rows, map_diesel_error, map_pool_error};
use super::models::{PatientChangeset, PatientRow};
use super::pool::DbPool;
use super::schema::patients;

#[derive(Clone)]
pub struct DieselPatientRepository {
    pool: DbPool,
}

impl DieselPatientRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Escape `LIKE` metacharacters so user input matches literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl PatientRepository for DieselPatientRepository {
    async fn list(&self, query: &PatientListQuery) -> Result<Vec<Patient>, PatientRepositoryError> {
        let mut statement = patients::table
            .filter(patients::clinic_id.eq(*query.clinic_id.as_uuid()))
            .select(PatientRow::as_select())
            .into_boxed();

        if let Some(term) = query.search.as_deref() {
            let pattern = like_pattern(term);
            statement = statement.filter(
                patients::name
                    .ilike(pattern.clone())
                    .or(patients::name_kana.ilike(pattern)),
            );
        }
        if let Some(after) = query.after {
            statement = statement.filter(
                patients::created_at.gt(after.created_at).or(patients::created_at
                    .eq(after.created_at)
                    .and(patients::id.gt(*after.id.as_uuid()))),
            );
        }
        let limit = i64::try_from(query.limit).unwrap_or(i64::MAX);

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<PatientRow> = statement
            .order_by((patients::created_at.asc(), patients::id.asc()))
            .limit(limit)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        convert_rows(rows)
    }

    async fn find(&self, id: &PatientId) -> Result<Option<Patient>, PatientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<PatientRow> = patients::table
            .find(*id.as_uuid())
            .select(PatientRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(Patient::try_from)
            .transpose()
            .map_err(PatientRepositoryError::query)
    }

    async fn insert(&self, patient: &Patient) -> Result<(), PatientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(patients::table)
            .values(PatientRow::from(patient))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, patient: &Patient) -> Result<bool, PatientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(patients::table.find(*patient.id.as_uuid()))
            .set(PatientChangeset::from(patient))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(updated > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("yamada", "%yamada%")]
    #[case("50%", "%50\\%%")]
    #[case("a_b", "%a\\_b%")]
    fn search_terms_match_literally(#[case] term: &str, #[case] expected: &str) {
        assert_eq!(like_pattern(term), expected);
    }
}
