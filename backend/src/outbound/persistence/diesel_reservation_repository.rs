//! PostgreSQL-backed `ReservationRepository`.
//!
//! Status changes are compare-and-set on the stored status so two concurrent
//! transitions cannot both succeed.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ReservationRepository, ReservationRepositoryError};
use crate::domain::{ClinicId, DateRange, Reservation, ReservationId, ReservationStatus};

use super::error_mapping::{convert_rows, map_diesel_error, map_pool_error};
use super::models::ReservationRow;
use super::pool::DbPool;
use super::schema::reservations;

#[derive(Clone)]
pub struct DieselReservationRepository {
    pool: DbPool,
}

impl DieselReservationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReservationRepository for DieselReservationRepository {
    async fn insert(&self, reservation: &Reservation) -> Result<(), ReservationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(reservations::table)
            .values(ReservationRow::from(reservation))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find(
        &self,
        id: &ReservationId,
    ) -> Result<Option<Reservation>, ReservationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ReservationRow> = reservations::table
            .find(*id.as_uuid())
            .select(ReservationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(Reservation::try_from)
            .transpose()
            .map_err(ReservationRepositoryError::query)
    }

    async fn list(
        &self,
        clinic_id: &ClinicId,
        range: Option<DateRange>,
    ) -> Result<Vec<Reservation>, ReservationRepositoryError> {
        let mut statement = reservations::table
            .filter(reservations::clinic_id.eq(*clinic_id.as_uuid()))
            .select(ReservationRow::as_select())
            .into_boxed();
        if let Some(range) = range {
            statement = statement
                .filter(reservations::start_time.ge(range.start_instant()))
                .filter(reservations::start_time.lt(range.end_instant_exclusive()));
        }

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ReservationRow> = statement
            .order_by((reservations::start_time.asc(), reservations::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        convert_rows(rows)
    }

    async fn update_status(
        &self,
        id: &ReservationId,
        expected: ReservationStatus,
        next: ReservationStatus,
    ) -> Result<bool, ReservationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(
            reservations::table
                .find(*id.as_uuid())
                .filter(reservations::status.eq(expected.as_str())),
        )
        .set(reservations::status.eq(next.as_str()))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(updated == 1)
    }
}
