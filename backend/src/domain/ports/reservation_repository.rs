//! Port for reservations.

use async_trait::async_trait;

use crate::domain::{ClinicId, DateRange, Reservation, ReservationId, ReservationStatus};

use super::define_port_error;

define_port_error! {
    /// Errors raised by reservation repository adapters.
    pub enum ReservationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "reservation repository connection failed: {message}" ; service_unavailable,
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "reservation repository query failed: {message}" ; internal,
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    async fn insert(&self, reservation: &Reservation) -> Result<(), ReservationRepositoryError>;

    async fn find(
        &self,
        id: &ReservationId,
    ) -> Result<Option<Reservation>, ReservationRepositoryError>;

    /// Reservations starting inside `range` (all when `None`), by start time.
    async fn list(
        &self,
        clinic_id: &ClinicId,
        range: Option<DateRange>,
    ) -> Result<Vec<Reservation>, ReservationRepositoryError>;

    /// Compare-and-set the status.
    ///
    /// Returns `false` when the stored status is no longer `expected`.
    async fn update_status(
        &self,
        id: &ReservationId,
        expected: ReservationStatus,
        next: ReservationStatus,
    ) -> Result<bool, ReservationRepositoryError>;
}
