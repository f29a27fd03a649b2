//! Booking use-cases.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use super::ports::{PatientRepository, ReservationRepository, StaffRepository};
use super::visit_service::{ensure_patient_in_clinic, ensure_staff_in_clinic};
use super::{
    ClinicId, DateRange, Error, Reservation, ReservationDraft, ReservationId, ReservationStatus,
};

#[derive(Clone)]
pub struct ReservationService {
    reservations: Arc<dyn ReservationRepository>,
    patients: Arc<dyn PatientRepository>,
    staff: Arc<dyn StaffRepository>,
    clock: Arc<dyn Clock>,
}

impl ReservationService {
    pub fn new(
        reservations: Arc<dyn ReservationRepository>,
        patients: Arc<dyn PatientRepository>,
        staff: Arc<dyn StaffRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            reservations,
            patients,
            staff,
            clock,
        }
    }

    /// Book a slot for a patient of `clinic_id`.
    pub async fn create(
        &self,
        clinic_id: &ClinicId,
        draft: ReservationDraft,
    ) -> Result<Reservation, Error> {
        let fields = draft.validate().map_err(Error::validation)?;
        ensure_patient_in_clinic(self.patients.as_ref(), clinic_id, &fields.patient_id).await?;
        if let Some(staff_id) = &fields.staff_id {
            ensure_staff_in_clinic(self.staff.as_ref(), clinic_id, staff_id).await?;
        }
        let reservation = Reservation {
            id: ReservationId::random(),
            clinic_id: *clinic_id,
            patient_id: fields.patient_id,
            staff_id: fields.staff_id,
            start_time: fields.start_time,
            end_time: fields.end_time,
            menu: fields.menu,
            notes: fields.notes,
            status: fields.status,
            created_at: self.clock.utc(),
        };
        self.reservations.insert(&reservation).await?;
        Ok(reservation)
    }

    pub async fn list(
        &self,
        clinic_id: &ClinicId,
        range: Option<DateRange>,
    ) -> Result<Vec<Reservation>, Error> {
        Ok(self.reservations.list(clinic_id, range).await?)
    }

    /// Move a reservation to `next`.
    ///
    /// # Errors
    /// `not_found` for reservations of other clinics; `conflict` for illegal
    /// transitions or when the status changed concurrently.
    pub async fn change_status(
        &self,
        clinic_id: &ClinicId,
        id: &ReservationId,
        next: ReservationStatus,
    ) -> Result<Reservation, Error> {
        let mut reservation = match self.reservations.find(id).await? {
            Some(found) if found.clinic_id == *clinic_id => found,
            _ => return Err(Error::not_found(format!("reservation {id} not found"))),
        };
        let current = reservation.status;
        let next = current.transition(next)?;
        if !self.reservations.update_status(id, current, next).await? {
            return Err(Error::conflict(
                "reservation status was changed by another request",
            ));
        }
        info!(reservation_id = %id, from = %current, to = %next, "reservation status changed");
        reservation.status = next;
        Ok(reservation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        MockPatientRepository, MockReservationRepository, MockStaffRepository,
    };
    use crate::domain::{ErrorCode, PatientId};
    use chrono::{Duration, Utc};
    use mockable::DefaultClock;
    use rstest::rstest;

    fn stored(clinic_id: ClinicId, status: ReservationStatus) -> Reservation {
        let start = Utc::now();
        Reservation {
            id: ReservationId::random(),
            clinic_id,
            patient_id: PatientId::random(),
            staff_id: None,
            start_time: start,
            end_time: start + Duration::minutes(30),
            menu: None,
            notes: None,
            status,
            created_at: start,
        }
    }

    fn service(repo: MockReservationRepository) -> ReservationService {
        ReservationService::new(
            Arc::new(repo),
            Arc::new(MockPatientRepository::new()),
            Arc::new(MockStaffRepository::new()),
            Arc::new(DefaultClock),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn legal_transition_is_compare_and_set() {
        let clinic_id = ClinicId::random();
        let reservation = stored(clinic_id, ReservationStatus::Confirmed);
        let id = reservation.id;
        let mut repo = MockReservationRepository::new();
        repo.expect_find()
            .returning(move |_| Ok(Some(reservation.clone())));
        repo.expect_update_status()
            .withf(|_, expected, next| {
                *expected == ReservationStatus::Confirmed && *next == ReservationStatus::Arrived
            })
            .times(1)
            .returning(|_, _, _| Ok(true));

        let updated = service(repo)
            .change_status(&clinic_id, &id, ReservationStatus::Arrived)
            .await
            .expect("transition");

        assert_eq!(updated.status, ReservationStatus::Arrived);
    }

    #[rstest]
    #[tokio::test]
    async fn illegal_transition_is_conflict_without_write() {
        let clinic_id = ClinicId::random();
        let reservation = stored(clinic_id, ReservationStatus::Completed);
        let id = reservation.id;
        let mut repo = MockReservationRepository::new();
        repo.expect_find()
            .returning(move |_| Ok(Some(reservation.clone())));
        repo.expect_update_status().times(0);

        let err = service(repo)
            .change_status(&clinic_id, &id, ReservationStatus::Cancelled)
            .await
            .expect_err("terminal");

        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[tokio::test]
    async fn lost_race_is_conflict() {
        let clinic_id = ClinicId::random();
        let reservation = stored(clinic_id, ReservationStatus::Tentative);
        let id = reservation.id;
        let mut repo = MockReservationRepository::new();
        repo.expect_find()
            .returning(move |_| Ok(Some(reservation.clone())));
        repo.expect_update_status().returning(|_, _, _| Ok(false));

        let err = service(repo)
            .change_status(&clinic_id, &id, ReservationStatus::Confirmed)
            .await
            .expect_err("race");

        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[tokio::test]
    async fn reservation_of_other_clinic_is_not_found() {
        let reservation = stored(ClinicId::random(), ReservationStatus::Tentative);
        let id = reservation.id;
        let mut repo = MockReservationRepository::new();
        repo.expect_find()
            .returning(move |_| Ok(Some(reservation.clone())));

        let err = service(repo)
            .change_status(&ClinicId::random(), &id, ReservationStatus::Confirmed)
            .await
            .expect_err("other clinic");

        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
