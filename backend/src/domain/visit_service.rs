//! Visit recording and listing.

use std::sync::Arc;

use mockable::Clock;

use super::ports::{PatientRepository, StaffRepository, VisitRepository};
use super::validation::FieldErrors;
use super::{ClinicId, DateRange, Error, PatientId, StaffId, Visit, VisitDraft, VisitId};

#[derive(Clone)]
pub struct VisitService {
    visits: Arc<dyn VisitRepository>,
    patients: Arc<dyn PatientRepository>,
    staff: Arc<dyn StaffRepository>,
    clock: Arc<dyn Clock>,
}

impl VisitService {
    pub fn new(
        visits: Arc<dyn VisitRepository>,
        patients: Arc<dyn PatientRepository>,
        staff: Arc<dyn StaffRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            visits,
            patients,
            staff,
            clock,
        }
    }

    /// Record a visit for a patient of `clinic_id`.
    ///
    /// # Errors
    /// `invalid_request` when the draft is invalid or the patient or staff
    /// member belongs to another clinic.
    pub async fn record(&self, clinic_id: &ClinicId, draft: VisitDraft) -> Result<Visit, Error> {
        let fields = draft.validate().map_err(Error::validation)?;
        ensure_patient_in_clinic(self.patients.as_ref(), clinic_id, &fields.patient_id).await?;
        if let Some(staff_id) = &fields.staff_id {
            ensure_staff_in_clinic(self.staff.as_ref(), clinic_id, staff_id).await?;
        }
        let visit = Visit {
            id: VisitId::random(),
            clinic_id: *clinic_id,
            patient_id: fields.patient_id,
            staff_id: fields.staff_id,
            visit_date: fields.visit_date,
            treatment_menu: fields.treatment_menu,
            revenue: fields.revenue,
            created_at: self.clock.utc(),
        };
        self.visits.insert(&visit).await?;
        Ok(visit)
    }

    pub async fn list(&self, clinic_id: &ClinicId, range: DateRange) -> Result<Vec<Visit>, Error> {
        Ok(self.visits.list(clinic_id, &range).await?)
    }
}

/// Reject references to patients outside `clinic_id`.
pub(crate) async fn ensure_patient_in_clinic(
    patients: &dyn PatientRepository,
    clinic_id: &ClinicId,
    patient_id: &PatientId,
) -> Result<(), Error> {
    match patients.find(patient_id).await? {
        Some(patient) if patient.clinic_id == *clinic_id => Ok(()),
        _ => {
            let mut fields = FieldErrors::default();
            fields.add("patientId", "patient does not belong to this clinic");
            Err(Error::validation(fields))
        }
    }
}

/// Reject references to staff members outside `clinic_id`.
pub(crate) async fn ensure_staff_in_clinic(
    staff: &dyn StaffRepository,
    clinic_id: &ClinicId,
    staff_id: &StaffId,
) -> Result<(), Error> {
    let members = staff.list(clinic_id).await?;
    if members.iter().any(|member| member.id == *staff_id) {
        return Ok(());
    }
    let mut fields = FieldErrors::default();
    fields.add("staffId", "staff member does not belong to this clinic");
    Err(Error::validation(fields))
}
