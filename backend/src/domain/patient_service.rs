//! Patient record use-cases.

use std::sync::Arc;

use mockable::Clock;
use pagination::{Cursor, Page, PageLimit};

use super::ports::{PatientListQuery, PatientRepository};
use super::validation::FieldErrors;
use super::{ClinicId, Error, Patient, PatientDraft, PatientId, PatientPageKey};

/// Listing parameters after HTTP parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientListRequest {
    pub search: Option<String>,
    pub cursor: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Clone)]
pub struct PatientService {
    patients: Arc<dyn PatientRepository>,
    clock: Arc<dyn Clock>,
}

impl PatientService {
    pub fn new(patients: Arc<dyn PatientRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { patients, clock }
    }

    /// One page of the clinic's patients, oldest first.
    ///
    /// # Errors
    /// `invalid_request` for a malformed cursor.
    pub async fn list(
        &self,
        clinic_id: &ClinicId,
        request: PatientListRequest,
    ) -> Result<Page<Patient>, Error> {
        let limit = PageLimit::clamped(request.limit);
        let after = request
            .cursor
            .as_deref()
            .map(|token| {
                Cursor::<PatientPageKey>::decode(token)
                    .map(Cursor::into_key)
                    .map_err(|err| {
                        let mut fields = FieldErrors::default();
                        fields.add("cursor", err.to_string());
                        Error::validation(fields)
                    })
            })
            .transpose()?;
        let query = PatientListQuery {
            clinic_id: *clinic_id,
            search: request
                .search
                .map(|s| s.trim().to_owned())
                .filter(|s| !s.is_empty()),
            after,
            limit: limit.fetch_size(),
        };
        let rows = self.patients.list(&query).await?;
        Page::from_rows(rows, limit, Patient::page_key)
            .map_err(|err| Error::internal(format!("failed to encode patient cursor: {err}")))
    }

    /// Fetch a patient of `clinic_id`.
    ///
    /// A patient registered at another clinic is reported as not found.
    pub async fn get(&self, clinic_id: &ClinicId, id: &PatientId) -> Result<Patient, Error> {
        match self.patients.find(id).await? {
            Some(patient) if patient.clinic_id == *clinic_id => Ok(patient),
            _ => Err(Error::not_found(format!("patient {id} not found"))),
        }
    }

    pub async fn create(&self, clinic_id: &ClinicId, draft: PatientDraft) -> Result<Patient, Error> {
        let now = self.clock.utc();
        let fields = draft.validate(now.date_naive()).map_err(Error::validation)?;
        let patient = Patient::create(PatientId::random(), *clinic_id, fields, now);
        self.patients.insert(&patient).await?;
        Ok(patient)
    }

    pub async fn update(
        &self,
        clinic_id: &ClinicId,
        id: &PatientId,
        draft: PatientDraft,
    ) -> Result<Patient, Error> {
        let fields = draft
            .validate(self.clock.utc().date_naive())
            .map_err(Error::validation)?;
        let mut patient = self.get(clinic_id, id).await?;
        patient.apply(fields);
        if self.patients.update(&patient).await? {
            Ok(patient)
        } else {
            Err(Error::not_found(format!("patient {id} not found")))
        }
    }
}
