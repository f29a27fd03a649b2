//! Port for patient records.

use async_trait::async_trait;

use crate::domain::{ClinicId, Patient, PatientId, PatientPageKey};

use super::define_port_error;

define_port_error! {
    /// Errors raised by patient repository adapters.
    pub enum PatientRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "patient repository connection failed: {message}" ; service_unavailable,
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "patient repository query failed: {message}" ; internal,
    }
}

/// Keyset query for one page of patients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientListQuery {
    pub clinic_id: ClinicId,
    /// Case-insensitive substring matched against name and kana.
    pub search: Option<String>,
    /// Return rows strictly after this key.
    pub after: Option<PatientPageKey>,
    /// Maximum rows to return.
    pub limit: usize,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PatientRepository: Send + Sync {
    /// Patients matching `query`, ordered by creation time then id.
    async fn list(&self, query: &PatientListQuery) -> Result<Vec<Patient>, PatientRepositoryError>;

    async fn find(&self, id: &PatientId) -> Result<Option<Patient>, PatientRepositoryError>;

    async fn insert(&self, patient: &Patient) -> Result<(), PatientRepositoryError>;

    /// Persist edited fields. Returns `false` when the row no longer exists.
    async fn update(&self, patient: &Patient) -> Result<bool, PatientRepositoryError>;
}
