//! Port for visits and the per-patient visit summary view.

use async_trait::async_trait;

use crate::domain::{ClinicId, DateRange, PatientVisitSummary, Visit};

use super::define_port_error;

define_port_error! {
    /// Errors raised by visit repository adapters.
    pub enum VisitRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "visit repository connection failed: {message}" ; service_unavailable,
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "visit repository query failed: {message}" ; internal,
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VisitRepository: Send + Sync {
    async fn insert(&self, visit: &Visit) -> Result<(), VisitRepositoryError>;

    /// Visits in `range`, ordered by visit date then creation time.
    async fn list(
        &self,
        clinic_id: &ClinicId,
        range: &DateRange,
    ) -> Result<Vec<Visit>, VisitRepositoryError>;

    /// One summary row per patient of the clinic with at least one visit.
    async fn summaries(
        &self,
        clinic_id: &ClinicId,
    ) -> Result<Vec<PatientVisitSummary>, VisitRepositoryError>;
}
