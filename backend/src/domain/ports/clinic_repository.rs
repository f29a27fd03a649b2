//! Port for clinics and their settings.

use async_trait::async_trait;

use crate::domain::{Clinic, ClinicId, ClinicSettings};

use super::define_port_error;

define_port_error! {
    /// Errors raised by clinic repository adapters.
    pub enum ClinicRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "clinic repository connection failed: {message}" ; service_unavailable,
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "clinic repository query failed: {message}" ; internal,
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClinicRepository: Send + Sync {
    /// Clinics whose ids appear in `ids`, ordered by name.
    async fn list_by_ids(&self, ids: &[ClinicId]) -> Result<Vec<Clinic>, ClinicRepositoryError>;

    async fn find(&self, id: &ClinicId) -> Result<Option<Clinic>, ClinicRepositoryError>;

    /// Settings for `clinic_id`, or `None` when never configured.
    async fn settings(
        &self,
        clinic_id: &ClinicId,
    ) -> Result<Option<ClinicSettings>, ClinicRepositoryError>;

    /// Insert or replace the settings row.
    async fn save_settings(&self, settings: &ClinicSettings) -> Result<(), ClinicRepositoryError>;
}
