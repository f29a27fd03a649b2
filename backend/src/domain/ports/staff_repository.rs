//! Port for staff listings.

use async_trait::async_trait;

use crate::domain::{ClinicId, Staff};

use super::define_port_error;

define_port_error! {
    /// Errors raised by staff repository adapters.
    pub enum StaffRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "staff repository connection failed: {message}" ; service_unavailable,
        /// Query failed during execution.
        Query { message: String } =>
            "staff repository query failed: {message}" ; internal,
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StaffRepository: Send + Sync {
    /// Staff of `clinic_id`, ordered by name.
    async fn list(&self, clinic_id: &ClinicId) -> Result<Vec<Staff>, StaffRepositoryError>;
}
