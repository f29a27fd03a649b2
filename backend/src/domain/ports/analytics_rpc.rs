//! Port for database-side analytics procedures.
//!
//! Each call scores a single patient. Callers fan out one call per summary
//! row; adapters must not batch or cache.

use async_trait::async_trait;

use crate::domain::PatientId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by analytics procedure adapters.
    pub enum AnalyticsRpcError {
        /// Database connection could not be established.
        Connection { message: String } =>
            "analytics rpc connection failed: {message}" ; service_unavailable,
        /// The procedure raised an error.
        Procedure { name: String, message: String } =>
            "analytics procedure {name} failed: {message}" ; internal,
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalyticsRpc: Send + Sync {
    /// `calculate_patient_ltv(patient_id)`: lifetime value in minor units.
    async fn patient_ltv(&self, patient_id: &PatientId) -> Result<i64, AnalyticsRpcError>;

    /// `calculate_churn_risk(patient_id)`: score from 0 to 100.
    async fn churn_risk(&self, patient_id: &PatientId) -> Result<i32, AnalyticsRpcError>;
}
