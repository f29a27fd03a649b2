//! Port for the access-denial audit trail.

use async_trait::async_trait;

use crate::domain::AuditRecord;

use super::define_port_error;

define_port_error! {
    /// Errors raised while persisting audit records.
    pub enum AuditLogError {
        /// Audit sink could not be reached.
        Connection { message: String } =>
            "audit log connection failed: {message}" ; service_unavailable,
        /// Insert failed.
        Write { message: String } =>
            "audit log write failed: {message}" ; internal,
    }
}

/// Sink for [`AuditRecord`]s.
///
/// Failures are reported to the caller, which logs them; they never change
/// an access decision.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Append one record.
    async fn record(&self, record: &AuditRecord) -> Result<(), AuditLogError>;
}
