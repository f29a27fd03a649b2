//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (PostgreSQL tables, stored procedures, the audit sink). Each trait exposes
//! strongly typed errors generated by `define_port_error!`; every variant
//! converts into a domain [`Error`](crate::domain::Error) so services can
//! propagate with `?`.

mod macros;

pub(crate) use macros::define_port_error;

mod analytics_rpc;
mod audit_log;
mod clinic_repository;
mod login_service;
mod notification_repository;
mod patient_repository;
mod permission_repository;
mod reservation_repository;
mod staff_repository;
mod visit_repository;

#[cfg(test)]
pub use analytics_rpc::MockAnalyticsRpc;
pub use analytics_rpc::{AnalyticsRpc, AnalyticsRpcError};
#[cfg(test)]
pub use audit_log::MockAuditLog;
pub use audit_log::{AuditLog, AuditLogError};
#[cfg(test)]
pub use clinic_repository::MockClinicRepository;
pub use clinic_repository::{ClinicRepository, ClinicRepositoryError};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use notification_repository::MockNotificationRepository;
pub use notification_repository::{NotificationRepository, NotificationRepositoryError};
#[cfg(test)]
pub use patient_repository::MockPatientRepository;
pub use patient_repository::{PatientListQuery, PatientRepository, PatientRepositoryError};
#[cfg(test)]
pub use permission_repository::MockPermissionRepository;
pub use permission_repository::{PermissionRepository, PermissionRepositoryError};
#[cfg(test)]
pub use reservation_repository::MockReservationRepository;
pub use reservation_repository::{ReservationRepository, ReservationRepositoryError};
#[cfg(test)]
pub use staff_repository::MockStaffRepository;
pub use staff_repository::{StaffRepository, StaffRepositoryError};
#[cfg(test)]
pub use visit_repository::MockVisitRepository;
pub use visit_repository::{VisitRepository, VisitRepositoryError};
