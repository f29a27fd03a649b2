//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain ports backed by PostgreSQL via
//! `diesel-async` with `bb8` connection pooling.
//!
//! - Row structs (`models.rs`) and table definitions (`schema.rs`) stay
//!   private to this module.
//! - Every adapter shares one [`DbPool`]; pool checkout failures surface as
//!   connection errors and therefore as `503` responses.
//! - Driver messages are logged at debug level and never copied into port
//!   errors verbatim.
//!
//! # Example
//!
//! ```ignore
//! use clinic_backend::outbound::persistence::{DbPool, DieselPatientRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/clinic")).await?;
//! let patients = DieselPatientRepository::new(pool.clone());
//! ```

mod diesel_analytics_rpc;
mod diesel_audit_log;
mod diesel_clinic_repository;
mod diesel_login_service;
mod diesel_notification_repository;
mod diesel_patient_repository;
mod diesel_permission_repository;
mod diesel_reservation_repository;
mod diesel_staff_repository;
mod diesel_visit_repository;
mod error_mapping;
mod models;
mod pool;
mod schema;

pub use diesel_analytics_rpc::DieselAnalyticsRpc;
pub use diesel_audit_log::DieselAuditLog;
pub use diesel_clinic_repository::DieselClinicRepository;
pub use diesel_login_service::DieselLoginService;
pub use diesel_notification_repository::DieselNotificationRepository;
pub use diesel_patient_repository::DieselPatientRepository;
pub use diesel_permission_repository::DieselPermissionRepository;
pub use diesel_reservation_repository::DieselReservationRepository;
pub use diesel_staff_repository::DieselStaffRepository;
pub use diesel_visit_repository::DieselVisitRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
