//! Domain primitives, services and ports.
//!
//! Purpose: define strongly typed clinic entities, the request-time access
//! guard and the use-case services used by the HTTP adapter. Types are
//! transport agnostic; serde contracts are documented on each type.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifier.
//! - ClinicAccessGuard: authentication, role and clinic-scope checks.
//! - Role / UserPermission: normalised roles and per-user clinic scope.
//! - *Service types: use-cases over the ports in [`ports`].

pub mod access;
pub mod analytics;
pub mod audit;
pub mod auth;
pub mod clinic;
pub mod clinic_service;
pub mod date_range;
pub mod error;
pub mod ids;
pub mod notification;
pub mod notification_service;
pub mod patient;
pub mod patient_service;
pub mod permission;
pub mod permission_service;
pub mod ports;
pub mod reservation;
pub mod reservation_service;
pub mod role;
pub mod staff;
pub mod trace_id;
pub mod validation;
pub mod visit;
pub mod visit_service;

pub use self::access::{AccessGrant, AccessOptions, AccessRequest, ClinicAccessGuard};
pub use self::analytics::{
    AnalyticsService, ChurnRisk, ConversionFunnel, FunnelStage, FunnelStageKind, PatientLtv,
    RevenueDay, RevenueSummary, StaffPerformance,
};
pub use self::audit::{AccessDenialReason, AuditRecord, ClientInfo};
pub use self::auth::{LoginCredentials, LoginValidationError, Principal};
pub use self::clinic::{Clinic, ClinicSettings, ClinicSettingsDraft};
pub use self::clinic_service::ClinicService;
pub use self::date_range::{DateRange, DateRangeError};
pub use self::error::{Error, ErrorCode};
pub use self::ids::{
    ClinicId, IdentifierError, NotificationId, PatientId, ReservationId, StaffId, UserId, VisitId,
};
pub use self::notification::Notification;
pub use self::notification_service::NotificationService;
pub use self::patient::{Gender, Patient, PatientDraft, PatientFields, PatientPageKey};
pub use self::patient_service::{PatientListRequest, PatientService};
pub use self::permission::{ClinicScope, UserPermission, authorize_grant, authorize_replacement};
pub use self::permission_service::PermissionService;
pub use self::reservation::{
    Reservation, ReservationDraft, ReservationFields, ReservationStatus,
};
pub use self::reservation_service::ReservationService;
pub use self::role::Role;
pub use self::staff::Staff;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::validation::FieldErrors;
pub use self::visit::{PatientVisitSummary, Visit, VisitDraft, VisitFields};
pub use self::visit_service::VisitService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use clinic_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
