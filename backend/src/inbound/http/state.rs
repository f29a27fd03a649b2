//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and ports and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AnalyticsRpc, AuditLog, ClinicRepository, LoginService, NotificationRepository,
    PatientRepository, PermissionRepository, ReservationRepository, StaffRepository,
    VisitRepository,
};
use crate::domain::{
    AnalyticsService, ClinicAccessGuard, ClinicService, NotificationService, PatientService,
    PermissionService, ReservationService, VisitService,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub permissions: Arc<dyn PermissionRepository>,
    pub audit: Arc<dyn AuditLog>,
    pub clinics: Arc<dyn ClinicRepository>,
    pub patients: Arc<dyn PatientRepository>,
    pub visits: Arc<dyn VisitRepository>,
    pub reservations: Arc<dyn ReservationRepository>,
    pub staff: Arc<dyn StaffRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub analytics: Arc<dyn AnalyticsRpc>,
    pub clock: Arc<dyn Clock>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub guard: ClinicAccessGuard,
    pub login: Arc<dyn LoginService>,
    pub permissions: PermissionService,
    pub clinics: ClinicService,
    pub patients: PatientService,
    pub visits: VisitService,
    pub reservations: ReservationService,
    pub staff: Arc<dyn StaffRepository>,
    pub notifications: NotificationService,
    pub analytics: AnalyticsService,
    pub clock: Arc<dyn Clock>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Wire the domain services over a ports bundle.
    ///
    /// # Examples
    /// ```
    /// use clinic_backend::inbound::http::state::HttpState;
    /// use clinic_backend::test_support::InMemoryStore;
    ///
    /// let store = InMemoryStore::default();
    /// let state = HttpState::new(store.ports());
    /// let _guard = state.guard.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            permissions,
            audit,
            clinics,
            patients,
            visits,
            reservations,
            staff,
            notifications,
            analytics,
            clock,
        } = ports;

        Self {
            guard: ClinicAccessGuard::new(permissions.clone(), audit, clock.clone()),
            login,
            permissions: PermissionService::new(permissions),
            clinics: ClinicService::new(clinics, clock.clone()),
            patients: PatientService::new(patients.clone(), clock.clone()),
            visits: VisitService::new(
                visits.clone(),
                patients.clone(),
                staff.clone(),
                clock.clone(),
            ),
            reservations: ReservationService::new(
                reservations.clone(),
                patients,
                staff.clone(),
                clock.clone(),
            ),
            analytics: AnalyticsService::new(visits, reservations, staff.clone(), analytics),
            staff,
            notifications: NotificationService::new(notifications),
            clock,
        }
    }
}
