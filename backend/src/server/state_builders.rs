//! Wires the PostgreSQL adapters into the HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;

use clinic_backend::inbound::http::state::{HttpState, HttpStatePorts};
use clinic_backend::outbound::persistence::{
    DbPool, DieselAnalyticsRpc, DieselAuditLog, DieselClinicRepository, DieselLoginService,
    DieselNotificationRepository, DieselPatientRepository, DieselPermissionRepository,
    DieselReservationRepository, DieselStaffRepository, DieselVisitRepository,
};

/// Port bundle where every port is backed by `pool`.
fn diesel_ports(pool: &DbPool) -> HttpStatePorts {
    HttpStatePorts {
        login: Arc::new(DieselLoginService::new(pool.clone())),
        permissions: Arc::new(DieselPermissionRepository::new(pool.clone())),
        audit: Arc::new(DieselAuditLog::new(pool.clone())),
        clinics: Arc::new(DieselClinicRepository::new(pool.clone())),
        patients: Arc::new(DieselPatientRepository::new(pool.clone())),
        visits: Arc::new(DieselVisitRepository::new(pool.clone())),
        reservations: Arc::new(DieselReservationRepository::new(pool.clone())),
        staff: Arc::new(DieselStaffRepository::new(pool.clone())),
        notifications: Arc::new(DieselNotificationRepository::new(pool.clone())),
        analytics: Arc::new(DieselAnalyticsRpc::new(pool.clone())),
        clock: Arc::new(DefaultClock),
    }
}

/// Shared handler state for the server's worker threads.
pub(super) fn build_http_state(pool: &DbPool) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(diesel_ports(pool)))
}
