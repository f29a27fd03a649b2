//! Route table for the `/api` scope.
//!
//! Health probes sit outside `/api` and are registered by the server.

use actix_web::web;

use super::{
    analytics, auth, clinics, notifications, patients, permissions, reservations, staff, visits,
};

/// Register every API handler under `/api`.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use clinic_backend::inbound::http::routes::configure;
///
/// let _app = App::new().configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(auth::login)
            .service(auth::logout)
            .service(auth::me)
            .service(clinics::list_clinics)
            .service(clinics::get_clinic)
            .service(clinics::get_settings)
            .service(clinics::update_settings)
            .service(patients::list_patients)
            .service(patients::create_patient)
            .service(patients::get_patient)
            .service(patients::update_patient)
            .service(visits::list_visits)
            .service(visits::record_visit)
            .service(reservations::list_reservations)
            .service(reservations::create_reservation)
            .service(reservations::change_status)
            .service(staff::list_staff)
            .service(notifications::list_notifications)
            .service(notifications::mark_read)
            .service(permissions::list_permissions)
            .service(permissions::upsert_permission)
            .service(analytics::top_patients_by_ltv)
            .service(analytics::churn_risk)
            .service(analytics::conversion_funnel)
            .service(analytics::revenue_summary)
            .service(analytics::staff_performance),
    );
}
