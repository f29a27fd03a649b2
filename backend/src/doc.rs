//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every handler under `inbound::http`, the schema
//! wrappers for domain types and the session cookie security scheme. Swagger
//! UI serves it at `/docs` in debug builds.

use crate::inbound::http::auth::{LoginRequest, LoginResponse, MeResponse};
use crate::inbound::http::clinics::{ClinicBody, ClinicSettingsBody, UpdateClinicSettingsRequest};
use crate::inbound::http::patients::{PatientBody, PatientPageBody, PatientRequest};
use crate::inbound::http::permissions::PermissionRequest;
use crate::inbound::http::reservations::{
    ReservationBody, ReservationRequest, StatusChangeRequest,
};
use crate::inbound::http::schemas::{
    ChurnRiskSchema, ConversionFunnelSchema, ErrorCodeSchema, ErrorEnvelopeSchema, ErrorSchema,
    FunnelStageSchema, NotificationSchema, PatientLtvSchema, RevenueDaySchema,
    RevenueSummarySchema, StaffPerformanceSchema, StaffSchema, UserPermissionSchema,
};
use crate::inbound::http::visits::{VisitBody, VisitRequest};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Adds the `session` cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Private session cookie issued by POST /api/auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the clinic REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Clinic backend API",
        description = "Multi-tenant clinic management: patients, reservations, visits and analytics."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::me,
        crate::inbound::http::clinics::list_clinics,
        crate::inbound::http::clinics::get_clinic,
        crate::inbound::http::clinics::get_settings,
        crate::inbound::http::clinics::update_settings,
        crate::inbound::http::patients::list_patients,
        crate::inbound::http::patients::create_patient,
        crate::inbound::http::patients::get_patient,
        crate::inbound::http::patients::update_patient,
        crate::inbound::http::visits::list_visits,
        crate::inbound::http::visits::record_visit,
        crate::inbound::http::reservations::list_reservations,
        crate::inbound::http::reservations::create_reservation,
        crate::inbound::http::reservations::change_status,
        crate::inbound::http::staff::list_staff,
        crate::inbound::http::notifications::list_notifications,
        crate::inbound::http::notifications::mark_read,
        crate::inbound::http::permissions::list_permissions,
        crate::inbound::http::permissions::upsert_permission,
        crate::inbound::http::analytics::top_patients_by_ltv,
        crate::inbound::http::analytics::churn_risk,
        crate::inbound::http::analytics::conversion_funnel,
        crate::inbound::http::analytics::revenue_summary,
        crate::inbound::http::analytics::staff_performance,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorCodeSchema,
        ErrorSchema,
        ErrorEnvelopeSchema,
        LoginRequest,
        LoginResponse,
        MeResponse,
        ClinicBody,
        ClinicSettingsBody,
        UpdateClinicSettingsRequest,
        PatientBody,
        PatientPageBody,
        PatientRequest,
        VisitBody,
        VisitRequest,
        ReservationBody,
        ReservationRequest,
        StatusChangeRequest,
        PermissionRequest,
        StaffSchema,
        NotificationSchema,
        UserPermissionSchema,
        PatientLtvSchema,
        ChurnRiskSchema,
        FunnelStageSchema,
        ConversionFunnelSchema,
        RevenueDaySchema,
        RevenueSummarySchema,
        StaffPerformanceSchema,
    )),
    tags(
        (name = "auth", description = "Session login and the current principal"),
        (name = "clinics", description = "Clinics and their settings"),
        (name = "patients", description = "Patient records"),
        (name = "visits", description = "Treatment visits"),
        (name = "reservations", description = "Bookings and their lifecycle"),
        (name = "staff", description = "Clinic staff"),
        (name = "notifications", description = "Per-user notifications"),
        (name = "permissions", description = "Role and clinic scope administration"),
        (name = "analytics", description = "Manager reports"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
