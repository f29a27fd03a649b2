//! Clinic and clinic-settings handlers.
//!
//! ```text
//! GET /api/clinics
//! GET /api/clinics/{clinic_id}
//! GET /api/clinics/{clinic_id}/settings
//! PUT /api/clinics/{clinic_id}/settings
//! ```

use actix_web::{HttpRequest, HttpResponse, get, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    AccessOptions, ApiResult, Clinic, ClinicSettings, ClinicSettingsDraft, Role,
};
use crate::inbound::http::access::{clinic_scoped, process_api_request};
use crate::inbound::http::envelope::{ApiResponse, ok};
use crate::inbound::http::schemas::ErrorEnvelopeSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Clinic as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClinicBody {
    #[schema(format = "uuid")]
    pub id: String,
    pub name: String,
    #[schema(format = "uuid")]
    pub parent_id: Option<String>,
    pub is_active: bool,
}

impl From<Clinic> for ClinicBody {
    fn from(value: Clinic) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
            parent_id: value.parent_id.map(|id| id.to_string()),
            is_active: value.is_active,
        }
    }
}

/// Opening hours and booking policy.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClinicSettingsBody {
    #[schema(format = "uuid")]
    pub clinic_id: String,
    #[schema(example = "09:00")]
    pub opening_time: String,
    #[schema(example = "19:00")]
    pub closing_time: String,
    pub slot_minutes: u16,
    pub reservation_buffer_minutes: u16,
    pub allow_online_booking: bool,
    #[schema(format = "date-time")]
    pub updated_at: String,
}

impl From<ClinicSettings> for ClinicSettingsBody {
    fn from(value: ClinicSettings) -> Self {
        Self {
            clinic_id: value.clinic_id.to_string(),
            opening_time: value.opening_time.format("%H:%M").to_string(),
            closing_time: value.closing_time.format("%H:%M").to_string(),
            slot_minutes: value.slot_minutes,
            reservation_buffer_minutes: value.reservation_buffer_minutes,
            allow_online_booking: value.allow_online_booking,
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

/// Body for `PUT /api/clinics/{clinic_id}/settings`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClinicSettingsRequest {
    #[schema(example = "09:00")]
    pub opening_time: String,
    #[schema(example = "19:00")]
    pub closing_time: String,
    pub slot_minutes: i64,
    #[serde(default)]
    pub reservation_buffer_minutes: i64,
    #[serde(default)]
    pub allow_online_booking: bool,
}

impl From<UpdateClinicSettingsRequest> for ClinicSettingsDraft {
    fn from(value: UpdateClinicSettingsRequest) -> Self {
        Self {
            opening_time: value.opening_time,
            closing_time: value.closing_time,
            slot_minutes: value.slot_minutes,
            reservation_buffer_minutes: value.reservation_buffer_minutes,
            allow_online_booking: value.allow_online_booking,
        }
    }
}

/// Clinics inside the caller's scope.
#[utoipa::path(
    get,
    path = "/api/clinics",
    responses(
        (status = 200, description = "Visible clinics", body = ApiResponse<Vec<ClinicBody>>),
        (status = 401, description = "Not logged in", body = ErrorEnvelopeSchema),
        (status = 403, description = "No permission record", body = ErrorEnvelopeSchema)
    ),
    tags = ["clinics"],
    operation_id = "listClinics"
)]
#[get("/clinics")]
pub async fn list_clinics(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let grant = process_api_request(
        &req,
        &session,
        &state,
        "/api/clinics",
        None,
        AccessOptions::default(),
    )
    .await?;
    let clinics = state.clinics.list_visible(&grant.permission.scope()).await?;
    Ok(ok(clinics
        .into_iter()
        .map(ClinicBody::from)
        .collect::<Vec<_>>()))
}

/// One clinic inside the caller's scope.
#[utoipa::path(
    get,
    path = "/api/clinics/{clinic_id}",
    params(("clinic_id" = String, Path, description = "Clinic identifier")),
    responses(
        (status = 200, description = "Clinic", body = ApiResponse<ClinicBody>),
        (status = 400, description = "Malformed clinic id", body = ErrorEnvelopeSchema),
        (status = 403, description = "Clinic outside scope", body = ErrorEnvelopeSchema),
        (status = 404, description = "Unknown clinic", body = ErrorEnvelopeSchema)
    ),
    tags = ["clinics"],
    operation_id = "getClinic"
)]
#[get("/clinics/{clinic_id}")]
pub async fn get_clinic(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let grant = process_api_request(
        &req,
        &session,
        &state,
        "/api/clinics",
        Some(path.as_str()),
        clinic_scoped(),
    )
    .await?;
    let clinic = state.clinics.get(&grant.clinic()?).await?;
    Ok(ok(ClinicBody::from(clinic)))
}

/// Current settings for a clinic.
#[utoipa::path(
    get,
    path = "/api/clinics/{clinic_id}/settings",
    params(("clinic_id" = String, Path, description = "Clinic identifier")),
    responses(
        (status = 200, description = "Settings", body = ApiResponse<ClinicSettingsBody>),
        (status = 403, description = "Clinic outside scope", body = ErrorEnvelopeSchema),
        (status = 404, description = "No settings stored", body = ErrorEnvelopeSchema)
    ),
    tags = ["clinics"],
    operation_id = "getClinicSettings"
)]
#[get("/clinics/{clinic_id}/settings")]
pub async fn get_settings(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let grant = process_api_request(
        &req,
        &session,
        &state,
        "/api/clinics/settings",
        Some(path.as_str()),
        clinic_scoped(),
    )
    .await?;
    let settings = state.clinics.settings(&grant.clinic()?).await?;
    Ok(ok(ClinicSettingsBody::from(settings)))
}

/// Replace a clinic's settings. Clinic administrators and headquarters only.
#[utoipa::path(
    put,
    path = "/api/clinics/{clinic_id}/settings",
    params(("clinic_id" = String, Path, description = "Clinic identifier")),
    request_body = UpdateClinicSettingsRequest,
    responses(
        (status = 200, description = "Stored settings", body = ApiResponse<ClinicSettingsBody>),
        (status = 400, description = "Validation failed", body = ErrorEnvelopeSchema),
        (status = 403, description = "Role or clinic not permitted", body = ErrorEnvelopeSchema)
    ),
    tags = ["clinics"],
    operation_id = "updateClinicSettings"
)]
#[put("/clinics/{clinic_id}/settings")]
pub async fn update_settings(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateClinicSettingsRequest>,
) -> ApiResult<HttpResponse> {
    let grant = process_api_request(
        &req,
        &session,
        &state,
        "/api/clinics/settings",
        Some(path.as_str()),
        AccessOptions::allow_roles([Role::ClinicAdmin]).with_clinic_match(true),
    )
    .await?;
    let settings = state
        .clinics
        .update_settings(&grant.clinic()?, payload.into_inner().into())
        .await?;
    Ok(ok(ClinicSettingsBody::from(settings)))
}
