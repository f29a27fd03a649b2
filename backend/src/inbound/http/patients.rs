//! Patient record handlers.
//!
//! ```text
//! GET  /api/patients?clinic_id=...&search=...&cursor=...&limit=...
//! POST /api/patients?clinic_id=...
//! GET  /api/patients/{patient_id}?clinic_id=...
//! PUT  /api/patients/{patient_id}?clinic_id=...
//! ```

use actix_web::{HttpRequest, HttpResponse, get, post, put, web};
use pagination::Page;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{ApiResult, Patient, PatientDraft, PatientId, PatientListRequest};
use crate::inbound::http::access::{clinic_scoped, process_api_request};
use crate::inbound::http::envelope::{ApiResponse, created, ok};
use crate::inbound::http::schemas::ErrorEnvelopeSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_id;

const ENDPOINT: &str = "/api/patients";

/// Tenant selector shared by clinic-scoped endpoints.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ClinicQuery {
    /// Target clinic.
    pub clinic_id: Option<String>,
}

/// Query for `GET /api/patients`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct PatientListParams {
    pub clinic_id: Option<String>,
    /// Case-insensitive name or kana substring.
    pub search: Option<String>,
    /// Opaque cursor from a previous page's `nextCursor`.
    pub cursor: Option<String>,
    /// Page size, 1 to 100 (default 20).
    pub limit: Option<usize>,
}

/// Patient as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub clinic_id: String,
    pub name: String,
    pub name_kana: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[schema(format = "date")]
    pub birth_date: Option<String>,
    #[schema(example = "female")]
    pub gender: Option<String>,
    pub notes: Option<String>,
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<Patient> for PatientBody {
    fn from(value: Patient) -> Self {
        Self {
            id: value.id.to_string(),
            clinic_id: value.clinic_id.to_string(),
            name: value.name,
            name_kana: value.name_kana,
            phone: value.phone,
            email: value.email,
            birth_date: value.birth_date.map(|d| d.to_string()),
            gender: value.gender.map(|g| g.as_str().to_owned()),
            notes: value.notes,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// One page of patients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientPageBody {
    pub items: Vec<PatientBody>,
    /// Pass back as `cursor` to fetch the next page; absent on the last page.
    pub next_cursor: Option<String>,
}

impl From<Page<Patient>> for PatientPageBody {
    fn from(page: Page<Patient>) -> Self {
        let page = page.map(PatientBody::from);
        Self {
            items: page.items,
            next_cursor: page.next_cursor,
        }
    }
}

/// Create or replace body for a patient record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientRequest {
    pub name: String,
    pub name_kana: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[schema(format = "date")]
    pub birth_date: Option<String>,
    /// One of `male`, `female`, `other`, `unspecified`.
    pub gender: Option<String>,
    pub notes: Option<String>,
}

impl From<PatientRequest> for PatientDraft {
    fn from(value: PatientRequest) -> Self {
        Self {
            name: value.name,
            name_kana: value.name_kana,
            phone: value.phone,
            email: value.email,
            birth_date: value.birth_date,
            gender: value.gender,
            notes: value.notes,
        }
    }
}

/// Page through a clinic's patients.
#[utoipa::path(
    get,
    path = "/api/patients",
    params(PatientListParams),
    responses(
        (status = 200, description = "Patients", body = ApiResponse<PatientPageBody>),
        (status = 400, description = "Missing clinic or bad cursor", body = ErrorEnvelopeSchema),
        (status = 401, description = "Not logged in", body = ErrorEnvelopeSchema),
        (status = 403, description = "Clinic outside scope", body = ErrorEnvelopeSchema)
    ),
    tags = ["patients"],
    operation_id = "listPatients"
)]
#[get("/patients")]
pub async fn list_patients(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<PatientListParams>,
) -> ApiResult<HttpResponse> {
    let params = query.into_inner();
    let grant = process_api_request(
        &req,
        &session,
        &state,
        ENDPOINT,
        params.clinic_id.as_deref(),
        clinic_scoped(),
    )
    .await?;
    let page = state
        .patients
        .list(
            &grant.clinic()?,
            PatientListRequest {
                search: params.search,
                cursor: params.cursor,
                limit: params.limit,
            },
        )
        .await?;
    Ok(ok(PatientPageBody::from(page)))
}

/// Register a patient.
#[utoipa::path(
    post,
    path = "/api/patients",
    params(ClinicQuery),
    request_body = PatientRequest,
    responses(
        (status = 201, description = "Created", body = ApiResponse<PatientBody>),
        (status = 400, description = "Validation failed", body = ErrorEnvelopeSchema),
        (status = 403, description = "Clinic outside scope", body = ErrorEnvelopeSchema)
    ),
    tags = ["patients"],
    operation_id = "createPatient"
)]
#[post("/patients")]
pub async fn create_patient(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ClinicQuery>,
    payload: web::Json<PatientRequest>,
) -> ApiResult<HttpResponse> {
    let grant = process_api_request(
        &req,
        &session,
        &state,
        ENDPOINT,
        query.clinic_id.as_deref(),
        clinic_scoped(),
    )
    .await?;
    let patient = state
        .patients
        .create(&grant.clinic()?, payload.into_inner().into())
        .await?;
    Ok(created(PatientBody::from(patient)))
}

/// Fetch one patient of the clinic.
#[utoipa::path(
    get,
    path = "/api/patients/{patient_id}",
    params(("patient_id" = String, Path, description = "Patient identifier"), ClinicQuery),
    responses(
        (status = 200, description = "Patient", body = ApiResponse<PatientBody>),
        (status = 403, description = "Clinic outside scope", body = ErrorEnvelopeSchema),
        (status = 404, description = "Unknown patient", body = ErrorEnvelopeSchema)
    ),
    tags = ["patients"],
    operation_id = "getPatient"
)]
#[get("/patients/{patient_id}")]
pub async fn get_patient(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<ClinicQuery>,
) -> ApiResult<HttpResponse> {
    let grant = process_api_request(
        &req,
        &session,
        &state,
        ENDPOINT,
        query.clinic_id.as_deref(),
        clinic_scoped(),
    )
    .await?;
    let patient_id: PatientId = parse_id("patientId", &path)?;
    let patient = state.patients.get(&grant.clinic()?, &patient_id).await?;
    Ok(ok(PatientBody::from(patient)))
}

/// Replace a patient's editable fields.
#[utoipa::path(
    put,
    path = "/api/patients/{patient_id}",
    params(("patient_id" = String, Path, description = "Patient identifier"), ClinicQuery),
    request_body = PatientRequest,
    responses(
        (status = 200, description = "Updated", body = ApiResponse<PatientBody>),
        (status = 400, description = "Validation failed", body = ErrorEnvelopeSchema),
        (status = 404, description = "Unknown patient", body = ErrorEnvelopeSchema)
    ),
    tags = ["patients"],
    operation_id = "updatePatient"
)]
#[put("/patients/{patient_id}")]
pub async fn update_patient(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<ClinicQuery>,
    payload: web::Json<PatientRequest>,
) -> ApiResult<HttpResponse> {
    let grant = process_api_request(
        &req,
        &session,
        &state,
        ENDPOINT,
        query.clinic_id.as_deref(),
        clinic_scoped(),
    )
    .await?;
    let patient_id: PatientId = parse_id("patientId", &path)?;
    let patient = state
        .patients
        .update(&grant.clinic()?, &patient_id, payload.into_inner().into())
        .await?;
    Ok(ok(PatientBody::from(patient)))
}
