//! Visit handlers.
//!
//! ```text
//! GET  /api/visits?clinic_id=...&from=2026-04-01&to=2026-04-30
//! POST /api/visits?clinic_id=...
//! ```

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{ApiResult, Visit, VisitDraft};
use crate::inbound::http::access::{clinic_scoped, process_api_request};
use crate::inbound::http::envelope::{ApiResponse, created, ok};
use crate::inbound::http::patients::ClinicQuery;
use crate::inbound::http::schemas::ErrorEnvelopeSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_range_or_default;

const ENDPOINT: &str = "/api/visits";

/// Clinic plus an inclusive date range; the last 30 days when omitted.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ClinicRangeQuery {
    pub clinic_id: Option<String>,
    /// First day, `YYYY-MM-DD`.
    pub from: Option<String>,
    /// Last day, `YYYY-MM-DD`.
    pub to: Option<String>,
}

/// Visit as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisitBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub clinic_id: String,
    #[schema(format = "uuid")]
    pub patient_id: String,
    #[schema(format = "uuid")]
    pub staff_id: Option<String>,
    #[schema(format = "date")]
    pub visit_date: String,
    pub treatment_menu: Option<String>,
    /// Minor currency units.
    pub revenue: i64,
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<Visit> for VisitBody {
    fn from(value: Visit) -> Self {
        Self {
            id: value.id.to_string(),
            clinic_id: value.clinic_id.to_string(),
            patient_id: value.patient_id.to_string(),
            staff_id: value.staff_id.map(|id| id.to_string()),
            visit_date: value.visit_date.to_string(),
            treatment_menu: value.treatment_menu,
            revenue: value.revenue,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// Body for `POST /api/visits`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisitRequest {
    #[schema(format = "uuid")]
    pub patient_id: String,
    #[schema(format = "uuid")]
    pub staff_id: Option<String>,
    #[schema(format = "date")]
    pub visit_date: String,
    pub treatment_menu: Option<String>,
    #[serde(default)]
    pub revenue: i64,
}

impl From<VisitRequest> for VisitDraft {
    fn from(value: VisitRequest) -> Self {
        Self {
            patient_id: value.patient_id,
            staff_id: value.staff_id,
            visit_date: value.visit_date,
            treatment_menu: value.treatment_menu,
            revenue: value.revenue,
        }
    }
}

/// Visits of a clinic within a date range, ordered by date.
#[utoipa::path(
    get,
    path = "/api/visits",
    params(ClinicRangeQuery),
    responses(
        (status = 200, description = "Visits", body = ApiResponse<Vec<VisitBody>>),
        (status = 400, description = "Bad range or clinic", body = ErrorEnvelopeSchema),
        (status = 403, description = "Clinic outside scope", body = ErrorEnvelopeSchema)
    ),
    tags = ["visits"],
    operation_id = "listVisits"
)]
#[get("/visits")]
pub async fn list_visits(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ClinicRangeQuery>,
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
    let range = parse_range_or_default(
        query.from.as_deref(),
        query.to.as_deref(),
        state.clock.utc().date_naive(),
    )?;
    let visits = state.visits.list(&grant.clinic()?, range).await?;
    Ok(ok(visits.into_iter().map(VisitBody::from).collect::<Vec<_>>()))
}

/// Record a completed visit.
#[utoipa::path(
    post,
    path = "/api/visits",
    params(ClinicQuery),
    request_body = VisitRequest,
    responses(
        (status = 201, description = "Recorded", body = ApiResponse<VisitBody>),
        (status = 400, description = "Validation failed", body = ErrorEnvelopeSchema),
        (status = 403, description = "Clinic outside scope", body = ErrorEnvelopeSchema)
    ),
    tags = ["visits"],
    operation_id = "recordVisit"
)]
#[post("/visits")]
pub async fn record_visit(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ClinicQuery>,
    payload: web::Json<VisitRequest>,
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
    let visit = state
        .visits
        .record(&grant.clinic()?, payload.into_inner().into())
        .await?;
    Ok(created(VisitBody::from(visit)))
}
