//! Analytics handlers.
//!
//! Manager-level reports; clinic administrators and headquarters may read
//! them too.
//!
//! ```text
//! GET /api/analytics/ltv?clinic_id=...&limit=10
//! GET /api/analytics/churn-risk?clinic_id=...&threshold=70
//! GET /api/analytics/funnel?clinic_id=...&from=...&to=...
//! GET /api/analytics/revenue?clinic_id=...&from=...&to=...
//! GET /api/analytics/staff-performance?clinic_id=...&from=...&to=...
//! ```

use actix_web::{HttpRequest, HttpResponse, get, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{AccessOptions, AccessGrant, ApiResult, DateRange, Error, Role};
use crate::inbound::http::access::process_api_request;
use crate::inbound::http::envelope::{ApiResponse, ok};
use crate::inbound::http::schemas::{
    ChurnRiskSchema, ConversionFunnelSchema, ErrorEnvelopeSchema, PatientLtvSchema,
    RevenueSummarySchema, StaffPerformanceSchema,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_range_or_default;
use crate::inbound::http::visits::ClinicRangeQuery;

fn report_access() -> AccessOptions {
    AccessOptions::allow_roles([Role::ClinicAdmin, Role::Manager]).with_clinic_match(true)
}

async fn authorise(
    req: &HttpRequest,
    state: &HttpState,
    session: &SessionContext,
    endpoint: &str,
    clinic_id: Option<&str>,
) -> Result<AccessGrant, Error> {
    process_api_request(req, session, state, endpoint, clinic_id, report_access()).await
}

fn range_of(state: &HttpState, query: &ClinicRangeQuery) -> Result<DateRange, Error> {
    parse_range_or_default(
        query.from.as_deref(),
        query.to.as_deref(),
        state.clock.utc().date_naive(),
    )
}

/// Query for the lifetime-value ranking.
#[derive(Debug, Deserialize, IntoParams)]
pub struct LtvQuery {
    pub clinic_id: Option<String>,
    /// Rows to return, 1 to 100 (default 10).
    pub limit: Option<u32>,
}

/// Query for the churn-risk report.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ChurnQuery {
    pub clinic_id: Option<String>,
    /// Minimum score, 0 to 100 (default 70).
    pub threshold: Option<i32>,
}

/// Patients ranked by lifetime value.
#[utoipa::path(
    get,
    path = "/api/analytics/ltv",
    params(LtvQuery),
    responses(
        (status = 200, description = "Ranking", body = ApiResponse<Vec<PatientLtvSchema>>),
        (status = 400, description = "Limit out of range", body = ErrorEnvelopeSchema),
        (status = 403, description = "Role or clinic not permitted", body = ErrorEnvelopeSchema)
    ),
    tags = ["analytics"],
    operation_id = "topPatientsByLtv"
)]
#[get("/analytics/ltv")]
pub async fn top_patients_by_ltv(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<LtvQuery>,
) -> ApiResult<HttpResponse> {
    let grant = authorise(
        &req,
        &state,
        &session,
        "/api/analytics/ltv",
        query.clinic_id.as_deref(),
    )
    .await?;
    let rows = state
        .analytics
        .top_patients_by_ltv(&grant.clinic()?, query.limit)
        .await?;
    Ok(ok(rows))
}

/// Patients whose churn-risk score meets the threshold.
#[utoipa::path(
    get,
    path = "/api/analytics/churn-risk",
    params(ChurnQuery),
    responses(
        (status = 200, description = "At-risk patients", body = ApiResponse<Vec<ChurnRiskSchema>>),
        (status = 400, description = "Threshold out of range", body = ErrorEnvelopeSchema),
        (status = 403, description = "Role or clinic not permitted", body = ErrorEnvelopeSchema)
    ),
    tags = ["analytics"],
    operation_id = "churnRisk"
)]
#[get("/analytics/churn-risk")]
pub async fn churn_risk(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ChurnQuery>,
) -> ApiResult<HttpResponse> {
    let grant = authorise(
        &req,
        &state,
        &session,
        "/api/analytics/churn-risk",
        query.clinic_id.as_deref(),
    )
    .await?;
    let rows = state
        .analytics
        .churn_risk(&grant.clinic()?, query.threshold)
        .await?;
    Ok(ok(rows))
}

/// Reservation-to-return funnel.
#[utoipa::path(
    get,
    path = "/api/analytics/funnel",
    params(ClinicRangeQuery),
    responses(
        (status = 200, description = "Funnel", body = ApiResponse<ConversionFunnelSchema>),
        (status = 403, description = "Role or clinic not permitted", body = ErrorEnvelopeSchema)
    ),
    tags = ["analytics"],
    operation_id = "conversionFunnel"
)]
#[get("/analytics/funnel")]
pub async fn conversion_funnel(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ClinicRangeQuery>,
) -> ApiResult<HttpResponse> {
    let grant = authorise(
        &req,
        &state,
        &session,
        "/api/analytics/funnel",
        query.clinic_id.as_deref(),
    )
    .await?;
    let range = range_of(&state, &query)?;
    let funnel = state
        .analytics
        .conversion_funnel(&grant.clinic()?, range)
        .await?;
    Ok(ok(funnel))
}

/// Daily revenue totals.
#[utoipa::path(
    get,
    path = "/api/analytics/revenue",
    params(ClinicRangeQuery),
    responses(
        (status = 200, description = "Revenue", body = ApiResponse<RevenueSummarySchema>),
        (status = 403, description = "Role or clinic not permitted", body = ErrorEnvelopeSchema)
    ),
    tags = ["analytics"],
    operation_id = "revenueSummary"
)]
#[get("/analytics/revenue")]
pub async fn revenue_summary(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ClinicRangeQuery>,
) -> ApiResult<HttpResponse> {
    let grant = authorise(
        &req,
        &state,
        &session,
        "/api/analytics/revenue",
        query.clinic_id.as_deref(),
    )
    .await?;
    let range = range_of(&state, &query)?;
    let summary = state
        .analytics
        .revenue_summary(&grant.clinic()?, range)
        .await?;
    Ok(ok(summary))
}

/// Visit totals per staff member.
#[utoipa::path(
    get,
    path = "/api/analytics/staff-performance",
    params(ClinicRangeQuery),
    responses(
        (status = 200, description = "Per-staff totals", body = ApiResponse<Vec<StaffPerformanceSchema>>),
        (status = 403, description = "Role or clinic not permitted", body = ErrorEnvelopeSchema)
    ),
    tags = ["analytics"],
    operation_id = "staffPerformance"
)]
#[get("/analytics/staff-performance")]
pub async fn staff_performance(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ClinicRangeQuery>,
) -> ApiResult<HttpResponse> {
    let grant = authorise(
        &req,
        &state,
        &session,
        "/api/analytics/staff-performance",
        query.clinic_id.as_deref(),
    )
    .await?;
    let range = range_of(&state, &query)?;
    let rows = state
        .analytics
        .staff_performance(&grant.clinic()?, range)
        .await?;
    Ok(ok(rows))
}
