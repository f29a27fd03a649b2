//! Staff directory handler.
//!
//! ```text
//! GET /api/staff?clinic_id=...
//! ```

use actix_web::{HttpRequest, HttpResponse, get, web};

use crate::domain::ApiResult;
use crate::inbound::http::access::{clinic_scoped, process_api_request};
use crate::inbound::http::envelope::{ApiResponse, ok};
use crate::inbound::http::patients::ClinicQuery;
use crate::inbound::http::schemas::{ErrorEnvelopeSchema, StaffSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Staff members of a clinic.
#[utoipa::path(
    get,
    path = "/api/staff",
    params(ClinicQuery),
    responses(
        (status = 200, description = "Staff", body = ApiResponse<Vec<StaffSchema>>),
        (status = 400, description = "Missing clinic", body = ErrorEnvelopeSchema),
        (status = 403, description = "Clinic outside scope", body = ErrorEnvelopeSchema)
    ),
    tags = ["staff"],
    operation_id = "listStaff"
)]
#[get("/staff")]
pub async fn list_staff(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ClinicQuery>,
) -> ApiResult<HttpResponse> {
    let grant = process_api_request(
        &req,
        &session,
        &state,
        "/api/staff",
        query.clinic_id.as_deref(),
        clinic_scoped(),
    )
    .await?;
    let staff = state.staff.list(&grant.clinic()?).await?;
    Ok(ok(staff))
}
