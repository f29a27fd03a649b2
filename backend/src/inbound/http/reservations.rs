//! Reservation (booking) handlers.
//!
//! ```text
//! GET   /api/reservations?clinic_id=...[&from=...&to=...]
//! POST  /api/reservations?clinic_id=...
//! PATCH /api/reservations/{reservation_id}/status?clinic_id=... {"status":"confirmed"}
//! ```

use actix_web::{HttpRequest, HttpResponse, get, patch, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ApiResult, Reservation, ReservationDraft, ReservationId, ReservationStatus};
use crate::inbound::http::access::{clinic_scoped, process_api_request};
use crate::inbound::http::envelope::{ApiResponse, created, ok};
use crate::inbound::http::patients::ClinicQuery;
use crate::inbound::http::schemas::ErrorEnvelopeSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{field_error, parse_id, parse_optional_range};
use crate::inbound::http::visits::ClinicRangeQuery;

const ENDPOINT: &str = "/api/reservations";

/// Reservation as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub clinic_id: String,
    #[schema(format = "uuid")]
    pub patient_id: String,
    #[schema(format = "uuid")]
    pub staff_id: Option<String>,
    #[schema(format = "date-time")]
    pub start_time: String,
    #[schema(format = "date-time")]
    pub end_time: String,
    pub menu: Option<String>,
    pub notes: Option<String>,
    #[schema(example = "tentative")]
    pub status: String,
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<Reservation> for ReservationBody {
    fn from(value: Reservation) -> Self {
        Self {
            id: value.id.to_string(),
            clinic_id: value.clinic_id.to_string(),
            patient_id: value.patient_id.to_string(),
            staff_id: value.staff_id.map(|id| id.to_string()),
            start_time: value.start_time.to_rfc3339(),
            end_time: value.end_time.to_rfc3339(),
            menu: value.menu,
            notes: value.notes,
            status: value.status.as_str().to_owned(),
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// Body for `POST /api/reservations`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    #[schema(format = "uuid")]
    pub patient_id: String,
    #[schema(format = "uuid")]
    pub staff_id: Option<String>,
    #[schema(value_type = String, format = "date-time")]
    pub start_time: DateTime<Utc>,
    #[schema(value_type = String, format = "date-time")]
    pub end_time: DateTime<Utc>,
    pub menu: Option<String>,
    pub notes: Option<String>,
    /// Book directly as `confirmed` instead of `tentative`.
    #[serde(default)]
    pub confirmed: bool,
}

impl From<ReservationRequest> for ReservationDraft {
    fn from(value: ReservationRequest) -> Self {
        Self {
            patient_id: value.patient_id,
            staff_id: value.staff_id,
            start_time: value.start_time,
            end_time: value.end_time,
            menu: value.menu,
            notes: value.notes,
            confirmed: value.confirmed,
        }
    }
}

/// Body for the status transition endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusChangeRequest {
    /// Target status, e.g. `arrived`.
    pub status: String,
}

/// Reservations of a clinic ordered by start time.
#[utoipa::path(
    get,
    path = "/api/reservations",
    params(ClinicRangeQuery),
    responses(
        (status = 200, description = "Reservations", body = ApiResponse<Vec<ReservationBody>>),
        (status = 400, description = "Bad range or clinic", body = ErrorEnvelopeSchema),
        (status = 403, description = "Clinic outside scope", body = ErrorEnvelopeSchema)
    ),
    tags = ["reservations"],
    operation_id = "listReservations"
)]
#[get("/reservations")]
pub async fn list_reservations(
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
    let range = parse_optional_range(query.from.as_deref(), query.to.as_deref())?;
    let reservations = state.reservations.list(&grant.clinic()?, range).await?;
    Ok(ok(reservations
        .into_iter()
        .map(ReservationBody::from)
        .collect::<Vec<_>>()))
}

/// Book a reservation.
#[utoipa::path(
    post,
    path = "/api/reservations",
    params(ClinicQuery),
    request_body = ReservationRequest,
    responses(
        (status = 201, description = "Booked", body = ApiResponse<ReservationBody>),
        (status = 400, description = "Validation failed", body = ErrorEnvelopeSchema),
        (status = 403, description = "Clinic outside scope", body = ErrorEnvelopeSchema)
    ),
    tags = ["reservations"],
    operation_id = "createReservation"
)]
#[post("/reservations")]
pub async fn create_reservation(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ClinicQuery>,
    payload: web::Json<ReservationRequest>,
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
    let reservation = state
        .reservations
        .create(&grant.clinic()?, payload.into_inner().into())
        .await?;
    Ok(created(ReservationBody::from(reservation)))
}

/// Move a reservation through its lifecycle.
#[utoipa::path(
    patch,
    path = "/api/reservations/{reservation_id}/status",
    params(
        ("reservation_id" = String, Path, description = "Reservation identifier"),
        ClinicQuery
    ),
    request_body = StatusChangeRequest,
    responses(
        (status = 200, description = "Updated", body = ApiResponse<ReservationBody>),
        (status = 400, description = "Unknown status", body = ErrorEnvelopeSchema),
        (status = 404, description = "Unknown reservation", body = ErrorEnvelopeSchema),
        (status = 409, description = "Transition not allowed", body = ErrorEnvelopeSchema)
    ),
    tags = ["reservations"],
    operation_id = "changeReservationStatus"
)]
#[patch("/reservations/{reservation_id}/status")]
pub async fn change_status(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<ClinicQuery>,
    payload: web::Json<StatusChangeRequest>,
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
    let reservation_id: ReservationId = parse_id("reservationId", &path)?;
    let next = ReservationStatus::parse(&payload.status).ok_or_else(|| {
        field_error(
            "status",
            "status must be one of tentative, confirmed, arrived, completed, cancelled, no_show",
        )
    })?;
    let reservation = state
        .reservations
        .change_status(&grant.clinic()?, &reservation_id, next)
        .await?;
    Ok(ok(ReservationBody::from(reservation)))
}
