//! Notification inbox handlers.
//!
//! Notifications belong to the caller rather than a clinic, so the guard
//! runs without a clinic match.
//!
//! ```text
//! GET  /api/notifications?unread_only=true
//! POST /api/notifications/{notification_id}/read
//! ```

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{AccessOptions, ApiResult, NotificationId};
use crate::inbound::http::access::process_api_request;
use crate::inbound::http::envelope::{ApiResponse, ok};
use crate::inbound::http::schemas::{ErrorEnvelopeSchema, NotificationSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_id;

const ENDPOINT: &str = "/api/notifications";

/// Query for `GET /api/notifications`.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct NotificationQuery {
    /// Only unread notifications.
    #[serde(default)]
    pub unread_only: bool,
}

/// The caller's notifications, newest first.
#[utoipa::path(
    get,
    path = "/api/notifications",
    params(NotificationQuery),
    responses(
        (status = 200, description = "Notifications", body = ApiResponse<Vec<NotificationSchema>>),
        (status = 401, description = "Not logged in", body = ErrorEnvelopeSchema)
    ),
    tags = ["notifications"],
    operation_id = "listNotifications"
)]
#[get("/notifications")]
pub async fn list_notifications(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<NotificationQuery>,
) -> ApiResult<HttpResponse> {
    let grant = process_api_request(
        &req,
        &session,
        &state,
        ENDPOINT,
        None,
        AccessOptions::default(),
    )
    .await?;
    let notifications = state
        .notifications
        .list(&grant.principal.id, query.unread_only)
        .await?;
    Ok(ok(notifications))
}

/// Mark one of the caller's notifications as read.
#[utoipa::path(
    post,
    path = "/api/notifications/{notification_id}/read",
    params(("notification_id" = String, Path, description = "Notification identifier")),
    responses(
        (status = 200, description = "Marked as read"),
        (status = 404, description = "Not the caller's notification", body = ErrorEnvelopeSchema)
    ),
    tags = ["notifications"],
    operation_id = "markNotificationRead"
)]
#[post("/notifications/{notification_id}/read")]
pub async fn mark_read(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let grant = process_api_request(
        &req,
        &session,
        &state,
        ENDPOINT,
        None,
        AccessOptions::default(),
    )
    .await?;
    let id: NotificationId = parse_id("notificationId", &path)?;
    state.notifications.mark_read(&grant.principal.id, &id).await?;
    Ok(ok(serde_json::Value::Null))
}
