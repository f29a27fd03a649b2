//! Permission administration handlers.
//!
//! Restricted to clinic administrators and headquarters.
//!
//! ```text
//! GET /api/permissions?clinic_id=...
//! PUT /api/permissions/{user_id}?clinic_id=... {"role":"therapist","clinicScopeIds":[...]}
//! ```

use actix_web::{HttpRequest, HttpResponse, get, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{AccessOptions, ApiResult, ClinicId, Error, Role, UserId, UserPermission};
use crate::inbound::http::access::process_api_request;
use crate::inbound::http::envelope::{ApiResponse, ok};
use crate::inbound::http::patients::ClinicQuery;
use crate::inbound::http::schemas::{ErrorEnvelopeSchema, UserPermissionSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{field_error, parse_id};

const ENDPOINT: &str = "/api/permissions";

fn admin_only() -> AccessOptions {
    AccessOptions::allow_roles([Role::ClinicAdmin]).with_clinic_match(true)
}

/// Body for `PUT /api/permissions/{user_id}`.
///
/// The `clinic_id` query parameter becomes the grantee's home clinic.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissionRequest {
    /// Role name; deprecated aliases are accepted and normalised.
    #[schema(example = "therapist")]
    pub role: String,
    /// Additional clinics the grantee may access.
    #[schema(value_type = Option<Vec<uuid::Uuid>>)]
    pub clinic_scope_ids: Option<Vec<String>>,
}

fn parse_scope(raw: Option<Vec<String>>) -> Result<Option<Vec<ClinicId>>, Error> {
    raw.map(|ids| {
        ids.iter()
            .map(|id| {
                ClinicId::new(id).map_err(|err| field_error("clinicScopeIds", err.to_string()))
            })
            .collect()
    })
    .transpose()
}

/// Permission records whose home clinic is `clinic_id`.
#[utoipa::path(
    get,
    path = "/api/permissions",
    params(ClinicQuery),
    responses(
        (status = 200, description = "Permissions", body = ApiResponse<Vec<UserPermissionSchema>>),
        (status = 403, description = "Role or clinic not permitted", body = ErrorEnvelopeSchema)
    ),
    tags = ["permissions"],
    operation_id = "listPermissions"
)]
#[get("/permissions")]
pub async fn list_permissions(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ClinicQuery>,
) -> ApiResult<HttpResponse> {
    let grant = process_api_request(
        &req,
        &session,
        &state,
        ENDPOINT,
        query.clinic_id.as_deref(),
        admin_only(),
    )
    .await?;
    let records = state.permissions.list_for_clinic(&grant.clinic()?).await?;
    Ok(ok(records))
}

/// Create or replace a user's permission record.
#[utoipa::path(
    put,
    path = "/api/permissions/{user_id}",
    params(("user_id" = String, Path, description = "Grantee"), ClinicQuery),
    request_body = PermissionRequest,
    responses(
        (status = 200, description = "Stored permission", body = ApiResponse<UserPermissionSchema>),
        (status = 400, description = "Unknown role or malformed ids", body = ErrorEnvelopeSchema),
        (status = 403, description = "Grant exceeds caller authority", body = ErrorEnvelopeSchema)
    ),
    tags = ["permissions"],
    operation_id = "upsertPermission"
)]
#[put("/permissions/{user_id}")]
pub async fn upsert_permission(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<ClinicQuery>,
    payload: web::Json<PermissionRequest>,
) -> ApiResult<HttpResponse> {
    let grant = process_api_request(
        &req,
        &session,
        &state,
        ENDPOINT,
        query.clinic_id.as_deref(),
        admin_only(),
    )
    .await?;
    let grantee: UserId = parse_id("userId", &path)?;
    let body = payload.into_inner();
    let requested = UserPermission::from_raw_role(
        grantee,
        &body.role,
        Some(grant.clinic()?),
        parse_scope(body.clinic_scope_ids)?,
    );
    let stored = state.permissions.grant(&grant.permission, requested).await?;
    Ok(ok(stored))
}
