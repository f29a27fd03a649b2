//! Inbound adapter for the clinic access guard.
//!
//! Handlers call [`process_api_request`] before touching clinic data. It
//! resolves the principal from the cookie session, extracts client details
//! for the audit trail and delegates the decision to
//! [`ClinicAccessGuard`](crate::domain::ClinicAccessGuard).

use actix_web::HttpRequest;
use actix_web::http::header::USER_AGENT;

use crate::domain::{AccessGrant, AccessOptions, AccessRequest, ClientInfo, Error};

use super::session::SessionContext;
use super::state::HttpState;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Client IP and user agent for audit records.
///
/// The first `X-Forwarded-For` hop wins over the socket peer address.
pub(crate) fn client_info(req: &HttpRequest) -> ClientInfo {
    let forwarded = req
        .headers()
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
        .map(str::to_owned);
    let ip_address = forwarded.or_else(|| req.peer_addr().map(|addr| addr.ip().to_string()));
    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    ClientInfo {
        ip_address,
        user_agent,
    }
}

/// Authenticate and authorise one API request.
///
/// `endpoint` is the logical route recorded in audit entries, for example
/// `/api/patients`. `clinic_id` is the raw tenant identifier supplied by
/// the caller.
///
/// # Errors
/// Propagates the guard's `unauthorized`, `forbidden` and `invalid_request`
/// failures, and session read failures as `internal_error`.
pub async fn process_api_request(
    req: &HttpRequest,
    session: &SessionContext,
    state: &HttpState,
    endpoint: &str,
    clinic_id: Option<&str>,
    options: AccessOptions,
) -> Result<AccessGrant, Error> {
    let principal = session.principal()?;
    if let Some(principal) = &principal {
        tracing::Span::current().record("user_id", tracing::field::display(principal.id));
    }
    let request = AccessRequest::new(endpoint, clinic_id, client_info(req)).with_options(options);
    state
        .guard
        .ensure_clinic_access(principal.as_ref(), request)
        .await
}

/// Options for endpoints scoped to exactly one clinic.
///
/// The clinic match is forced on so a missing `clinic_id` is rejected.
pub(crate) fn clinic_scoped() -> AccessOptions {
    AccessOptions::default().with_clinic_match(true)
}
