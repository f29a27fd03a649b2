//! HTTP adapter mapping for domain errors.
//!
//! Failures are returned inside the API envelope:
//! `{"success": false, "error": {"code", "message", "details"?, "traceId"?}}`.
//! Internal and availability failures are logged with their original message
//! and reach the client only as a localized generic message.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use super::cache_control::private_no_store_header;
use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Client-facing message for unexpected server failures.
pub const INTERNAL_ERROR_MESSAGE: &str =
    "サーバーエラーが発生しました。しばらくしてから再度お試しください。";

/// Client-facing message when the database is unreachable.
pub const SERVICE_UNAVAILABLE_MESSAGE: &str =
    "現在サービスを利用できません。しばらくしてから再度お試しください。";

/// Failure envelope written for every error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: Error,
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact(error: &Error) -> Error {
    let generic = match error.code() {
        ErrorCode::InternalError => Error::internal(INTERNAL_ERROR_MESSAGE),
        ErrorCode::ServiceUnavailable => Error::service_unavailable(SERVICE_UNAVAILABLE_MESSAGE),
        _ => return error.clone(),
    };
    match error.trace_id() {
        Some(id) => generic.with_trace_id(id.to_owned()),
        None => generic,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        match self.code() {
            ErrorCode::InternalError | ErrorCode::ServiceUnavailable => error!(
                code = ?self.code(),
                message = %self.message(),
                details = ?self.details(),
                trace_id = ?self.trace_id(),
                "request failed"
            ),
            ErrorCode::Unauthorized | ErrorCode::Forbidden => warn!(
                code = ?self.code(),
                trace_id = ?self.trace_id(),
                "request rejected"
            ),
            _ => {}
        }

        let mut builder = HttpResponse::build(self.status_code());
        builder.insert_header(private_no_store_header());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(ErrorEnvelope {
            success: false,
            error: redact(self),
        })
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal(format!("framework error: {err}"))
    }
}
