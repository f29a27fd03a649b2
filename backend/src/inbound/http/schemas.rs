//! OpenAPI schema definitions for domain error types.
//!
//! Domain types stay framework-agnostic by not deriving `ToSchema`. The
//! wrappers here mirror their structure and register under the domain names.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request conflicts with the resource's current state.
    #[schema(rename = "conflict")]
    Conflict,
    /// The database is unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "forbidden")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "clinic is outside your access scope")]
    message: String,
    /// Correlation identifier, also sent as the `trace-id` header.
    #[schema(example = "6f1c2a7e-3d4b-4c5a-9e8f-0a1b2c3d4e5f")]
    trace_id: Option<String>,
    /// Validation failures carry `{"fields": {name: message}}`.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for the failure envelope.
#[derive(ToSchema)]
#[schema(as = crate::inbound::http::error::ErrorEnvelope)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorEnvelopeSchema {
    /// Always `false` for this shape.
    success: bool,
    error: ErrorSchema,
}

/// OpenAPI schema for [`crate::domain::Staff`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Staff, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct StaffSchema {
    #[schema(format = "uuid")]
    id: String,
    #[schema(format = "uuid")]
    clinic_id: String,
    name: String,
    #[schema(example = "therapist")]
    role: String,
    is_active: bool,
}

/// OpenAPI schema for [`crate::domain::Notification`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Notification, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct NotificationSchema {
    #[schema(format = "uuid")]
    id: String,
    #[schema(format = "uuid")]
    user_id: String,
    #[schema(format = "uuid")]
    clinic_id: Option<String>,
    title: String,
    body: String,
    is_read: bool,
    #[schema(format = "date-time")]
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::UserPermission`].
#[derive(ToSchema)]
#[schema(as = crate::domain::UserPermission, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserPermissionSchema {
    #[schema(format = "uuid")]
    user_id: String,
    #[schema(example = "clinic_admin")]
    role: String,
    /// Home clinic.
    #[schema(format = "uuid")]
    clinic_id: Option<String>,
    /// Explicit clinic scope; takes precedence over the home clinic.
    clinic_scope_ids: Option<Vec<String>>,
}

/// OpenAPI schema for [`crate::domain::PatientLtv`].
#[derive(ToSchema)]
#[schema(as = crate::domain::PatientLtv, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PatientLtvSchema {
    #[schema(format = "uuid")]
    patient_id: String,
    patient_name: String,
    visit_count: i64,
    total_revenue: i64,
    /// Value computed by `calculate_patient_ltv`.
    ltv: i64,
}

/// OpenAPI schema for [`crate::domain::ChurnRisk`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ChurnRisk, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ChurnRiskSchema {
    #[schema(format = "uuid")]
    patient_id: String,
    patient_name: String,
    #[schema(format = "date")]
    last_visit_date: Option<String>,
    /// Score from `calculate_churn_risk`, 0 to 100.
    score: i32,
}

/// OpenAPI schema for [`crate::domain::FunnelStage`].
#[derive(ToSchema)]
#[schema(as = crate::domain::FunnelStage, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct FunnelStageSchema {
    /// `reserved`, `arrived`, `completed` or `returning`.
    stage: String,
    count: u64,
    /// Share of the previous stage, 0.0 to 1.0.
    conversion_rate: f64,
}

/// OpenAPI schema for [`crate::domain::ConversionFunnel`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ConversionFunnel, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ConversionFunnelSchema {
    #[schema(format = "date")]
    from: String,
    #[schema(format = "date")]
    to: String,
    stages: Vec<FunnelStageSchema>,
}

/// OpenAPI schema for [`crate::domain::RevenueDay`].
#[derive(ToSchema)]
#[schema(as = crate::domain::RevenueDay, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct RevenueDaySchema {
    #[schema(format = "date")]
    date: String,
    visit_count: u64,
    revenue: i64,
}

/// OpenAPI schema for [`crate::domain::RevenueSummary`].
#[derive(ToSchema)]
#[schema(as = crate::domain::RevenueSummary, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct RevenueSummarySchema {
    days: Vec<RevenueDaySchema>,
    total_visits: u64,
    total_revenue: i64,
}

/// OpenAPI schema for [`crate::domain::StaffPerformance`].
#[derive(ToSchema)]
#[schema(as = crate::domain::StaffPerformance, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct StaffPerformanceSchema {
    /// Absent for visits without an assigned staff member.
    #[schema(format = "uuid")]
    staff_id: Option<String>,
    staff_name: Option<String>,
    visit_count: u64,
    revenue: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::PartialSchema;

    fn schema_to_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[test]
    fn error_code_schema_variants_match_domain() {
        let schema_json = schema_to_json::<ErrorCodeSchema>();
        for code in [
            "invalid_request",
            "unauthorized",
            "forbidden",
            "not_found",
            "conflict",
            "service_unavailable",
            "internal_error",
        ] {
            assert!(schema_json.contains(code), "missing {code}");
        }
    }

    #[test]
    fn error_schema_uses_camel_case_trace_id() {
        let schema_json = schema_to_json::<ErrorSchema>();
        assert_eq!(ErrorSchema::name(), "crate.domain.Error");
        assert!(schema_json.contains("traceId"));
    }

    #[test]
    fn envelope_schema_embeds_error() {
        let schema_json = schema_to_json::<ErrorEnvelopeSchema>();
        assert!(schema_json.contains("success"));
        assert!(schema_json.contains("error"));
    }
}
