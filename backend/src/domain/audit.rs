//! Audit records written whenever the access guard denies a request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Principal, UserId};

/// Why the access guard stopped a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessDenialReason {
    /// No authenticated session.
    AuthenticationRequired,
    /// The principal has no permission record.
    PermissionsNotFound,
    /// The principal's role is not allowed for the operation.
    ForbiddenRole,
    /// The target clinic lies outside the principal's clinic scope.
    ForbiddenClinic,
}

impl AccessDenialReason {
    /// Human-readable reason stored in the audit trail.
    ///
    /// The text distinguishes which gate failed.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AuthenticationRequired => "Authentication required",
            Self::PermissionsNotFound => "Permissions not found",
            Self::ForbiddenRole => "Forbidden role for requested operation",
            Self::ForbiddenClinic => "Forbidden clinic access (parent-scope violation)",
        }
    }
}

impl std::fmt::Display for AccessDenialReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Network details of the caller, extracted by the inbound adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Structured record of an authorization failure.
///
/// ## Invariants
/// - `user_id` and `user_email` are both `None` for unauthenticated callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    /// Endpoint path, suffixed with `?clinic_id=<id>` for clinic violations.
    pub endpoint: String,
    pub reason: AccessDenialReason,
    pub user_id: Option<UserId>,
    pub user_email: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl AuditRecord {
    /// Build a record for `reason`, copying principal and client details.
    pub fn denied(
        endpoint: impl Into<String>,
        reason: AccessDenialReason,
        principal: Option<&Principal>,
        client: &ClientInfo,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            reason,
            user_id: principal.map(|p| p.id),
            user_email: principal.and_then(|p| p.email.clone()),
            ip_address: client.ip_address.clone(),
            user_agent: client.user_agent.clone(),
            occurred_at,
        }
    }

    /// Audited endpoint for a clinic-scope violation.
    ///
    /// `clinic_id` is written as supplied, so malformed ids stay visible.
    ///
    /// # Examples
    /// ```
    /// use clinic_backend::domain::{AuditRecord, ClinicId};
    ///
    /// let clinic = ClinicId::new("9b2f6f1e-3c1a-4d2e-8f00-0a1b2c3d4e5f").unwrap();
    /// assert_eq!(
    ///     AuditRecord::clinic_endpoint("/api/patients", &clinic),
    ///     "/api/patients?clinic_id=9b2f6f1e-3c1a-4d2e-8f00-0a1b2c3d4e5f"
    /// );
    /// ```
    pub fn clinic_endpoint(endpoint: &str, clinic_id: impl std::fmt::Display) -> String {
        format!("{endpoint}?clinic_id={clinic_id}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    fn unauthenticated_records_have_no_user_fields() {
        let client = ClientInfo {
            ip_address: Some("203.0.113.9".to_owned()),
            user_agent: Some("curl/8".to_owned()),
        };
        let at = Utc
            .with_ymd_and_hms(2026, 4, 1, 9, 0, 0)
            .single()
            .expect("timestamp");
        let record = AuditRecord::denied(
            "/api/patients",
            AccessDenialReason::AuthenticationRequired,
            None,
            &client,
            at,
        );
        assert!(record.user_id.is_none());
        assert!(record.user_email.is_none());
        assert_eq!(record.ip_address.as_deref(), Some("203.0.113.9"));
    }

    #[rstest]
    fn reasons_are_distinct() {
        let reasons = [
            AccessDenialReason::AuthenticationRequired,
            AccessDenialReason::PermissionsNotFound,
            AccessDenialReason::ForbiddenRole,
            AccessDenialReason::ForbiddenClinic,
        ];
        let mut texts: Vec<_> = reasons.iter().map(|r| r.as_str()).collect();
        texts.sort_unstable();
        texts.dedup();
        assert_eq!(texts.len(), reasons.len());
    }
}
