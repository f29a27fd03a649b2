//! Request-time authorization and tenant-boundary guard.
//!
//! Every data endpoint calls [`ClinicAccessGuard::ensure_clinic_access`]
//! before touching clinic data. The guard is a strict pipeline; each stage
//! either advances or stops the request:
//!
//! 1. no principal: `401`, audited as "Authentication required";
//! 2. no permission record: `403`, audited as "Permissions not found";
//! 3. role normalised through the deprecated-role aliases;
//! 4. role outside `allowed_roles` and not headquarters: `403`, audited as
//!    "Forbidden role for requested operation";
//! 5. clinic match active: a missing or blank clinic id is a `400` with no
//!    audit; a clinic outside the principal's scope, malformed ids included,
//!    is a `403`, audited with `?clinic_id=<id>` appended to the endpoint.
//!    Headquarters roles are checked like everyone else.
//!
//! Audit sink failures are logged and never change the decision.

use std::sync::Arc;

use mockable::Clock;
use tracing::{error, warn};

use super::ports::{AuditLog, PermissionRepository};
use super::validation::FieldErrors;
use super::{
    AccessDenialReason, AuditRecord, ClientInfo, ClinicId, Error, Principal, Role, UserPermission,
};

/// Per-operation options for the guard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessOptions {
    /// Enforce the clinic scope check. Defaults to whether a clinic id was
    /// supplied.
    pub require_clinic_match: Option<bool>,
    /// Roles permitted besides headquarters. Empty permits every role.
    pub allowed_roles: Vec<Role>,
}

impl AccessOptions {
    /// Restrict the operation to `roles` (headquarters always passes).
    pub fn allow_roles(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            allowed_roles: roles.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Force the clinic match on or off.
    pub fn with_clinic_match(mut self, required: bool) -> Self {
        self.require_clinic_match = Some(required);
        self
    }
}

/// One access check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRequest<'a> {
    /// Logical endpoint path written to the audit trail.
    pub endpoint: &'a str,
    /// Raw target clinic id as supplied by the caller.
    pub clinic_id: Option<&'a str>,
    pub options: AccessOptions,
    pub client: ClientInfo,
}

impl<'a> AccessRequest<'a> {
    pub fn new(endpoint: &'a str, clinic_id: Option<&'a str>, client: ClientInfo) -> Self {
        Self {
            endpoint,
            clinic_id,
            options: AccessOptions::default(),
            client,
        }
    }

    pub fn with_options(mut self, options: AccessOptions) -> Self {
        self.options = options;
        self
    }
}

/// Successful guard outcome handed to the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGrant {
    pub principal: Principal,
    /// Permission record with the role normalised.
    pub permission: UserPermission,
    /// Target clinic, present only when the scope check ran and passed.
    pub clinic_id: Option<ClinicId>,
}

impl AccessGrant {
    /// The scope-checked clinic.
    ///
    /// # Errors
    /// Returns an internal error when the guard ran without a clinic match.
    pub fn clinic(&self) -> Result<ClinicId, Error> {
        self.clinic_id
            .ok_or_else(|| Error::internal("clinic access was not checked for this request"))
    }
}

/// Authorization guard shared by all HTTP handlers.
#[derive(Clone)]
pub struct ClinicAccessGuard {
    permissions: Arc<dyn PermissionRepository>,
    audit: Arc<dyn AuditLog>,
    clock: Arc<dyn Clock>,
}

impl ClinicAccessGuard {
    pub fn new(
        permissions: Arc<dyn PermissionRepository>,
        audit: Arc<dyn AuditLog>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            permissions,
            audit,
            clock,
        }
    }

    /// Decide whether `principal` may perform `request`.
    ///
    /// # Errors
    /// `unauthorized`, `forbidden` and `invalid_request` per the pipeline in
    /// the module docs; permission lookup failures propagate as
    /// `service_unavailable` or `internal_error`.
    pub async fn ensure_clinic_access(
        &self,
        principal: Option<&Principal>,
        request: AccessRequest<'_>,
    ) -> Result<AccessGrant, Error> {
        let Some(principal) = principal else {
            self.deny(&request, None, AccessDenialReason::AuthenticationRequired, None)
                .await;
            return Err(Error::unauthorized("authentication required"));
        };

        let Some(mut permission) = self.permissions.find_by_user(&principal.id).await? else {
            self.deny(
                &request,
                Some(principal),
                AccessDenialReason::PermissionsNotFound,
                None,
            )
            .await;
            return Err(Error::forbidden("permissions not found"));
        };
        // Hand-built records may still carry a deprecated name.
        permission.role = Role::normalize(permission.role.as_str());

        if !role_permitted(&permission.role, &request.options.allowed_roles) {
            self.deny(
                &request,
                Some(principal),
                AccessDenialReason::ForbiddenRole,
                None,
            )
            .await;
            return Err(Error::forbidden("role not permitted for this operation"));
        }

        let require_match = request
            .options
            .require_clinic_match
            .unwrap_or(request.clinic_id.is_some());
        let clinic_id = if require_match {
            let raw = required_clinic_id(request.clinic_id)?;
            // A malformed id names no clinic in any scope.
            let permitted = ClinicId::new(raw)
                .ok()
                .filter(|id| permission.scope().permits(id));
            let Some(clinic_id) = permitted else {
                self.deny(
                    &request,
                    Some(principal),
                    AccessDenialReason::ForbiddenClinic,
                    Some(raw),
                )
                .await;
                return Err(Error::forbidden("clinic is outside your access scope"));
            };
            Some(clinic_id)
        } else {
            None
        };

        Ok(AccessGrant {
            principal: principal.clone(),
            permission,
            clinic_id,
        })
    }

    async fn deny(
        &self,
        request: &AccessRequest<'_>,
        principal: Option<&Principal>,
        reason: AccessDenialReason,
        clinic_id: Option<&str>,
    ) {
        let endpoint = match clinic_id {
            Some(id) => AuditRecord::clinic_endpoint(request.endpoint, id),
            None => request.endpoint.to_owned(),
        };
        let record = AuditRecord::denied(
            endpoint,
            reason,
            principal,
            &request.client,
            self.clock.utc(),
        );
        warn!(
            endpoint = %record.endpoint,
            reason = %reason,
            user_id = ?record.user_id,
            "access denied"
        );
        if let Err(err) = self.audit.record(&record).await {
            error!(
                error = %err,
                endpoint = %record.endpoint,
                reason = %reason,
                "failed to write access audit record"
            );
        }
    }
}

fn role_permitted(role: &Role, allowed: &[Role]) -> bool {
    allowed.is_empty() || role.is_headquarters() || (role.is_recognised() && allowed.contains(role))
}

fn required_clinic_id(raw: Option<&str>) -> Result<&str, Error> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => Ok(value),
        None => {
            let mut fields = FieldErrors::default();
            fields.add("clinic_id", "clinic_id is required");
            Err(Error::validation(fields))
        }
    }
}

#[cfg(test)]
mod tests;
