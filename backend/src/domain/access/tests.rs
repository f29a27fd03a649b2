//! Behaviour coverage for the clinic access guard.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::{fixture, rstest};
use rstest_bdd_macros::{given, then};

use super::*;
use crate::domain::ports::{AuditLogError, MockAuditLog, MockPermissionRepository};
use crate::domain::{ErrorCode, UserId};

const CLINIC_ALLOW: &str = "0b6c1a52-5a0e-4b1e-9a55-6d1d0c0a0001";
const CLINIC_DENY: &str = "0b6c1a52-5a0e-4b1e-9a55-6d1d0c0a0002";
const CLINIC_HQ_HOME: &str = "0b6c1a52-5a0e-4b1e-9a55-6d1d0c0a0003";
const ENDPOINT: &str = "/api/patients";

fn clinic(raw: &str) -> ClinicId {
    ClinicId::new(raw).expect("fixture clinic id")
}

fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 1, 9, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock;

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        fixture_timestamp().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        fixture_timestamp()
    }
}

#[derive(Default)]
struct RecordingAuditLog(Mutex<Vec<AuditRecord>>);

impl RecordingAuditLog {
    fn records(&self) -> Vec<AuditRecord> {
        self.0.lock().expect("audit lock").clone()
    }
}

#[async_trait]
impl AuditLog for RecordingAuditLog {
    async fn record(&self, record: &AuditRecord) -> Result<(), AuditLogError> {
        self.0.lock().expect("audit lock").push(record.clone());
        Ok(())
    }
}

struct World {
    guard: ClinicAccessGuard,
    audit: Arc<RecordingAuditLog>,
}

fn world_with(permission: Option<UserPermission>) -> World {
    let mut permissions = MockPermissionRepository::new();
    permissions
        .expect_find_by_user()
        .returning(move |_| Ok(permission.clone()));
    let audit = Arc::new(RecordingAuditLog::default());
    let guard = ClinicAccessGuard::new(Arc::new(permissions), audit.clone(), Arc::new(FixtureClock));
    World { guard, audit }
}

#[fixture]
fn principal() -> Principal {
    Principal::new(UserId::random(), Some("therapist@clinic.example".to_owned()))
}

#[fixture]
fn client() -> ClientInfo {
    ClientInfo {
        ip_address: Some("198.51.100.4".to_owned()),
        user_agent: Some("Mozilla/5.0".to_owned()),
    }
}

fn permission_for(principal: &Principal, raw_role: &str) -> UserPermission {
    UserPermission::from_raw_role(principal.id, raw_role, Some(clinic(CLINIC_ALLOW)), None)
}

fn a_user_scoped_to_a_single_clinic(principal: &Principal, raw_role: &str) -> World {
    world_with(Some(permission_for(principal, raw_role)))
}

#[given("a headquarters administrator whose scope spans several clinics")]
fn a_headquarters_administrator(principal: Principal) -> World {
    world_with(Some(UserPermission::from_raw_role(
        principal.id,
        "admin",
        Some(clinic(CLINIC_HQ_HOME)),
        Some(vec![clinic(CLINIC_HQ_HOME), clinic(CLINIC_ALLOW)]),
    )))
}

#[then("exactly one audit record is written")]
fn exactly_one_audit_record_is_written(records: Vec<AuditRecord>) -> AuditRecord {
    assert_eq!(records.len(), 1, "expected exactly one audit record");
    let record = records.into_iter().next().expect("one record");
    assert_eq!(record.occurred_at, fixture_timestamp());
    record
}

#[then("no audit record is written")]
fn no_audit_record_is_written(records: Vec<AuditRecord>) {
    assert!(records.is_empty(), "unexpected audit record: {records:?}");
}

fn exactly_one_audit_record(world: &World, reason: AccessDenialReason) -> AuditRecord {
    let record = exactly_one_audit_record_is_written(world.audit.records());
    assert_eq!(record.reason, reason);
    record
}

#[rstest]
#[case(None)]
#[case(Some(CLINIC_ALLOW))]
#[tokio::test]
async fn missing_session_is_unauthorized_and_audited(
    client: ClientInfo,
    #[case] clinic_id: Option<&str>,
) {
    let world = world_with(None);

    let err = world
        .guard
        .ensure_clinic_access(None, AccessRequest::new(ENDPOINT, clinic_id, client))
        .await
        .expect_err("no session");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
    let record = exactly_one_audit_record(&world, AccessDenialReason::AuthenticationRequired);
    assert!(record.user_id.is_none());
    assert!(record.user_email.is_none());
    assert_eq!(record.endpoint, ENDPOINT);
    assert_eq!(record.ip_address.as_deref(), Some("198.51.100.4"));
}

#[rstest]
#[tokio::test]
async fn missing_permission_record_is_forbidden(principal: Principal, client: ClientInfo) {
    let world = world_with(None);

    let err = world
        .guard
        .ensure_clinic_access(
            Some(&principal),
            AccessRequest::new(ENDPOINT, Some(CLINIC_ALLOW), client),
        )
        .await
        .expect_err("no permissions");

    assert_eq!(err.code(), ErrorCode::Forbidden);
    let record = exactly_one_audit_record(&world, AccessDenialReason::PermissionsNotFound);
    assert_eq!(record.reason.as_str(), "Permissions not found");
    assert_eq!(record.user_id, Some(principal.id));
    assert_eq!(record.user_email, principal.email);
}

#[rstest]
#[tokio::test]
async fn clinic_outside_scope_is_forbidden_and_audited_with_clinic(
    principal: Principal,
    client: ClientInfo,
) {
    let world = a_user_scoped_to_a_single_clinic(&principal, "staff");

    let err = world
        .guard
        .ensure_clinic_access(
            Some(&principal),
            AccessRequest::new(ENDPOINT, Some(CLINIC_DENY), client),
        )
        .await
        .expect_err("outside scope");

    assert_eq!(err.code(), ErrorCode::Forbidden);
    let record = exactly_one_audit_record(&world, AccessDenialReason::ForbiddenClinic);
    assert_eq!(record.endpoint, format!("{ENDPOINT}?clinic_id={CLINIC_DENY}"));
}

#[rstest]
#[tokio::test]
async fn headquarters_may_access_scoped_clinic_other_than_home(
    principal: Principal,
    client: ClientInfo,
) {
    let world = a_headquarters_administrator(principal.clone());

    let grant = world
        .guard
        .ensure_clinic_access(
            Some(&principal),
            AccessRequest::new(ENDPOINT, Some(CLINIC_ALLOW), client),
        )
        .await
        .expect("in organisational scope");

    assert_eq!(grant.clinic_id, Some(clinic(CLINIC_ALLOW)));
    assert_eq!(grant.permission.role, Role::Admin);
    no_audit_record_is_written(world.audit.records());
}

#[rstest]
#[tokio::test]
async fn headquarters_is_not_exempt_from_scope(principal: Principal, client: ClientInfo) {
    let world = a_headquarters_administrator(principal.clone());

    let err = world
        .guard
        .ensure_clinic_access(
            Some(&principal),
            AccessRequest::new(ENDPOINT, Some(CLINIC_DENY), client),
        )
        .await
        .expect_err("outside organisational scope");

    assert_eq!(err.code(), ErrorCode::Forbidden);
    exactly_one_audit_record(&world, AccessDenialReason::ForbiddenClinic);
}

#[rstest]
#[case("clinic_manager", "clinic_admin")]
#[case("practitioner", "therapist")]
#[tokio::test]
async fn deprecated_roles_decide_like_their_canonical_role(
    principal: Principal,
    client: ClientInfo,
    #[case] deprecated: &str,
    #[case] canonical: &str,
) {
    let options = [
        AccessOptions::allow_roles([Role::ClinicAdmin]),
        AccessOptions::allow_roles([Role::Therapist, Role::Manager]),
        AccessOptions::default(),
    ];
    for option in options {
        let mut outcomes = Vec::new();
        for raw in [deprecated, canonical] {
            let world = a_user_scoped_to_a_single_clinic(&principal, raw);
            let request = AccessRequest::new(ENDPOINT, Some(CLINIC_ALLOW), client.clone())
                .with_options(option.clone());
            let outcome = world
                .guard
                .ensure_clinic_access(Some(&principal), request)
                .await
                .map(|grant| grant.permission.role)
                .map_err(|err| err.code());
            outcomes.push(outcome);
        }
        assert_eq!(outcomes[0], outcomes[1], "options {option:?}");
    }
}

#[rstest]
#[tokio::test]
async fn role_gate_and_scope_gate_are_independent(principal: Principal, client: ClientInfo) {
    // Role fails, clinic in scope.
    let world = a_user_scoped_to_a_single_clinic(&principal, "staff");
    let request = AccessRequest::new(ENDPOINT, Some(CLINIC_ALLOW), client.clone())
        .with_options(AccessOptions::allow_roles([Role::ClinicAdmin]));
    let err = world
        .guard
        .ensure_clinic_access(Some(&principal), request)
        .await
        .expect_err("role gate");
    assert_eq!(err.code(), ErrorCode::Forbidden);
    let role_record = exactly_one_audit_record(&world, AccessDenialReason::ForbiddenRole);

    // Role passes, clinic out of scope.
    let world = a_user_scoped_to_a_single_clinic(&principal, "clinic_admin");
    let request = AccessRequest::new(ENDPOINT, Some(CLINIC_DENY), client)
        .with_options(AccessOptions::allow_roles([Role::ClinicAdmin]));
    let err = world
        .guard
        .ensure_clinic_access(Some(&principal), request)
        .await
        .expect_err("scope gate");
    assert_eq!(err.code(), ErrorCode::Forbidden);
    let scope_record = exactly_one_audit_record(&world, AccessDenialReason::ForbiddenClinic);

    assert_ne!(role_record.reason.as_str(), scope_record.reason.as_str());
    assert_eq!(role_record.endpoint, ENDPOINT);
}

#[rstest]
#[tokio::test]
async fn headquarters_bypasses_role_allow_list(principal: Principal, client: ClientInfo) {
    let world = a_headquarters_administrator(principal.clone());
    let request = AccessRequest::new(ENDPOINT, Some(CLINIC_ALLOW), client)
        .with_options(AccessOptions::allow_roles([Role::ClinicAdmin]));

    assert!(
        world
            .guard
            .ensure_clinic_access(Some(&principal), request)
            .await
            .is_ok()
    );
}

#[rstest]
#[tokio::test]
async fn unrecognised_roles_never_match_allow_list(principal: Principal, client: ClientInfo) {
    let world = a_user_scoped_to_a_single_clinic(&principal, "receptionist");
    let request = AccessRequest::new(ENDPOINT, Some(CLINIC_ALLOW), client).with_options(
        AccessOptions::allow_roles([Role::Unrecognised("receptionist".to_owned())]),
    );

    let err = world
        .guard
        .ensure_clinic_access(Some(&principal), request)
        .await
        .expect_err("unrecognised role");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[case(None)]
#[case(Some("   "))]
#[tokio::test]
async fn forced_clinic_match_without_clinic_is_invalid_request(
    principal: Principal,
    client: ClientInfo,
    #[case] clinic_id: Option<&str>,
) {
    let world = a_user_scoped_to_a_single_clinic(&principal, "staff");
    let request = AccessRequest::new(ENDPOINT, clinic_id, client)
        .with_options(AccessOptions::default().with_clinic_match(true));

    let err = world
        .guard
        .ensure_clinic_access(Some(&principal), request)
        .await
        .expect_err("missing clinic");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    let details = err.details().expect("field details");
    assert!(details["fields"]["clinic_id"].is_string());
    no_audit_record_is_written(world.audit.records());
}

#[rstest]
#[case("clinic-deny")]
#[case(" not-a-uuid ")]
#[tokio::test]
async fn malformed_clinic_ids_are_audited_scope_violations(
    principal: Principal,
    client: ClientInfo,
    #[case] clinic_id: &str,
) {
    let world = a_user_scoped_to_a_single_clinic(&principal, "staff");

    let err = world
        .guard
        .ensure_clinic_access(
            Some(&principal),
            AccessRequest::new(ENDPOINT, Some(clinic_id), client),
        )
        .await
        .expect_err("malformed clinic");

    assert_eq!(err.code(), ErrorCode::Forbidden);
    let record = exactly_one_audit_record(&world, AccessDenialReason::ForbiddenClinic);
    assert_eq!(
        record.endpoint,
        format!("{ENDPOINT}?clinic_id={}", clinic_id.trim())
    );
}

#[rstest]
#[tokio::test]
async fn clinic_match_defaults_off_without_clinic(principal: Principal, client: ClientInfo) {
    let world = a_user_scoped_to_a_single_clinic(&principal, "staff");

    let grant = world
        .guard
        .ensure_clinic_access(Some(&principal), AccessRequest::new(ENDPOINT, None, client))
        .await
        .expect("no clinic requested");

    assert!(grant.clinic_id.is_none());
    assert_eq!(grant.clinic().expect_err("unchecked").code(), ErrorCode::InternalError);
}

#[rstest]
#[tokio::test]
async fn audit_failure_does_not_change_decision(principal: Principal, client: ClientInfo) {
    let mut permissions = MockPermissionRepository::new();
    permissions.expect_find_by_user().returning(|_| Ok(None));
    let mut audit = MockAuditLog::new();
    audit
        .expect_record()
        .times(1)
        .returning(|_| Err(AuditLogError::connection("audit sink offline")));
    let guard = ClinicAccessGuard::new(Arc::new(permissions), Arc::new(audit), Arc::new(FixtureClock));

    let err = guard
        .ensure_clinic_access(
            Some(&principal),
            AccessRequest::new(ENDPOINT, Some(CLINIC_ALLOW), client),
        )
        .await
        .expect_err("still denied");

    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn permission_lookup_failure_propagates_without_audit(
    principal: Principal,
    client: ClientInfo,
) {
    let mut permissions = MockPermissionRepository::new();
    permissions.expect_find_by_user().returning(|_| {
        Err(crate::domain::ports::PermissionRepositoryError::connection(
            "pool timed out",
        ))
    });
    let mut audit = MockAuditLog::new();
    audit.expect_record().times(0);
    let guard = ClinicAccessGuard::new(Arc::new(permissions), Arc::new(audit), Arc::new(FixtureClock));

    let err = guard
        .ensure_clinic_access(
            Some(&principal),
            AccessRequest::new(ENDPOINT, Some(CLINIC_ALLOW), client),
        )
        .await
        .expect_err("lookup failed");

    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}
