//! Shared harness for HTTP integration suites.
//!
//! Builds the full route table over an [`InMemoryStore`], seeds a small
//! two-clinic tenancy and logs users in through the real login handler.

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{App, test as actix_test, web};
use chrono::{NaiveDate, TimeZone, Utc};
use mockable::Clock;
use serde_json::json;

use clinic_backend::Trace;
use clinic_backend::domain::{
    Clinic, ClinicId, Patient, PatientId, Role, Staff, StaffId, UserId, UserPermission, Visit,
    VisitId,
};
use clinic_backend::inbound::http::routes;
use clinic_backend::inbound::http::state::HttpState;
use clinic_backend::test_support::{Account, InMemoryStore};

pub const HQ_CLINIC: &str = "7d1f6f5e-0000-4000-8000-000000000001";
pub const SHIBUYA_CLINIC: &str = "7d1f6f5e-0000-4000-8000-000000000002";
pub const SHINJUKU_CLINIC: &str = "7d1f6f5e-0000-4000-8000-000000000003";
pub const PASSWORD: &str = "correct horse battery";

pub fn clinic(raw: &str) -> ClinicId {
    ClinicId::new(raw).expect("fixture clinic id")
}

/// Store seeded with three clinics and no users.
pub fn seeded_store() -> InMemoryStore {
    let store = InMemoryStore::default();
    store.write(|tables| {
        tables.clinics.push(Clinic {
            id: clinic(HQ_CLINIC),
            name: "本部".to_owned(),
            parent_id: None,
            is_active: true,
        });
        for (raw, name) in [(SHIBUYA_CLINIC, "渋谷院"), (SHINJUKU_CLINIC, "新宿院")] {
            tables.clinics.push(Clinic {
                id: clinic(raw),
                name: name.to_owned(),
                parent_id: Some(clinic(HQ_CLINIC)),
                is_active: true,
            });
        }
    });
    store
}

/// Register a login account with the given raw role and scope.
pub fn add_user(
    store: &InMemoryStore,
    email: &str,
    raw_role: &str,
    home: Option<&str>,
    scope: Option<&[&str]>,
) -> UserId {
    let user_id = UserId::random();
    store.write(|tables| {
        tables.accounts.push(Account {
            email: email.to_owned(),
            password: PASSWORD.to_owned(),
            user_id,
        });
        tables.permissions.push(UserPermission::from_raw_role(
            user_id,
            raw_role,
            home.map(clinic),
            scope.map(|ids| ids.iter().copied().map(clinic).collect()),
        ));
    });
    user_id
}

pub fn add_patient(store: &InMemoryStore, clinic_raw: &str, name: &str) -> PatientId {
    let id = PatientId::random();
    let created_at = store.clock().utc();
    store.write(|tables| {
        tables.patients.push(Patient {
            id,
            clinic_id: clinic(clinic_raw),
            name: name.to_owned(),
            name_kana: None,
            phone: None,
            email: None,
            birth_date: None,
            gender: None,
            notes: None,
            created_at,
        });
    });
    id
}

pub fn add_staff(store: &InMemoryStore, clinic_raw: &str, name: &str) -> StaffId {
    let id = StaffId::random();
    store.write(|tables| {
        tables.staff.push(Staff {
            id,
            clinic_id: clinic(clinic_raw),
            name: name.to_owned(),
            role: Role::Therapist,
            is_active: true,
        });
    });
    id
}

pub fn add_visit(
    store: &InMemoryStore,
    clinic_raw: &str,
    patient_id: PatientId,
    staff_id: Option<StaffId>,
    date: NaiveDate,
    revenue: i64,
) {
    let created_at = Utc
        .from_local_datetime(&date.and_hms_opt(10, 0, 0).expect("time"))
        .single()
        .expect("utc instant");
    store.write(|tables| {
        tables.visits.push(Visit {
            id: VisitId::random(),
            clinic_id: clinic(clinic_raw),
            patient_id,
            staff_id,
            visit_date: date,
            treatment_menu: Some("整体60分".to_owned()),
            revenue,
            created_at,
        });
    });
}

/// Full application over `store`, as served in production minus Swagger.
pub async fn init_app(
    store: &InMemoryStore,
) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error> {
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build();
    actix_test::init_service(
        App::new()
            .app_data(web::Data::new(HttpState::new(store.ports())))
            .wrap(session)
            .wrap(Trace)
            .configure(routes::configure),
    )
    .await
}

/// Log in through `POST /api/auth/login` and return the session cookie.
pub async fn login<S>(app: &S, email: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let response = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({"email": email, "password": PASSWORD}))
            .to_request(),
    )
    .await;
    assert!(response.status().is_success(), "login failed: {}", response.status());
    response
        .response()
        .cookies()
        .find(|c| c.name() == "session")
        .expect("session cookie")
        .into_owned()
}
