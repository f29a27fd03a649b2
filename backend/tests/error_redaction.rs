//! Availability failures reach clients as a generic message with a trace id.

#[path = "support/harness.rs"]
mod harness;

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use serde_json::Value;

use clinic_backend::inbound::http::error::SERVICE_UNAVAILABLE_MESSAGE;

use harness::{SHIBUYA_CLINIC, add_user, init_app, login, seeded_store};

#[actix_web::test]
async fn database_outage_is_503_with_redacted_message_and_trace_id() {
    let store = seeded_store();
    add_user(
        &store,
        "reception@shibuya.example.jp",
        "staff",
        Some(SHIBUYA_CLINIC),
        None,
    );
    let app = init_app(&store).await;
    let cookie = login(&app, "reception@shibuya.example.jp").await;
    store.write(|tables| tables.database_unavailable = true);

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/patients?clinic_id={SHIBUYA_CLINIC}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let header = response
        .headers()
        .get("trace-id")
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .expect("trace-id header");
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "service_unavailable");
    assert_eq!(body["error"]["message"], SERVICE_UNAVAILABLE_MESSAGE);
    assert_eq!(body["error"]["traceId"], header);
    assert!(store.audit_records().is_empty());
}

#[actix_web::test]
async fn successful_responses_are_not_cacheable() {
    let store = seeded_store();
    add_user(
        &store,
        "reception@shibuya.example.jp",
        "staff",
        Some(SHIBUYA_CLINIC),
        None,
    );
    let app = init_app(&store).await;
    let cookie = login(&app, "reception@shibuya.example.jp").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/staff?clinic_id={SHIBUYA_CLINIC}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("cache-control")
            .and_then(|v| v.to_str().ok()),
        Some("private, no-store")
    );
}
