//! Session authentication handlers.
//!
//! ```text
//! POST /api/auth/login {"email":"reception@example.jp","password":"..."}
//! POST /api/auth/logout
//! GET  /api/auth/me
//! ```

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{
    AccessOptions, ApiResult, Error, LoginCredentials, LoginValidationError, UserPermission,
};
use crate::inbound::http::access::process_api_request;
use crate::inbound::http::envelope::{ApiResponse, ok};
use crate::inbound::http::schemas::ErrorEnvelopeSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::field_error;

/// Login request body for `POST /api/auth/login`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

/// Authenticated principal and its normalised permission record.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    #[schema(format = "uuid")]
    pub user_id: String,
    pub email: Option<String>,
    /// Canonical role name, e.g. `clinic_admin`.
    pub role: String,
    #[schema(format = "uuid")]
    pub clinic_id: Option<String>,
    #[schema(value_type = Vec<uuid::Uuid>)]
    pub clinic_scope_ids: Vec<String>,
    pub is_headquarters: bool,
}

impl MeResponse {
    fn new(email: Option<String>, permission: &UserPermission) -> Self {
        Self {
            user_id: permission.user_id.to_string(),
            email,
            role: permission.role.as_str().to_owned(),
            clinic_id: permission.clinic_id.map(|id| id.to_string()),
            clinic_scope_ids: permission
                .scope()
                .clinic_ids()
                .iter()
                .map(ToString::to_string)
                .collect(),
            is_headquarters: permission.role.is_headquarters(),
        }
    }
}

/// Session identity returned after login.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[schema(format = "uuid")]
    pub user_id: String,
    pub email: Option<String>,
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    let field = match err {
        LoginValidationError::EmptyEmail | LoginValidationError::InvalidEmail => "email",
        LoginValidationError::EmptyPassword => "password",
    };
    field_error(field, err.to_string())
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = ApiResponse<LoginResponse>,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorEnvelopeSchema),
        (status = 401, description = "Invalid credentials", body = ErrorEnvelopeSchema),
        (status = 503, description = "Database unavailable", body = ErrorEnvelopeSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let principal = state.login.authenticate(&credentials).await?;
    session.persist_principal(&principal)?;
    info!(user_id = %principal.id, "login succeeded");
    Ok(ok(LoginResponse {
        user_id: principal.id.to_string(),
        email: principal.email,
    }))
}

/// Drop the session cookie.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 200, description = "Session cleared")),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    ok(serde_json::Value::Null)
}

/// The caller's identity and normalised permission.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current principal", body = ApiResponse<MeResponse>),
        (status = 401, description = "Not logged in", body = ErrorEnvelopeSchema),
        (status = 403, description = "No permission record", body = ErrorEnvelopeSchema)
    ),
    tags = ["auth"],
    operation_id = "me"
)]
#[get("/auth/me")]
pub async fn me(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let grant = process_api_request(
        &req,
        &session,
        &state,
        "/api/auth/me",
        None,
        AccessOptions::default(),
    )
    .await?;
    Ok(ok(MeResponse::new(grant.principal.email, &grant.permission)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Role, UserId};
    use crate::test_support::{Account, InMemoryStore};
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::{Value, json};

    const PASSWORD: &str = "correct horse";

    fn store_with_account() -> (InMemoryStore, UserId) {
        let store = InMemoryStore::default();
        let user_id = UserId::random();
        store.write(|tables| {
            tables.accounts.push(Account {
                email: "reception@example.jp".to_owned(),
                password: PASSWORD.to_owned(),
                user_id,
            });
            tables.permissions.push(UserPermission::from_raw_role(
                user_id,
                "clinic_manager",
                None,
                None,
            ));
        });
        (store, user_id)
    }

    fn test_app(
        store: &InMemoryStore,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(web::Data::new(HttpState::new(store.ports())))
            .wrap(crate::inbound::http::test_utils::test_session_middleware())
            .service(
                web::scope("/api")
                    .service(login)
                    .service(logout)
                    .service(me),
            )
    }

    #[rstest]
    #[case(json!({"email": "  ", "password": "x"}), "email")]
    #[case(json!({"email": "nobody", "password": "x"}), "email")]
    #[case(json!({"email": "a@b.jp", "password": ""}), "password")]
    #[actix_web::test]
    async fn login_rejects_malformed_credentials(#[case] body: Value, #[case] field: &str) {
        let (store, _) = store_with_account();
        let app = actix_test::init_service(test_app(&store)).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/auth/login")
                .set_json(body)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let value: Value = actix_test::read_body_json(response).await;
        assert_eq!(value["success"], false);
        assert!(value["error"]["details"]["fields"][field].is_string());
    }

    #[actix_web::test]
    async fn login_rejects_wrong_password() {
        let (store, _) = store_with_account();
        let app = actix_test::init_service(test_app(&store)).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/auth/login")
                .set_json(json!({"email": "reception@example.jp", "password": "nope"}))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn me_reports_normalised_role_after_login() {
        let (store, user_id) = store_with_account();
        let app = actix_test::init_service(test_app(&store)).await;
        let login_res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/auth/login")
                .set_json(json!({"email": "Reception@Example.jp", "password": PASSWORD}))
                .to_request(),
        )
        .await;
        assert_eq!(login_res.status(), StatusCode::OK);
        let cookie = login_res
            .response()
            .cookies()
            .find(|c| c.name() == "session")
            .expect("session cookie")
            .into_owned();

        let me_res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/auth/me")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(me_res.status(), StatusCode::OK);
        let value: Value = actix_test::read_body_json(me_res).await;
        assert_eq!(value["data"]["userId"], user_id.to_string());
        assert_eq!(value["data"]["role"], Role::ClinicAdmin.as_str());
        assert_eq!(value["data"]["isHeadquarters"], false);
    }

    #[actix_web::test]
    async fn me_without_session_is_audited() {
        let (store, _) = store_with_account();
        let app = actix_test::init_service(test_app(&store)).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/auth/me").to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let records = store.audit_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].endpoint, "/api/auth/me");
    }
}
