//! Success envelope shared by every API endpoint.
//!
//! Successful responses are wrapped as `{"success": true, "data": T}`;
//! failures use the error envelope from [`super::error`].

use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::cache_control::private_no_store_header;

/// Success envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Always `true` for this shape.
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// `200 OK` with `data` wrapped in the success envelope.
pub fn ok<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header(private_no_store_header())
        .json(ApiResponse::new(data))
}

/// `201 Created` with `data` wrapped in the success envelope.
pub fn created<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Created()
        .insert_header(private_no_store_header())
        .json(ApiResponse::new(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use actix_web::http::StatusCode;
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn wraps_data_with_success_flag() {
        let response = created(json!({"id": 7}));
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response
                .headers()
                .get("Cache-Control")
                .and_then(|v| v.to_str().ok()),
            Some("private, no-store")
        );
        let bytes = to_bytes(response.into_body()).await.expect("body");
        let value: Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(value, json!({"success": true, "data": {"id": 7}}));
    }
}
