//! Multi-tenant clinic management backend.
//!
//! Layout follows a hexagonal split: `domain` holds types, services and
//! ports; `inbound::http` adapts Actix requests onto the domain; and
//! `outbound::persistence` implements the ports over PostgreSQL.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
