//! Product launch board backend.
//!
//! Hexagonal layout: `domain` holds services and ports, `inbound::http`
//! exposes them over Actix, and `outbound` implements the ports against
//! PostgreSQL, the payment provider, and the mail API.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
