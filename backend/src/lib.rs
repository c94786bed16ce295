//! Forum backend library: domain model, ports, adapters, and HTTP surface.
//!
//! The binary in `main.rs` wires these modules into an Actix server; the
//! in-memory adapters in [`test_support`] back unit and integration tests.

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
