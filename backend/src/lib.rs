//! N-th prime lookup service.
//!
//! The [`domain`] layer holds the segmented sieve and the lookup port; the
//! [`inbound`] layer exposes it over HTTP.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
