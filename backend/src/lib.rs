//! Restaurant catalogue backend.
//!
//! Domain requests flow through a [`domain::Dispatcher`] that validates them
//! and routes them to handlers backed by repository ports. The HTTP adapter
//! under [`inbound::http`] and the storage adapters under [`outbound`] sit at
//! the edges.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::{PrincipalScope, Trace};
