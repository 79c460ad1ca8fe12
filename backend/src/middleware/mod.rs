//! Request middleware.
//!
//! Purpose: Define middleware components for request lifecycle concerns such as
//! tracing and caller identification.

pub mod principal;
pub mod trace;

pub use principal::PrincipalScope;
pub use trace::Trace;
