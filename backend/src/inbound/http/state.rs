//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on the domain dispatcher and remain testable without I/O.

use std::sync::Arc;

use crate::domain::Dispatcher;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub dispatcher: Arc<Dispatcher>,
}

impl HttpState {
    /// Construct state around a fully wired dispatcher.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use restaurants::domain::{AmbientUserContext, DomainPorts, build_dispatcher};
    /// use restaurants::inbound::http::state::HttpState;
    /// use restaurants::outbound::memory::InMemoryStore;
    ///
    /// let store = Arc::new(InMemoryStore::new());
    /// let dispatcher = build_dispatcher(DomainPorts {
    ///     restaurants: store.clone(),
    ///     dishes: store.clone(),
    ///     identity: store,
    ///     user_context: Arc::new(AmbientUserContext),
    /// })
    /// .expect("consistent wiring");
    /// let state = HttpState::new(Arc::new(dispatcher));
    /// let _dispatcher = state.dispatcher.clone();
    /// ```
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}
