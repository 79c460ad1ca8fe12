//! Shared fixtures for the HTTP adapter tests.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::web;

use crate::domain::{AmbientUserContext, DomainPorts, build_dispatcher};
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::InMemoryStore;

/// Cookie session layer with a throwaway key and no `Secure` flag, so plain
/// HTTP test requests carry the cookie back.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Handler state whose every port is served by `store`.
pub fn in_memory_state(store: &InMemoryStore) -> web::Data<HttpState> {
    let dispatcher = build_dispatcher(DomainPorts {
        restaurants: Arc::new(store.clone()),
        dishes: Arc::new(store.clone()),
        identity: Arc::new(store.clone()),
        user_context: Arc::new(AmbientUserContext),
    })
    .expect("handler wiring is consistent");
    web::Data::new(HttpState::new(Arc::new(dispatcher)))
}
