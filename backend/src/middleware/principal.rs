//! Middleware establishing the request principal from session claims.
//!
//! Runs inside the session middleware. Every request is served within a
//! [`Principal::scope`], so domain handlers resolving the caller through
//! [`crate::domain::UserContext`] see either the signed-in user or
//! [`Principal::Anonymous`], never a missing scope.

use std::task::{Context, Poll};

use actix_session::SessionExt;
use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::warn;

use crate::domain::Principal;
use crate::inbound::http::session::SessionContext;

/// Wraps each request in a principal scope built from the session cookie.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrincipalScope;

impl<S, B> Transform<S, ServiceRequest> for PrincipalScope
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = PrincipalScopeMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(PrincipalScopeMiddleware { service }))
    }
}

/// Service wrapper produced by [`PrincipalScope`].
pub struct PrincipalScopeMiddleware<S> {
    service: S,
}

fn principal_for(req: &ServiceRequest) -> Principal {
    match SessionContext::new(req.get_session()).current_user() {
        Ok(Some(user)) => Principal::Authenticated(user),
        Ok(None) => Principal::Anonymous,
        Err(error) => {
            warn!(%error, "ignoring unreadable session claims");
            Principal::Anonymous
        }
    }
}

impl<S, B> Service<ServiceRequest> for PrincipalScopeMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let principal = principal_for(&req);
        let fut = self.service.call(req);
        Box::pin(principal.scope(fut))
    }
}
