//! Typed request dispatch.
//!
//! Every use case is a [`Request`] type with exactly one [`RequestHandler`].
//! Handlers and validators are registered once on a [`DispatcherBuilder`];
//! [`DispatcherBuilder::build`] rejects duplicate or missing handlers at
//! startup, and the resulting [`Dispatcher`] is immutable.
//!
//! ```text
//! send(request, ctx)
//!   -> validators for the request type (all of them, findings merged)
//!   -> handler, raced against ctx cancellation
//! ```
//!
//! There are two ways to abandon a request. Dropping the future returned by
//! [`Dispatcher::send`] drops the handler and any store call it awaits; the
//! HTTP adapter relies on this, since actix drops a handler future when the
//! client disconnects, and so passes a plain [`RequestContext::new`]. Callers
//! that keep polling, such as background jobs or tests, cancel through the
//! context's [`CancellationToken`] instead and receive a
//! `service_unavailable` error.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info_span, warn};

use super::Error;
use super::validation::{ValidationErrors, Validator};

/// A typed use-case request.
pub trait Request: Send + Sync + 'static {
    /// Value returned by the handler on success.
    type Response: Send + 'static;

    /// Stable name used in logs and configuration errors.
    const NAME: &'static str;
}

/// Per-call context handed unchanged to the handler.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancellation: CancellationToken,
}

impl RequestContext {
    /// Context with a fresh, uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Context observing the caller's cancellation token.
    #[must_use]
    pub fn with_cancellation(cancellation: CancellationToken) -> Self {
        Self { cancellation }
    }

    /// Token that fires when the caller abandons the request.
    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Whether the caller has already abandoned the request.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

/// Executes one request type.
#[async_trait]
pub trait RequestHandler<R: Request>: Send + Sync {
    /// Perform the use case. Only reached once validation passes.
    async fn handle(&self, request: R, ctx: &RequestContext) -> Result<R::Response, Error>;
}

/// Startup wiring problems detected by [`DispatcherBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatcherConfigError {
    #[error("more than one handler registered for {request}")]
    DuplicateHandler { request: &'static str },
    #[error("no handler registered for {request}")]
    MissingHandler { request: &'static str },
    #[error("validator registered for {request} but no handler")]
    ValidatorWithoutHandler { request: &'static str },
}

struct Route<R: Request> {
    handler: Option<Arc<dyn RequestHandler<R>>>,
    validators: Vec<Arc<dyn Validator<R>>>,
}

impl<R: Request> Route<R> {
    fn empty() -> Self {
        Self {
            handler: None,
            validators: Vec::new(),
        }
    }

    fn validate(&self, request: &R) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        for validator in &self.validators {
            validator.validate(request, &mut errors);
        }
        errors
    }
}

struct Slot {
    name: &'static str,
    has_handler: bool,
    route: Box<dyn Any + Send + Sync>,
}

/// Collects handler and validator registrations.
#[derive(Default)]
pub struct DispatcherBuilder {
    slots: HashMap<TypeId, Slot>,
    expected: HashMap<TypeId, &'static str>,
    problems: Vec<DispatcherConfigError>,
}

impl DispatcherBuilder {
    /// Empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn route_mut<R: Request>(&mut self) -> Option<&mut Route<R>> {
        let slot = self.slots.entry(TypeId::of::<R>()).or_insert_with(|| Slot {
            name: R::NAME,
            has_handler: false,
            route: Box::new(Route::<R>::empty()),
        });
        slot.route.downcast_mut::<Route<R>>()
    }

    /// Register the handler for `R`. A second registration is recorded as a
    /// configuration error and reported by [`Self::build`].
    #[must_use]
    pub fn handler<R, H>(mut self, handler: H) -> Self
    where
        R: Request,
        H: RequestHandler<R> + 'static,
    {
        let handler: Arc<dyn RequestHandler<R>> = Arc::new(handler);
        let already_registered = self
            .slots
            .get(&TypeId::of::<R>())
            .is_some_and(|slot| slot.has_handler);
        if already_registered {
            self.problems
                .push(DispatcherConfigError::DuplicateHandler { request: R::NAME });
            return self;
        }
        if let Some(route) = self.route_mut::<R>() {
            route.handler = Some(handler);
        }
        if let Some(slot) = self.slots.get_mut(&TypeId::of::<R>()) {
            slot.has_handler = true;
        }
        self
    }

    /// Attach a validator to `R`. Validators run in registration order.
    #[must_use]
    pub fn validator<R, V>(mut self, validator: V) -> Self
    where
        R: Request,
        V: Validator<R> + 'static,
    {
        if let Some(route) = self.route_mut::<R>() {
            route.validators.push(Arc::new(validator));
        }
        self
    }

    /// Declare that `R` must have a handler once building completes.
    #[must_use]
    pub fn expect<R: Request>(mut self) -> Self {
        self.expected.insert(TypeId::of::<R>(), R::NAME);
        self
    }

    /// Freeze the registrations.
    ///
    /// # Errors
    /// Returns the first [`DispatcherConfigError`] found: duplicates first,
    /// then expected request types without a handler, then validators whose
    /// request type has no handler.
    pub fn build(self) -> Result<Dispatcher, DispatcherConfigError> {
        let Self {
            slots,
            expected,
            problems,
        } = self;
        if let Some(problem) = problems.into_iter().next() {
            return Err(problem);
        }

        let mut missing: Vec<&'static str> = expected
            .iter()
            .filter(|(type_id, _)| !slots.get(*type_id).is_some_and(|slot| slot.has_handler))
            .map(|(_, name)| *name)
            .collect();
        missing.sort_unstable();
        if let Some(request) = missing.into_iter().next() {
            return Err(DispatcherConfigError::MissingHandler { request });
        }

        let mut orphaned: Vec<&'static str> = slots
            .values()
            .filter(|slot| !slot.has_handler)
            .map(|slot| slot.name)
            .collect();
        orphaned.sort_unstable();
        if let Some(request) = orphaned.into_iter().next() {
            return Err(DispatcherConfigError::ValidatorWithoutHandler { request });
        }

        let routes = slots
            .into_iter()
            .map(|(type_id, slot)| (type_id, slot.route))
            .collect();
        Ok(Dispatcher { routes })
    }
}

/// Immutable request router shared by every inbound adapter.
pub struct Dispatcher {
    routes: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Dispatcher {
    /// Start a new registration.
    #[must_use]
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// Whether a handler is registered for `R`.
    #[must_use]
    pub fn handles<R: Request>(&self) -> bool {
        self.routes.contains_key(&TypeId::of::<R>())
    }

    /// Validate `request` and run its handler.
    ///
    /// Validation failures are returned as a single `invalid_request` error
    /// carrying every finding; the handler is not invoked. When the context's
    /// token fires first, the handler future is dropped and the caller gets a
    /// `service_unavailable` error.
    ///
    /// # Errors
    /// Propagates validation failures, handler errors, cancellation, and an
    /// internal error for request types that were never registered.
    pub async fn send<R: Request>(
        &self,
        request: R,
        ctx: &RequestContext,
    ) -> Result<R::Response, Error> {
        let route = self
            .routes
            .get(&TypeId::of::<R>())
            .and_then(|route| route.downcast_ref::<Route<R>>());
        let Some(route) = route else {
            error!(request = R::NAME, "no handler registered");
            return Err(Error::internal(format!("no handler registered for {}", R::NAME)));
        };
        let Some(handler) = route.handler.as_ref() else {
            error!(request = R::NAME, "route built without a handler");
            return Err(Error::internal(format!("no handler registered for {}", R::NAME)));
        };

        let span = info_span!("dispatch", request = R::NAME);
        async move {
            let findings = route.validate(&request);
            if !findings.is_empty() {
                debug!(violations = findings.len(), "request failed validation");
                return Err(findings.into_error());
            }

            tokio::select! {
                biased;
                () = ctx.cancellation().cancelled() => {
                    warn!("request cancelled by caller");
                    Err(Error::service_unavailable("request cancelled"))
                }
                result = handler.handle(request, ctx) => result,
            }
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests;
