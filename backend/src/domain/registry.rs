//! Startup wiring of every request handler into one [`Dispatcher`].

use std::sync::Arc;

use super::dish_requests::DishHandlers;
use super::dispatch::{Dispatcher, DispatcherConfigError};
use super::identity_requests::IdentityHandlers;
use super::ports::{DishRepository, IdentityStore, RestaurantRepository};
use super::restaurant_requests::RestaurantHandlers;
use super::UserContext;

/// Driven ports the request handlers depend on.
#[derive(Clone)]
pub struct DomainPorts {
    pub restaurants: Arc<dyn RestaurantRepository>,
    pub dishes: Arc<dyn DishRepository>,
    pub identity: Arc<dyn IdentityStore>,
    pub user_context: Arc<dyn UserContext>,
}

/// Register every handler and validator and freeze the result.
///
/// # Errors
/// Returns [`DispatcherConfigError`] when registrations are inconsistent.
pub fn build_dispatcher(ports: DomainPorts) -> Result<Dispatcher, DispatcherConfigError> {
    let DomainPorts {
        restaurants,
        dishes,
        identity,
        user_context,
    } = ports;
    let builder = Dispatcher::builder();
    let builder = RestaurantHandlers::new(restaurants).register(builder);
    let builder = DishHandlers::new(dishes).register(builder);
    let builder = IdentityHandlers::new(identity, user_context).register(builder);
    builder.build()
}
