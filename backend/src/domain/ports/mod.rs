//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod dish_repository;
mod identity_store;
mod restaurant_repository;

#[cfg(test)]
pub use dish_repository::MockDishRepository;
pub use dish_repository::{DishRepository, DishRepositoryError};
#[cfg(test)]
pub use identity_store::MockIdentityStore;
pub use identity_store::{IdentityStore, IdentityStoreError};
#[cfg(test)]
pub use restaurant_repository::MockRestaurantRepository;
pub use restaurant_repository::{
    DeleteOutcome, FixtureRestaurantRepository, RestaurantRepository, RestaurantRepositoryError,
    UpdateOutcome,
};
