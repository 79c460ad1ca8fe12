//! Port for dish persistence.
//!
//! Unlike restaurant lookups, [`DishRepository::get_by_id`] treats absence as
//! an error: callers addressing a dish always expect it to exist.

use async_trait::async_trait;

use crate::domain::{Dish, DishId, NewDish, RestaurantId};

use super::{DeleteOutcome, UpdateOutcome, define_port_error};

define_port_error! {
    /// Errors raised by dish repository adapters.
    pub enum DishRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "dish repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "dish repository query failed: {message}",
        /// The owning restaurant does not exist.
        RestaurantNotFound { restaurant_id: RestaurantId } =>
            "restaurant {restaurant_id} does not exist",
        /// No dish with the requested id exists.
        NotFound { dish_id: DishId } =>
            "dish {dish_id} does not exist",
    }
}

/// Persistence gateway for dishes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DishRepository: Send + Sync {
    /// Insert a dish under an existing restaurant.
    async fn create(&self, dish: &NewDish) -> Result<DishId, DishRepositoryError>;

    /// Dishes owned by `restaurant_id`; empty when there are none.
    async fn list_for_restaurant(
        &self,
        restaurant_id: &RestaurantId,
    ) -> Result<Vec<Dish>, DishRepositoryError>;

    /// One dish, or [`DishRepositoryError::NotFound`].
    async fn get_by_id(&self, id: &DishId) -> Result<Dish, DishRepositoryError>;

    /// Replace the mutable fields of the dish identified by `dish.id` and
    /// `dish.restaurant_id`.
    async fn update(&self, dish: &Dish) -> Result<UpdateOutcome, DishRepositoryError>;

    /// Remove the dish if it belongs to `restaurant_id`.
    async fn delete(
        &self,
        restaurant_id: &RestaurantId,
        id: &DishId,
    ) -> Result<DeleteOutcome, DishRepositoryError>;
}
