//! Dish use cases. Every request addresses dishes through their owning
//! restaurant, and a dish never moves between restaurants.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::dispatch::{DispatcherBuilder, Request, RequestContext, RequestHandler};
use super::ports::{DeleteOutcome, DishRepository, DishRepositoryError, UpdateOutcome};
use super::validation::{ValidationErrors, Validator, rules};
use super::{Dish, DishDraft, DishId, Error, NewDish, RestaurantId};

const NAME_MIN: usize = 3;
const NAME_MAX: usize = 100;

/// Add a dish to an existing restaurant.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateDish {
    pub restaurant_id: RestaurantId,
    pub dish: DishDraft,
}

impl Request for CreateDish {
    type Response = DishId;
    const NAME: &'static str = "CreateDish";
}

/// Fetch one dish of a restaurant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetDish {
    pub restaurant_id: RestaurantId,
    pub id: DishId,
}

impl Request for GetDish {
    type Response = Dish;
    const NAME: &'static str = "GetDish";
}

/// List the dishes of a restaurant. Unknown restaurants yield an empty list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetDishes {
    pub restaurant_id: RestaurantId,
}

impl Request for GetDishes {
    type Response = Vec<Dish>;
    const NAME: &'static str = "GetDishes";
}

/// Replace the mutable fields of a dish.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateDish {
    pub restaurant_id: RestaurantId,
    pub id: DishId,
    pub dish: DishDraft,
}

impl Request for UpdateDish {
    type Response = UpdateOutcome;
    const NAME: &'static str = "UpdateDish";
}

/// Remove one dish of a restaurant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteDish {
    pub restaurant_id: RestaurantId,
    pub id: DishId,
}

impl Request for DeleteDish {
    type Response = DeleteOutcome;
    const NAME: &'static str = "DeleteDish";
}

/// Field rules shared by dish creation, replacement, and nested dishes of a
/// new restaurant.
pub fn validate_dish_draft(dish: &DishDraft, errors: &mut ValidationErrors) {
    rules::check(
        errors,
        "name",
        [
            rules::not_empty(&dish.name),
            rules::length(&dish.name, NAME_MIN, NAME_MAX),
        ],
    );
    rules::check(errors, "price", [rules::positive_price(dish.price)]);
    if let Some(kilo_calories) = dish.kilo_calories {
        rules::check(errors, "kiloCalories", [rules::positive(kilo_calories)]);
    }
}

/// Field rules for [`CreateDish`].
#[derive(Debug, Default, Clone, Copy)]
pub struct CreateDishValidator;

impl Validator<CreateDish> for CreateDishValidator {
    fn validate(&self, request: &CreateDish, errors: &mut ValidationErrors) {
        validate_dish_draft(&request.dish, errors);
    }
}

/// Field rules for [`UpdateDish`].
#[derive(Debug, Default, Clone, Copy)]
pub struct UpdateDishValidator;

impl Validator<UpdateDish> for UpdateDishValidator {
    fn validate(&self, request: &UpdateDish, errors: &mut ValidationErrors) {
        validate_dish_draft(&request.dish, errors);
    }
}

fn map_dish_error(error: DishRepositoryError) -> Error {
    match error {
        DishRepositoryError::Connection { message } => {
            warn!(%message, "dish store unavailable");
            Error::service_unavailable("dish store unavailable")
        }
        DishRepositoryError::Query { message } => {
            Error::internal(format!("dish store error: {message}"))
        }
        DishRepositoryError::RestaurantNotFound { restaurant_id } => {
            let mut errors = ValidationErrors::new();
            errors.push(
                "restaurantId",
                format!("restaurant {restaurant_id} does not exist"),
            );
            errors.into_error()
        }
        DishRepositoryError::NotFound { dish_id } => {
            Error::not_found(format!("dish {dish_id} not found"))
        }
    }
}

/// Handles every dish request against one repository.
#[derive(Clone)]
pub struct DishHandlers {
    repository: Arc<dyn DishRepository>,
}

impl DishHandlers {
    /// Create handlers backed by `repository`.
    pub fn new(repository: Arc<dyn DishRepository>) -> Self {
        Self { repository }
    }

    /// Register handlers and validators for the dish requests.
    #[must_use]
    pub fn register(self, builder: DispatcherBuilder) -> DispatcherBuilder {
        builder
            .handler::<CreateDish, _>(self.clone())
            .validator::<CreateDish, _>(CreateDishValidator)
            .handler::<GetDish, _>(self.clone())
            .handler::<GetDishes, _>(self.clone())
            .handler::<UpdateDish, _>(self.clone())
            .validator::<UpdateDish, _>(UpdateDishValidator)
            .handler::<DeleteDish, _>(self)
            .expect::<CreateDish>()
            .expect::<GetDish>()
            .expect::<GetDishes>()
            .expect::<UpdateDish>()
            .expect::<DeleteDish>()
    }
}

#[async_trait]
impl RequestHandler<CreateDish> for DishHandlers {
    async fn handle(&self, request: CreateDish, _ctx: &RequestContext) -> Result<DishId, Error> {
        info!(restaurant_id = %request.restaurant_id, "creating dish");
        let new = NewDish {
            restaurant_id: request.restaurant_id,
            dish: request.dish,
        };
        self.repository.create(&new).await.map_err(map_dish_error)
    }
}

#[async_trait]
impl RequestHandler<GetDish> for DishHandlers {
    async fn handle(&self, request: GetDish, _ctx: &RequestContext) -> Result<Dish, Error> {
        info!(restaurant_id = %request.restaurant_id, id = %request.id, "fetching dish");
        let dish = self
            .repository
            .get_by_id(&request.id)
            .await
            .map_err(map_dish_error)?;
        if dish.restaurant_id != request.restaurant_id {
            return Err(map_dish_error(DishRepositoryError::not_found(request.id)));
        }
        Ok(dish)
    }
}

#[async_trait]
impl RequestHandler<GetDishes> for DishHandlers {
    async fn handle(&self, request: GetDishes, _ctx: &RequestContext) -> Result<Vec<Dish>, Error> {
        info!(restaurant_id = %request.restaurant_id, "listing dishes");
        self.repository
            .list_for_restaurant(&request.restaurant_id)
            .await
            .map_err(map_dish_error)
    }
}

#[async_trait]
impl RequestHandler<UpdateDish> for DishHandlers {
    async fn handle(
        &self,
        request: UpdateDish,
        _ctx: &RequestContext,
    ) -> Result<UpdateOutcome, Error> {
        info!(restaurant_id = %request.restaurant_id, id = %request.id, "updating dish");
        let dish = Dish::from_draft(request.id, request.restaurant_id, request.dish);
        let outcome = self
            .repository
            .update(&dish)
            .await
            .map_err(map_dish_error)?;
        if outcome == UpdateOutcome::NotFound {
            warn!(id = %request.id, "dish missing under restaurant");
        }
        Ok(outcome)
    }
}

#[async_trait]
impl RequestHandler<DeleteDish> for DishHandlers {
    async fn handle(
        &self,
        request: DeleteDish,
        _ctx: &RequestContext,
    ) -> Result<DeleteOutcome, Error> {
        info!(restaurant_id = %request.restaurant_id, id = %request.id, "deleting dish");
        self.repository
            .delete(&request.restaurant_id, &request.id)
            .await
            .map_err(map_dish_error)
    }
}
