//! Restaurant use cases: requests, their validators, and handlers.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::dish_requests::validate_dish_draft;
use super::dispatch::{DispatcherBuilder, Request, RequestContext, RequestHandler};
use super::ports::{
    DeleteOutcome, RestaurantRepository, RestaurantRepositoryError, UpdateOutcome,
};
use super::validation::{ValidationErrors, Validator, rules};
use super::{
    Address, DishDraft, Error, NewRestaurant, Restaurant, RestaurantId, RestaurantUpdate,
    normalise_contact,
};

const NAME_MIN: usize = 3;
const NAME_MAX: usize = 100;
const CATEGORY_MIN: usize = 3;
const CATEGORY_MAX: usize = 50;
const ADDRESS_LINE_MIN: usize = 3;
const ADDRESS_LINE_MAX: usize = 100;
const COUNTRY_MAX: usize = 100;
const EMAIL_MAX: usize = 320;
const PHONE_MAX: usize = 32;

/// Create a restaurant, optionally with its initial dishes.
///
/// Empty contact email or phone means "no contact" and passes validation.
/// An empty category is stored as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateRestaurant {
    pub name: String,
    pub description: String,
    pub category: String,
    pub has_delivery: bool,
    pub contact_email: String,
    pub contact_phone: String,
    pub address: Option<Address>,
    pub dishes: Vec<DishDraft>,
}

impl Request for CreateRestaurant {
    type Response = RestaurantId;
    const NAME: &'static str = "CreateRestaurant";
}

/// Fetch one restaurant; absence is a normal outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetRestaurant {
    pub id: RestaurantId,
}

impl Request for GetRestaurant {
    type Response = Option<Restaurant>;
    const NAME: &'static str = "GetRestaurant";
}

/// Fetch every restaurant with its dishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetAllRestaurants;

impl Request for GetAllRestaurants {
    type Response = Vec<Restaurant>;
    const NAME: &'static str = "GetAllRestaurants";
}

/// Sparse update. `None` leaves a field unchanged; an empty contact string
/// clears it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRestaurant {
    pub id: RestaurantId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub has_delivery: Option<bool>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

impl UpdateRestaurant {
    /// An update for `id` that changes nothing.
    #[must_use]
    pub fn for_id(id: RestaurantId) -> Self {
        Self {
            id,
            name: None,
            description: None,
            category: None,
            has_delivery: None,
            contact_email: None,
            contact_phone: None,
        }
    }
}

impl Request for UpdateRestaurant {
    type Response = UpdateOutcome;
    const NAME: &'static str = "UpdateRestaurant";
}

/// Remove a restaurant and, through it, all of its dishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteRestaurant {
    pub id: RestaurantId,
}

impl Request for DeleteRestaurant {
    type Response = DeleteOutcome;
    const NAME: &'static str = "DeleteRestaurant";
}

fn validate_contact(errors: &mut ValidationErrors, email: &str, phone: &str) {
    let trimmed_email = email.trim();
    if !trimmed_email.is_empty() {
        rules::check(
            errors,
            "contactEmail",
            [
                rules::email(trimmed_email),
                rules::max_length(trimmed_email, EMAIL_MAX),
            ],
        );
    }
    let trimmed_phone = phone.trim();
    if !trimmed_phone.is_empty() {
        rules::check(
            errors,
            "contactPhone",
            [
                rules::phone(trimmed_phone),
                rules::max_length(trimmed_phone, PHONE_MAX),
            ],
        );
    }
}

fn validate_address(address: &Address) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    rules::check(
        &mut errors,
        "street",
        [rules::length(&address.street, ADDRESS_LINE_MIN, ADDRESS_LINE_MAX)],
    );
    rules::check(
        &mut errors,
        "city",
        [rules::length(&address.city, ADDRESS_LINE_MIN, ADDRESS_LINE_MAX)],
    );
    rules::check(&mut errors, "zipCode", [rules::zip_code(&address.zip_code)]);
    rules::check(
        &mut errors,
        "country",
        [rules::max_length(&address.country, COUNTRY_MAX)],
    );
    errors
}

/// Field rules for [`CreateRestaurant`].
#[derive(Debug, Default, Clone, Copy)]
pub struct CreateRestaurantValidator;

impl Validator<CreateRestaurant> for CreateRestaurantValidator {
    fn validate(&self, request: &CreateRestaurant, errors: &mut ValidationErrors) {
        rules::check(
            errors,
            "name",
            [
                rules::not_empty(&request.name),
                rules::length(&request.name, NAME_MIN, NAME_MAX),
            ],
        );
        if !request.category.is_empty() {
            rules::check(
                errors,
                "category",
                [rules::length(&request.category, CATEGORY_MIN, CATEGORY_MAX)],
            );
        }
        validate_contact(errors, &request.contact_email, &request.contact_phone);
        if let Some(address) = &request.address {
            errors.extend_nested("address", validate_address(address));
        }
        for (index, dish) in request.dishes.iter().enumerate() {
            let mut nested = ValidationErrors::new();
            validate_dish_draft(dish, &mut nested);
            errors.extend_nested(&format!("dishes[{index}]"), nested);
        }
    }
}

/// Field rules for [`UpdateRestaurant`]; only supplied fields are checked.
#[derive(Debug, Default, Clone, Copy)]
pub struct UpdateRestaurantValidator;

impl Validator<UpdateRestaurant> for UpdateRestaurantValidator {
    fn validate(&self, request: &UpdateRestaurant, errors: &mut ValidationErrors) {
        if let Some(name) = &request.name {
            rules::check(errors, "name", [rules::length(name, NAME_MIN, NAME_MAX)]);
        }
        if let Some(category) = &request.category {
            rules::check(
                errors,
                "category",
                [rules::length(category, CATEGORY_MIN, CATEGORY_MAX)],
            );
        }
        validate_contact(
            errors,
            request.contact_email.as_deref().unwrap_or_default(),
            request.contact_phone.as_deref().unwrap_or_default(),
        );
    }
}

/// Map repository failures to domain errors, logging the detail.
pub(crate) fn map_restaurant_error(error: RestaurantRepositoryError) -> Error {
    match error {
        RestaurantRepositoryError::Connection { message } => {
            warn!(%message, "restaurant store unavailable");
            Error::service_unavailable("restaurant store unavailable")
        }
        RestaurantRepositoryError::Query { message } => {
            Error::internal(format!("restaurant store error: {message}"))
        }
    }
}

/// Handles every restaurant request against one repository.
#[derive(Clone)]
pub struct RestaurantHandlers {
    repository: Arc<dyn RestaurantRepository>,
}

impl RestaurantHandlers {
    /// Create handlers backed by `repository`.
    pub fn new(repository: Arc<dyn RestaurantRepository>) -> Self {
        Self { repository }
    }

    /// Register handlers and validators for the restaurant requests.
    #[must_use]
    pub fn register(self, builder: DispatcherBuilder) -> DispatcherBuilder {
        builder
            .handler::<CreateRestaurant, _>(self.clone())
            .validator::<CreateRestaurant, _>(CreateRestaurantValidator)
            .handler::<GetRestaurant, _>(self.clone())
            .handler::<GetAllRestaurants, _>(self.clone())
            .handler::<UpdateRestaurant, _>(self.clone())
            .validator::<UpdateRestaurant, _>(UpdateRestaurantValidator)
            .handler::<DeleteRestaurant, _>(self)
            .expect::<CreateRestaurant>()
            .expect::<GetRestaurant>()
            .expect::<GetAllRestaurants>()
            .expect::<UpdateRestaurant>()
            .expect::<DeleteRestaurant>()
    }
}

#[async_trait]
impl RequestHandler<CreateRestaurant> for RestaurantHandlers {
    async fn handle(
        &self,
        request: CreateRestaurant,
        _ctx: &RequestContext,
    ) -> Result<RestaurantId, Error> {
        info!(name = %request.name, dishes = request.dishes.len(), "creating restaurant");
        let CreateRestaurant {
            name,
            description,
            category,
            has_delivery,
            contact_email,
            contact_phone,
            address,
            dishes,
        } = request;
        let new = NewRestaurant {
            name,
            description,
            category,
            has_delivery,
            contact_email: normalise_contact(contact_email),
            contact_phone: normalise_contact(contact_phone),
            address,
            dishes,
        };
        self.repository
            .create(&new)
            .await
            .map_err(map_restaurant_error)
    }
}

#[async_trait]
impl RequestHandler<GetRestaurant> for RestaurantHandlers {
    async fn handle(
        &self,
        request: GetRestaurant,
        _ctx: &RequestContext,
    ) -> Result<Option<Restaurant>, Error> {
        info!(id = %request.id, "fetching restaurant");
        self.repository
            .find_by_id(&request.id)
            .await
            .map_err(map_restaurant_error)
    }
}

#[async_trait]
impl RequestHandler<GetAllRestaurants> for RestaurantHandlers {
    async fn handle(
        &self,
        _request: GetAllRestaurants,
        _ctx: &RequestContext,
    ) -> Result<Vec<Restaurant>, Error> {
        info!("listing restaurants");
        self.repository
            .list_all()
            .await
            .map_err(map_restaurant_error)
    }
}

#[async_trait]
impl RequestHandler<UpdateRestaurant> for RestaurantHandlers {
    async fn handle(
        &self,
        request: UpdateRestaurant,
        _ctx: &RequestContext,
    ) -> Result<UpdateOutcome, Error> {
        info!(id = %request.id, "updating restaurant");
        let UpdateRestaurant {
            id,
            name,
            description,
            category,
            has_delivery,
            contact_email,
            contact_phone,
        } = request;
        let update = RestaurantUpdate {
            name,
            description,
            category,
            has_delivery,
            contact_email: contact_email.map(normalise_contact),
            contact_phone: contact_phone.map(normalise_contact),
        };
        let outcome = self
            .repository
            .update(&id, &update)
            .await
            .map_err(map_restaurant_error)?;
        if outcome == UpdateOutcome::NotFound {
            warn!(%id, "restaurant missing or changed concurrently");
        }
        Ok(outcome)
    }
}

#[async_trait]
impl RequestHandler<DeleteRestaurant> for RestaurantHandlers {
    async fn handle(
        &self,
        request: DeleteRestaurant,
        _ctx: &RequestContext,
    ) -> Result<DeleteOutcome, Error> {
        info!(id = %request.id, "deleting restaurant");
        let outcome = self
            .repository
            .delete(&request.id)
            .await
            .map_err(map_restaurant_error)?;
        if outcome == DeleteOutcome::NotFound {
            warn!(id = %request.id, "restaurant already absent");
        }
        Ok(outcome)
    }
}
