//! Restaurant HTTP handlers.
//!
//! ```text
//! GET    /api/restaurants
//! GET    /api/restaurants/{restaurant_id}
//! POST   /api/restaurants
//! PATCH  /api/restaurants/{restaurant_id}
//! DELETE /api/restaurants/{restaurant_id}
//! ```

use actix_web::{HttpResponse, delete, get, http::header, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{DeleteOutcome, UpdateOutcome};
use crate::domain::restaurant_requests::CreateRestaurantValidator;
use crate::domain::validation::ValidationErrors;
use crate::domain::{
    Address, CreateRestaurant, DeleteRestaurant, Error, GetAllRestaurants, GetRestaurant,
    RequestContext, Restaurant, RestaurantId, UpdateRestaurant,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dishes::{DishBody, DishResponse};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, reject_unconverted};

const RESTAURANT_ID: FieldName = FieldName::new("id");

/// Identifier of a freshly created resource.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreatedResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
}

/// Postal address of a restaurant.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddressBody {
    pub street: String,
    pub city: String,
    #[schema(example = "00-950")]
    pub zip_code: String,
    #[serde(default)]
    pub country: String,
}

impl From<AddressBody> for Address {
    fn from(value: AddressBody) -> Self {
        Self {
            street: value.street,
            city: value.city,
            zip_code: value.zip_code,
            country: value.country,
        }
    }
}

impl From<Address> for AddressBody {
    fn from(value: Address) -> Self {
        Self {
            street: value.street,
            city: value.city,
            zip_code: value.zip_code,
            country: value.country,
        }
    }
}

/// Request body for `POST /api/restaurants`.
///
/// Blank contact fields are stored as absent.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRestaurantBody {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub has_delivery: bool,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub contact_phone: String,
    pub address: Option<AddressBody>,
    #[serde(default)]
    pub dishes: Vec<DishBody>,
}

impl CreateRestaurantBody {
    /// Convert into a request, recording nested price failures in `errors`.
    fn into_request(self, errors: &mut ValidationErrors) -> CreateRestaurant {
        let dishes = self
            .dishes
            .into_iter()
            .enumerate()
            .map(|(index, dish)| dish.into_draft(&format!("dishes[{index}]"), errors))
            .collect();
        CreateRestaurant {
            name: self.name,
            description: self.description,
            category: self.category,
            has_delivery: self.has_delivery,
            contact_email: self.contact_email,
            contact_phone: self.contact_phone,
            address: self.address.map(Address::from),
            dishes,
        }
    }
}

/// Request body for `PATCH /api/restaurants/{restaurant_id}`.
///
/// Omitted fields stay unchanged; an empty contact string clears the value.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRestaurantBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub has_delivery: Option<bool>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

impl UpdateRestaurantBody {
    fn into_request(self, id: RestaurantId) -> UpdateRestaurant {
        UpdateRestaurant {
            id,
            name: self.name,
            description: self.description,
            category: self.category,
            has_delivery: self.has_delivery,
            contact_email: self.contact_email,
            contact_phone: self.contact_phone,
        }
    }
}

/// Restaurant aggregate returned to clients.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub has_delivery: bool,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Option<AddressBody>,
    pub dishes: Vec<DishResponse>,
}

impl From<Restaurant> for RestaurantResponse {
    fn from(value: Restaurant) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
            description: value.description,
            category: value.category,
            has_delivery: value.has_delivery,
            contact_email: value.contact_email,
            contact_phone: value.contact_phone,
            address: value.address.map(AddressBody::from),
            dishes: value.dishes.into_iter().map(DishResponse::from).collect(),
        }
    }
}

fn restaurant_not_found(id: RestaurantId) -> Error {
    Error::not_found(format!("restaurant {id} not found"))
}

/// List every restaurant with its dishes.
#[utoipa::path(
    get,
    path = "/api/restaurants",
    responses(
        (status = 200, description = "Restaurants", body = [RestaurantResponse]),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["restaurants"],
    operation_id = "listRestaurants",
    security([])
)]
#[get("/restaurants")]
pub async fn list_restaurants(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<RestaurantResponse>>> {
    let restaurants = state
        .dispatcher
        .send(GetAllRestaurants, &RequestContext::new())
        .await?;
    Ok(web::Json(
        restaurants
            .into_iter()
            .map(RestaurantResponse::from)
            .collect(),
    ))
}

/// Fetch one restaurant.
#[utoipa::path(
    get,
    path = "/api/restaurants/{restaurant_id}",
    params(("restaurant_id" = String, Path, description = "Restaurant identifier")),
    responses(
        (status = 200, description = "Restaurant", body = RestaurantResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["restaurants"],
    operation_id = "getRestaurant",
    security([])
)]
#[get("/restaurants/{restaurant_id}")]
pub async fn get_restaurant(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<RestaurantResponse>> {
    let id = parse_id(&path.into_inner(), RESTAURANT_ID)?;
    let restaurant = state
        .dispatcher
        .send(GetRestaurant { id }, &RequestContext::new())
        .await?
        .ok_or_else(|| restaurant_not_found(id))?;
    Ok(web::Json(restaurant.into()))
}

/// Create a restaurant together with its initial dishes.
#[utoipa::path(
    post,
    path = "/api/restaurants",
    request_body = CreateRestaurantBody,
    responses(
        (status = 201, description = "Restaurant created", body = CreatedResponse,
            headers(("Location" = String, description = "URL of the new restaurant"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["restaurants"],
    operation_id = "createRestaurant",
    security([])
)]
#[post("/restaurants")]
pub async fn create_restaurant(
    state: web::Data<HttpState>,
    payload: web::Json<CreateRestaurantBody>,
) -> ApiResult<HttpResponse> {
    let mut conversion = ValidationErrors::new();
    let request = payload.into_inner().into_request(&mut conversion);
    reject_unconverted(&CreateRestaurantValidator, &request, conversion)?;
    let id = state
        .dispatcher
        .send(request, &RequestContext::new())
        .await?;
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/api/restaurants/{id}")))
        .json(CreatedResponse { id: id.to_string() }))
}

/// Overwrite the supplied restaurant fields.
#[utoipa::path(
    patch,
    path = "/api/restaurants/{restaurant_id}",
    params(("restaurant_id" = String, Path, description = "Restaurant identifier")),
    request_body = UpdateRestaurantBody,
    responses(
        (status = 204, description = "Restaurant updated"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["restaurants"],
    operation_id = "updateRestaurant",
    security([])
)]
#[patch("/restaurants/{restaurant_id}")]
pub async fn update_restaurant(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateRestaurantBody>,
) -> ApiResult<HttpResponse> {
    let id = parse_id(&path.into_inner(), RESTAURANT_ID)?;
    let outcome = state
        .dispatcher
        .send(payload.into_inner().into_request(id), &RequestContext::new())
        .await?;
    match outcome {
        UpdateOutcome::Updated => Ok(HttpResponse::NoContent().finish()),
        UpdateOutcome::NotFound => Err(restaurant_not_found(id)),
    }
}

/// Delete a restaurant and all of its dishes.
#[utoipa::path(
    delete,
    path = "/api/restaurants/{restaurant_id}",
    params(("restaurant_id" = String, Path, description = "Restaurant identifier")),
    responses(
        (status = 204, description = "Restaurant deleted"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["restaurants"],
    operation_id = "deleteRestaurant",
    security([])
)]
#[delete("/restaurants/{restaurant_id}")]
pub async fn delete_restaurant(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_id(&path.into_inner(), RESTAURANT_ID)?;
    let outcome = state
        .dispatcher
        .send(DeleteRestaurant { id }, &RequestContext::new())
        .await?;
    match outcome {
        DeleteOutcome::Deleted => Ok(HttpResponse::NoContent().finish()),
        DeleteOutcome::NotFound => Err(restaurant_not_found(id)),
    }
}
