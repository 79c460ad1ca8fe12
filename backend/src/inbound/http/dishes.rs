//! Dish HTTP handlers, nested under their owning restaurant.
//!
//! ```text
//! GET    /api/restaurants/{restaurant_id}/dishes
//! GET    /api/restaurants/{restaurant_id}/dishes/{dish_id}
//! POST   /api/restaurants/{restaurant_id}/dishes
//! PATCH  /api/restaurants/{restaurant_id}/dishes/{dish_id}
//! DELETE /api/restaurants/{restaurant_id}/dishes/{dish_id}
//! ```

use actix_web::{HttpResponse, delete, get, http::header, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{DeleteOutcome, UpdateOutcome};
use crate::domain::dish_requests::{CreateDishValidator, UpdateDishValidator};
use crate::domain::validation::ValidationErrors;
use crate::domain::{
    CreateDish, DeleteDish, Dish, DishDraft, DishId, Error, GetDish, GetDishes, Price,
    RequestContext, RestaurantId, UpdateDish,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::restaurants::CreatedResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_id, price_from_decimal, reject_unconverted,
};

const RESTAURANT_ID: FieldName = FieldName::new("restaurantId");
const DISH_ID: FieldName = FieldName::new("id");

/// Stand-in for a price that failed conversion. Never persisted.
const UNPARSED_PRICE: Price = Price::from_cents(1);

/// Mutable dish fields accepted on create and replace.
///
/// Example JSON:
/// `{"name":"Taco","description":"Corn tortilla","price":2.99,"kiloCalories":310}`
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DishBody {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Decimal amount in major units, rounded to cents.
    #[schema(example = 2.99)]
    pub price: f64,
    pub kilo_calories: Option<f32>,
}

impl DishBody {
    /// Convert into a draft, recording price conversion failures under
    /// `prefix` (empty for a top-level dish).
    ///
    /// An unconvertible price is replaced with [`UNPARSED_PRICE`] so the
    /// remaining fields can still be validated; `errors` is then non-empty.
    pub(crate) fn into_draft(self, prefix: &str, errors: &mut ValidationErrors) -> DishDraft {
        let field = if prefix.is_empty() {
            "price".to_owned()
        } else {
            format!("{prefix}.price")
        };
        let price = price_from_decimal(self.price, &field, errors).unwrap_or(UNPARSED_PRICE);
        DishDraft {
            name: self.name,
            description: self.description,
            price,
            kilo_calories: self.kilo_calories,
        }
    }
}

/// Dish representation returned to clients.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DishResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    pub restaurant_id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub kilo_calories: Option<f32>,
}

impl From<Dish> for DishResponse {
    fn from(value: Dish) -> Self {
        Self {
            id: value.id.to_string(),
            restaurant_id: value.restaurant_id.to_string(),
            name: value.name,
            description: value.description,
            price: value.price.as_decimal(),
            kilo_calories: value.kilo_calories,
        }
    }
}

fn parse_dish_path(raw: (String, String)) -> ApiResult<(RestaurantId, DishId)> {
    let (restaurant_id, dish_id) = raw;
    Ok((
        parse_id(&restaurant_id, RESTAURANT_ID)?,
        parse_id(&dish_id, DISH_ID)?,
    ))
}

/// List the dishes of a restaurant.
#[utoipa::path(
    get,
    path = "/api/restaurants/{restaurant_id}/dishes",
    params(("restaurant_id" = String, Path, description = "Owning restaurant")),
    responses(
        (status = 200, description = "Dishes", body = [DishResponse]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["dishes"],
    operation_id = "listDishes",
    security([])
)]
#[get("/restaurants/{restaurant_id}/dishes")]
pub async fn list_dishes(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<DishResponse>>> {
    let restaurant_id = parse_id(&path.into_inner(), RESTAURANT_ID)?;
    let dishes = state
        .dispatcher
        .send(GetDishes { restaurant_id }, &RequestContext::new())
        .await?;
    Ok(web::Json(dishes.into_iter().map(DishResponse::from).collect()))
}

/// Fetch one dish of a restaurant.
#[utoipa::path(
    get,
    path = "/api/restaurants/{restaurant_id}/dishes/{dish_id}",
    params(
        ("restaurant_id" = String, Path, description = "Owning restaurant"),
        ("dish_id" = String, Path, description = "Dish identifier")
    ),
    responses(
        (status = 200, description = "Dish", body = DishResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["dishes"],
    operation_id = "getDish",
    security([])
)]
#[get("/restaurants/{restaurant_id}/dishes/{dish_id}")]
pub async fn get_dish(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<DishResponse>> {
    let (restaurant_id, id) = parse_dish_path(path.into_inner())?;
    let dish = state
        .dispatcher
        .send(GetDish { restaurant_id, id }, &RequestContext::new())
        .await?;
    Ok(web::Json(dish.into()))
}

/// Add a dish to an existing restaurant.
#[utoipa::path(
    post,
    path = "/api/restaurants/{restaurant_id}/dishes",
    params(("restaurant_id" = String, Path, description = "Owning restaurant")),
    request_body = DishBody,
    responses(
        (status = 201, description = "Dish created", body = CreatedResponse,
            headers(("Location" = String, description = "URL of the new dish"))),
        (status = 400, description = "Invalid request or unknown restaurant", body = ErrorSchema)
    ),
    tags = ["dishes"],
    operation_id = "createDish",
    security([])
)]
#[post("/restaurants/{restaurant_id}/dishes")]
pub async fn create_dish(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<DishBody>,
) -> ApiResult<HttpResponse> {
    let restaurant_id: RestaurantId = parse_id(&path.into_inner(), RESTAURANT_ID)?;
    let mut conversion = ValidationErrors::new();
    let dish = payload.into_inner().into_draft("", &mut conversion);
    let request = CreateDish { restaurant_id, dish };
    reject_unconverted(&CreateDishValidator, &request, conversion)?;
    let id = state
        .dispatcher
        .send(request, &RequestContext::new())
        .await?;
    Ok(HttpResponse::Created()
        .insert_header((
            header::LOCATION,
            format!("/api/restaurants/{restaurant_id}/dishes/{id}"),
        ))
        .json(CreatedResponse { id: id.to_string() }))
}

/// Replace the mutable fields of a dish.
#[utoipa::path(
    patch,
    path = "/api/restaurants/{restaurant_id}/dishes/{dish_id}",
    params(
        ("restaurant_id" = String, Path, description = "Owning restaurant"),
        ("dish_id" = String, Path, description = "Dish identifier")
    ),
    request_body = DishBody,
    responses(
        (status = 204, description = "Dish updated"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["dishes"],
    operation_id = "updateDish",
    security([])
)]
#[patch("/restaurants/{restaurant_id}/dishes/{dish_id}")]
pub async fn update_dish(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
    payload: web::Json<DishBody>,
) -> ApiResult<HttpResponse> {
    let (restaurant_id, id) = parse_dish_path(path.into_inner())?;
    let mut conversion = ValidationErrors::new();
    let dish = payload.into_inner().into_draft("", &mut conversion);
    let request = UpdateDish {
        restaurant_id,
        id,
        dish,
    };
    reject_unconverted(&UpdateDishValidator, &request, conversion)?;
    let outcome = state
        .dispatcher
        .send(request, &RequestContext::new())
        .await?;
    match outcome {
        UpdateOutcome::Updated => Ok(HttpResponse::NoContent().finish()),
        UpdateOutcome::NotFound => Err(Error::not_found(format!("dish {id} not found"))),
    }
}

/// Remove a dish from its restaurant.
#[utoipa::path(
    delete,
    path = "/api/restaurants/{restaurant_id}/dishes/{dish_id}",
    params(
        ("restaurant_id" = String, Path, description = "Owning restaurant"),
        ("dish_id" = String, Path, description = "Dish identifier")
    ),
    responses(
        (status = 204, description = "Dish deleted"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["dishes"],
    operation_id = "deleteDish",
    security([])
)]
#[delete("/restaurants/{restaurant_id}/dishes/{dish_id}")]
pub async fn delete_dish(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (restaurant_id, id) = parse_dish_path(path.into_inner())?;
    let outcome = state
        .dispatcher
        .send(DeleteDish { restaurant_id, id }, &RequestContext::new())
        .await?;
    match outcome {
        DeleteOutcome::Deleted => Ok(HttpResponse::NoContent().finish()),
        DeleteOutcome::NotFound => Err(Error::not_found(format!("dish {id} not found"))),
    }
}
