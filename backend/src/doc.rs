//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST handler, the request and response bodies,
//! and the error schema wrappers from the inbound layer. The session cookie
//! scheme is added by a modifier so the identity endpoints can reference it.
//!
//! The generated document is served by Swagger UI in debug builds and
//! printed by the `openapi-dump` binary.

use crate::inbound::http::dishes::{DishBody, DishResponse};
use crate::inbound::http::identity::{UserDetailsBody, UserRoleBody};
use crate::inbound::http::restaurants::{
    AddressBody, CreateRestaurantBody, CreatedResponse, RestaurantResponse, UpdateRestaurantBody,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema, FieldErrorSchema};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Private session cookie carrying the signed-in user's claims.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Restaurants API",
        description = "Restaurant and dish catalogue with role administration.",
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::restaurants::list_restaurants,
        crate::inbound::http::restaurants::get_restaurant,
        crate::inbound::http::restaurants::create_restaurant,
        crate::inbound::http::restaurants::update_restaurant,
        crate::inbound::http::restaurants::delete_restaurant,
        crate::inbound::http::dishes::list_dishes,
        crate::inbound::http::dishes::get_dish,
        crate::inbound::http::dishes::create_dish,
        crate::inbound::http::dishes::update_dish,
        crate::inbound::http::dishes::delete_dish,
        crate::inbound::http::identity::update_user_details,
        crate::inbound::http::identity::assign_user_role,
        crate::inbound::http::identity::unassign_user_role,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        AddressBody,
        CreateRestaurantBody,
        UpdateRestaurantBody,
        RestaurantResponse,
        CreatedResponse,
        DishBody,
        DishResponse,
        UserRoleBody,
        UserDetailsBody,
        ErrorSchema,
        ErrorCodeSchema,
        FieldErrorSchema,
    )),
    tags(
        (name = "restaurants", description = "Restaurant aggregates"),
        (name = "dishes", description = "Dishes owned by a restaurant"),
        (name = "identity", description = "Role administration and user profile"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
