//! Domain primitives, use cases, and the ports they drive.
//!
//! Purpose: define the restaurant and dish aggregates, the identity types
//! used for role administration, and the request/handler pairs routed by
//! the [`Dispatcher`]. Nothing here knows about HTTP or SQL.
//!
//! Public surface:
//! - Error (alias to `error::Error`) — transport-agnostic failure payload.
//! - Dispatcher (alias to `dispatch::Dispatcher`) — typed request router.
//! - Restaurant / Dish — the aggregate and its owned entity.
//! - build_dispatcher — wires every handler against a set of ports.

pub mod dish;
pub mod dish_requests;
pub mod dispatch;
pub mod error;
pub mod identity_requests;
pub mod ids;
pub mod ports;
pub mod registry;
pub mod restaurant;
pub mod restaurant_requests;
pub mod trace_id;
pub mod user;
pub mod user_context;
pub mod validation;

pub use self::dish::{Dish, DishDraft, NewDish, Price, PriceError};
pub use self::dish_requests::{CreateDish, DeleteDish, GetDish, GetDishes, UpdateDish};
pub use self::dispatch::{
    Dispatcher, DispatcherBuilder, DispatcherConfigError, Request, RequestContext,
    RequestHandler,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::identity_requests::{AssignRole, UnassignRole, UpdateCurrentUserDetails};
pub use self::ids::{DishId, RestaurantId, UserId};
pub use self::registry::{DomainPorts, build_dispatcher};
pub use self::restaurant::{
    Address, NewRestaurant, Restaurant, RestaurantUpdate, normalise_contact,
};
pub use self::restaurant_requests::{
    CreateRestaurant, DeleteRestaurant, GetAllRestaurants, GetRestaurant, UpdateRestaurant,
};
pub use self::trace_id::TraceId;
pub use self::user::{CurrentUser, IdentityUser, RoleName, UserDetailsUpdate, roles};
#[cfg(test)]
pub use self::user_context::MockUserContext;
pub use self::user_context::{AmbientUserContext, Principal, UserContext, UserContextError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use restaurants::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
