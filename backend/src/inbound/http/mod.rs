//! HTTP inbound adapter exposing REST endpoints.
//!
//! Handlers translate JSON bodies and path segments into domain requests and
//! hand them to the shared [`state::HttpState`] dispatcher. Route paths are
//! relative to the `/api` scope mounted by the server.

pub mod auth;
pub mod dishes;
pub mod error;
pub mod health;
pub mod identity;
pub mod restaurants;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;

use actix_web::web;

use crate::domain::Error;

/// Register every API handler and the JSON body configuration.
///
/// Malformed JSON bodies surface as `invalid_request` errors carrying the
/// deserializer's message.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use restaurants::inbound::http::configure_api;
///
/// let app = App::new().service(web::scope("/api").configure(configure_api));
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| Error::invalid_request(err.to_string()).into()),
    )
    .service(restaurants::list_restaurants)
    .service(restaurants::get_restaurant)
    .service(restaurants::create_restaurant)
    .service(restaurants::update_restaurant)
    .service(restaurants::delete_restaurant)
    .service(dishes::list_dishes)
    .service(dishes::get_dish)
    .service(dishes::create_dish)
    .service(dishes::update_dish)
    .service(dishes::delete_dish)
    .service(identity::update_user_details)
    .service(identity::assign_user_role)
    .service(identity::unassign_user_role);
}
