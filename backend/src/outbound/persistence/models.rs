//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::NaiveDate;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Address, Dish, DishDraft, DishId, IdentityUser, Price, Restaurant, RestaurantId,
    RestaurantUpdate, RoleName, UserDetailsUpdate, UserId,
};

use super::schema::{dishes, restaurants, user_roles, users};

// ---------------------------------------------------------------------------
// Restaurant models
// ---------------------------------------------------------------------------

/// Row struct for reading from the restaurants table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = restaurants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RestaurantRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub has_delivery: bool,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address_street: Option<String>,
    pub address_city: Option<String>,
    pub address_zip_code: Option<String>,
    pub address_country: Option<String>,
}

impl RestaurantRow {
    /// Assemble the aggregate from its root row and owned dish rows.
    pub fn into_restaurant(self, dishes: Vec<DishRow>) -> Restaurant {
        let address = match (
            self.address_street,
            self.address_city,
            self.address_zip_code,
            self.address_country,
        ) {
            (Some(street), Some(city), Some(zip_code), Some(country)) => Some(Address {
                street,
                city,
                zip_code,
                country,
            }),
            _ => None,
        };
        Restaurant {
            id: RestaurantId::from_uuid(self.id),
            name: self.name,
            description: self.description,
            category: self.category,
            has_delivery: self.has_delivery,
            contact_email: self.contact_email,
            contact_phone: self.contact_phone,
            address,
            dishes: dishes.into_iter().map(Dish::from).collect(),
        }
    }
}

/// Insertable struct for creating new restaurant records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = restaurants)]
pub(crate) struct NewRestaurantRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub description: &'a str,
    pub category: &'a str,
    pub has_delivery: bool,
    pub contact_email: Option<&'a str>,
    pub contact_phone: Option<&'a str>,
    pub address_street: Option<&'a str>,
    pub address_city: Option<&'a str>,
    pub address_zip_code: Option<&'a str>,
    pub address_country: Option<&'a str>,
}

/// Changeset for sparse restaurant updates.
///
/// An outer `None` leaves the column untouched; `Some(None)` writes `NULL`.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = restaurants)]
pub(crate) struct RestaurantChangeset<'a> {
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub category: Option<&'a str>,
    pub has_delivery: Option<bool>,
    pub contact_email: Option<Option<&'a str>>,
    pub contact_phone: Option<Option<&'a str>>,
}

impl<'a> From<&'a RestaurantUpdate> for RestaurantChangeset<'a> {
    fn from(update: &'a RestaurantUpdate) -> Self {
        Self {
            name: update.name.as_deref(),
            description: update.description.as_deref(),
            category: update.category.as_deref(),
            has_delivery: update.has_delivery,
            contact_email: update.contact_email.as_ref().map(Option::as_deref),
            contact_phone: update.contact_phone.as_ref().map(Option::as_deref),
        }
    }
}

// ---------------------------------------------------------------------------
// Dish models
// ---------------------------------------------------------------------------

/// Row struct for reading from the dishes table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = dishes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DishRow {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub kilo_calories: Option<f32>,
}

impl From<DishRow> for Dish {
    fn from(row: DishRow) -> Self {
        Self {
            id: DishId::from_uuid(row.id),
            restaurant_id: RestaurantId::from_uuid(row.restaurant_id),
            name: row.name,
            description: row.description,
            price: Price::from_cents(row.price_cents),
            kilo_calories: row.kilo_calories,
        }
    }
}

/// Insertable struct for creating new dish records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = dishes)]
pub(crate) struct NewDishRow<'a> {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub name: &'a str,
    pub description: &'a str,
    pub price_cents: i64,
    pub kilo_calories: Option<f32>,
}

impl<'a> NewDishRow<'a> {
    pub fn from_draft(id: DishId, restaurant_id: RestaurantId, draft: &'a DishDraft) -> Self {
        Self {
            id: *id.as_uuid(),
            restaurant_id: *restaurant_id.as_uuid(),
            name: &draft.name,
            description: &draft.description,
            price_cents: draft.price.cents(),
            kilo_calories: draft.kilo_calories,
        }
    }
}

/// Full replacement of the mutable dish columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = dishes)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct DishChangeset<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub price_cents: i64,
    pub kilo_calories: Option<f32>,
}

impl<'a> From<&'a Dish> for DishChangeset<'a> {
    fn from(dish: &'a Dish) -> Self {
        Self {
            name: &dish.name,
            description: &dish.description,
            price_cents: dish.price.cents(),
            kilo_calories: dish.kilo_calories,
        }
    }
}

// ---------------------------------------------------------------------------
// Identity models
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub birth_date: Option<NaiveDate>,
    pub nationality: Option<String>,
}

impl UserRow {
    pub fn into_identity_user(self, roles: impl IntoIterator<Item = String>) -> IdentityUser {
        IdentityUser {
            id: UserId::from_uuid(self.id),
            email: self.email,
            birth_date: self.birth_date,
            nationality: self.nationality,
            roles: roles.into_iter().map(RoleName::new).collect(),
        }
    }
}

/// Sparse profile changeset; `None` leaves the column untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserDetailsChangeset<'a> {
    pub birth_date: Option<NaiveDate>,
    pub nationality: Option<&'a str>,
}

impl<'a> From<&'a UserDetailsUpdate> for UserDetailsChangeset<'a> {
    fn from(update: &'a UserDetailsUpdate) -> Self {
        Self {
            birth_date: update.birth_date,
            nationality: update.nationality.as_deref(),
        }
    }
}

/// Insertable role membership.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_roles)]
pub(crate) struct NewUserRoleRow<'a> {
    pub user_id: Uuid,
    pub role_name: &'a str,
}
