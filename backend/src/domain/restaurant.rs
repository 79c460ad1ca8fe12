//! Restaurant aggregate root.
//!
//! A restaurant exclusively owns its dishes: every [`Dish`] in
//! [`Restaurant::dishes`] carries the owner's id and is removed with it.

use super::{Dish, DishDraft, DishId, RestaurantId};

/// Postal address embedded in a restaurant row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub zip_code: String,
    pub country: String,
}

/// Restaurant aggregate with its dishes populated.
#[derive(Debug, Clone, PartialEq)]
pub struct Restaurant {
    pub id: RestaurantId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub has_delivery: bool,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Option<Address>,
    pub dishes: Vec<Dish>,
}

/// Aggregate to insert; the repository assigns identifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRestaurant {
    pub name: String,
    pub description: String,
    pub category: String,
    pub has_delivery: bool,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Option<Address>,
    pub dishes: Vec<DishDraft>,
}

impl NewRestaurant {
    /// Materialise the aggregate under freshly assigned identifiers.
    #[must_use]
    pub fn into_restaurant(
        self,
        id: RestaurantId,
        dish_ids: impl IntoIterator<Item = DishId>,
    ) -> Restaurant {
        let Self {
            name,
            description,
            category,
            has_delivery,
            contact_email,
            contact_phone,
            address,
            dishes,
        } = self;
        let dishes = dishes
            .into_iter()
            .zip(dish_ids)
            .map(|(draft, dish_id)| Dish::from_draft(dish_id, id, draft))
            .collect();
        Restaurant {
            id,
            name,
            description,
            category,
            has_delivery,
            contact_email,
            contact_phone,
            address,
            dishes,
        }
    }
}

/// Sparse overwrite of a restaurant's mutable columns.
///
/// `None` leaves a column unchanged. For the contact columns, `Some(None)`
/// clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestaurantUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub has_delivery: Option<bool>,
    pub contact_email: Option<Option<String>>,
    pub contact_phone: Option<Option<String>>,
}

impl RestaurantUpdate {
    /// True when no column would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.has_delivery.is_none()
            && self.contact_email.is_none()
            && self.contact_phone.is_none()
    }

    /// Apply the supplied fields to an in-memory aggregate.
    pub fn apply_to(&self, restaurant: &mut Restaurant) {
        if let Some(name) = &self.name {
            restaurant.name.clone_from(name);
        }
        if let Some(description) = &self.description {
            restaurant.description.clone_from(description);
        }
        if let Some(category) = &self.category {
            restaurant.category.clone_from(category);
        }
        if let Some(has_delivery) = self.has_delivery {
            restaurant.has_delivery = has_delivery;
        }
        if let Some(email) = &self.contact_email {
            restaurant.contact_email.clone_from(email);
        }
        if let Some(phone) = &self.contact_phone {
            restaurant.contact_phone.clone_from(phone);
        }
    }
}

/// Treat blank contact input as an absent value.
#[must_use]
pub fn normalise_contact(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_owned())
    }
}
