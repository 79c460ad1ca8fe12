//! Dish entities owned by a restaurant, and their monetary price.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{DishId, RestaurantId};

/// Largest decimal price accepted before conversion to minor units.
const MAX_DECIMAL_PRICE: f64 = 90_000_000_000_000.0;

/// Errors raised when converting a decimal amount into a [`Price`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PriceError {
    #[error("price must be a finite number")]
    NotFinite,
    #[error("price is out of range")]
    OutOfRange,
}

/// Fixed-point price held as integer cents.
///
/// Decimal input is rounded half away from zero to two places, so `0.125`
/// becomes `0.13`. Validation of the `> 0` rule happens on the rounded value.
///
/// # Examples
/// ```
/// use restaurants::domain::Price;
///
/// let price = Price::try_from_decimal(2.99).expect("finite price");
/// assert_eq!(price.cents(), 299);
/// assert_eq!(price.to_string(), "2.99");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Price {
    cents: i64,
}

impl Price {
    /// Construct a price from minor units.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Convert a decimal amount, rounding to whole cents.
    pub fn try_from_decimal(value: f64) -> Result<Self, PriceError> {
        if !value.is_finite() {
            return Err(PriceError::NotFinite);
        }
        if value.abs() > MAX_DECIMAL_PRICE {
            return Err(PriceError::OutOfRange);
        }
        let cents = (value * 100.0).round() as i64;
        Ok(Self { cents })
    }

    /// Amount in minor units.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.cents
    }

    /// Amount as a decimal number of major units.
    #[must_use]
    pub fn as_decimal(self) -> f64 {
        self.cents as f64 / 100.0
    }

    /// Whether the price is strictly greater than zero.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.cents > 0
    }
}

impl TryFrom<f64> for Price {
    type Error = PriceError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::try_from_decimal(value)
    }
}

impl From<Price> for f64 {
    fn from(value: Price) -> Self {
        value.as_decimal()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.cents < 0 { "-" } else { "" };
        let magnitude = self.cents.unsigned_abs();
        write!(f, "{sign}{}.{:02}", magnitude / 100, magnitude % 100)
    }
}

/// Mutable dish fields, shared by creation and full replacement.
#[derive(Debug, Clone, PartialEq)]
pub struct DishDraft {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub kilo_calories: Option<f32>,
}

/// A dish to insert under an existing restaurant.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDish {
    pub restaurant_id: RestaurantId,
    pub dish: DishDraft,
}

/// Dish entity. `restaurant_id` never changes after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Dish {
    pub id: DishId,
    pub restaurant_id: RestaurantId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub kilo_calories: Option<f32>,
}

impl Dish {
    /// Materialise a draft under the given identifiers.
    #[must_use]
    pub fn from_draft(id: DishId, restaurant_id: RestaurantId, draft: DishDraft) -> Self {
        let DishDraft {
            name,
            description,
            price,
            kilo_calories,
        } = draft;
        Self {
            id,
            restaurant_id,
            name,
            description,
            price,
            kilo_calories,
        }
    }
}
