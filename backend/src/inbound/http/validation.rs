//! Shared parsing helpers for inbound HTTP adapters.
//!
//! Failures are reported in the same `validation_failed` shape the domain
//! validators use, so clients handle one error payload for every field.

use std::str::FromStr;

use chrono::NaiveDate;

use crate::domain::validation::{ValidationErrors, Validator, validate_with};
use crate::domain::{Error, Price, PriceError};

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) fn as_str(&self) -> &'static str {
        self.0
    }
}

fn single_field_error(field: &str, message: impl Into<String>) -> Error {
    let mut errors = ValidationErrors::new();
    errors.push(field, message);
    errors.into_error()
}

/// Parse a UUID-backed identifier from a path segment.
pub(crate) fn parse_id<T>(raw: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr,
{
    raw.parse()
        .map_err(|_| single_field_error(field.as_str(), "must be a valid UUID"))
}

/// Convert a decimal amount, reporting failures against `field`.
pub(crate) fn price_from_decimal(
    value: f64,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<Price> {
    match Price::try_from_decimal(value) {
        Ok(price) => Some(price),
        Err(PriceError::NotFinite) => {
            errors.push(field, "must be a number");
            None
        }
        Err(PriceError::OutOfRange) => {
            errors.push(field, "is out of range");
            None
        }
    }
}

/// Fail with every finding when body conversion already recorded some.
///
/// Unconverted values carry placeholders, so `validator` runs here to report
/// the other fields in the same response instead of stopping at the first
/// conversion failure.
pub(crate) fn reject_unconverted<R, V>(
    validator: &V,
    request: &R,
    conversion: ValidationErrors,
) -> Result<(), Error>
where
    V: Validator<R>,
{
    if conversion.is_empty() {
        return Ok(());
    }
    let mut errors = validate_with(validator, request);
    errors.merge(conversion);
    Err(errors.into_error())
}

/// Parse an optional `YYYY-MM-DD` calendar date.
pub(crate) fn parse_optional_date(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<NaiveDate>, Error> {
    value
        .map(|raw| {
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
                single_field_error(field.as_str(), "must be a date formatted as YYYY-MM-DD")
            })
        })
        .transpose()
}
