//! Field validation run by the dispatcher before any handler executes.
//!
//! A [`Validator`] inspects a typed request and records [`FieldError`]s into a
//! shared [`ValidationErrors`] collector. Every field is checked even after an
//! earlier one fails, so a caller sees all problems in one response.

pub mod rules;

use serde::Serialize;
use serde_json::json;

use super::Error;

/// A single field-level finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Wire name of the offending field, with a path for nested values.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

/// Aggregated findings for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finding for `field`.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Merge findings produced for a nested value under `prefix`.
    ///
    /// `prefix` is joined with a dot unless the nested field is empty.
    pub fn extend_nested(&mut self, prefix: &str, nested: Self) {
        self.errors
            .extend(nested.errors.into_iter().map(|error| FieldError {
                field: if error.field.is_empty() {
                    prefix.to_owned()
                } else {
                    format!("{prefix}.{}", error.field)
                },
                message: error.message,
            }));
    }

    /// Merge findings from another validator.
    pub fn merge(&mut self, other: Self) {
        self.errors.extend(other.errors);
    }

    /// True when no rule was violated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of findings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterate over the findings in the order they were recorded.
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Whether any finding refers to `field`.
    #[must_use]
    pub fn contains_field(&self, field: &str) -> bool {
        self.errors.iter().any(|error| error.field == field)
    }

    /// Convert the findings into an `invalid_request` error.
    ///
    /// The details payload lists every finding:
    ///
    /// ```json
    /// {"code": "validation_failed", "errors": [{"field": "name", "message": "..."}]}
    /// ```
    #[must_use]
    pub fn into_error(self) -> Error {
        Error::invalid_request("validation failed").with_details(json!({
            "code": "validation_failed",
            "errors": self.errors,
        }))
    }
}

/// Request-type-specific set of field rules.
///
/// Implementations are pure: they read the request and record findings.
pub trait Validator<R>: Send + Sync {
    /// Check `request`, recording every violation in `errors`.
    fn validate(&self, request: &R, errors: &mut ValidationErrors);
}

/// Run a validator against a request with a fresh collector.
pub fn validate_with<R, V>(validator: &V, request: &R) -> ValidationErrors
where
    V: Validator<R> + ?Sized,
{
    let mut errors = ValidationErrors::new();
    validator.validate(request, &mut errors);
    errors
}
