//! Reusable field rules.
//!
//! Each rule returns `Err(message)` when violated. [`check`] runs a chain of
//! rules for one field and records the first failure, so one field yields at
//! most one finding.

use std::sync::OnceLock;

use regex::Regex;

use super::ValidationErrors;
use crate::domain::Price;

/// Outcome of a single rule.
pub type RuleResult = Result<(), String>;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static PHONE_RE: OnceLock<Regex> = OnceLock::new();
static ZIP_RE: OnceLock<Regex> = OnceLock::new();

fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| {
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("validation regex {pattern} failed to compile: {error}"))
    })
}

/// Record the first failing rule of `chain` against `field`.
pub fn check(
    errors: &mut ValidationErrors,
    field: &str,
    chain: impl IntoIterator<Item = RuleResult>,
) {
    if let Some(Err(message)) = chain.into_iter().find(Result::is_err) {
        errors.push(field, message);
    }
}

/// Value must contain a non-whitespace character.
pub fn not_empty(value: &str) -> RuleResult {
    if value.trim().is_empty() {
        Err("must not be empty".to_owned())
    } else {
        Ok(())
    }
}

/// Character count must fall in `min..=max`.
pub fn length(value: &str, min: usize, max: usize) -> RuleResult {
    let count = value.chars().count();
    if (min..=max).contains(&count) {
        Ok(())
    } else {
        Err(format!("must be between {min} and {max} characters long"))
    }
}

/// Character count must not exceed `max`.
pub fn max_length(value: &str, max: usize) -> RuleResult {
    if value.chars().count() <= max {
        Ok(())
    } else {
        Err(format!("must be at most {max} characters long"))
    }
}

/// Price must be strictly positive after rounding to cents.
pub fn positive_price(price: Price) -> RuleResult {
    if price.is_positive() {
        Ok(())
    } else {
        Err("must be greater than 0".to_owned())
    }
}

/// Number must be finite and strictly positive.
pub fn positive(value: f32) -> RuleResult {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err("must be greater than 0".to_owned())
    }
}

/// Loose email shape check: exactly one `@` and no whitespace.
pub fn email(value: &str) -> RuleResult {
    if compiled(&EMAIL_RE, r"^[^@\s]+@[^@\s]+$").is_match(value) {
        Ok(())
    } else {
        Err("must be a valid email address".to_owned())
    }
}

/// Optional leading `+`, then at least three digits or spaces.
pub fn phone(value: &str) -> RuleResult {
    if compiled(&PHONE_RE, r"^\+?[0-9\s]{3,}$").is_match(value) {
        Ok(())
    } else {
        Err("must be a valid phone number".to_owned())
    }
}

/// Exactly five ASCII digits.
pub fn zip_code(value: &str) -> RuleResult {
    if compiled(&ZIP_RE, r"^[0-9]{5}$").is_match(value) {
        Ok(())
    } else {
        Err("must be a 5-digit zip code".to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("abc", true)]
    #[case("ab", false)]
    #[case("", false)]
    #[case("żółw", true)]
    fn length_counts_characters(#[case] value: &str, #[case] ok: bool) {
        assert_eq!(length(value, 3, 100).is_ok(), ok);
    }

    #[rstest]
    #[case("", 3, true)]
    #[case("abc", 3, true)]
    #[case("abcd", 3, false)]
    #[case("żółw", 4, true)]
    fn max_length_counts_characters(#[case] value: &str, #[case] max: usize, #[case] ok: bool) {
        assert_eq!(max_length(value, max).is_ok(), ok);
    }

    #[rstest]
    #[case("owner@restaurants.test", true)]
    #[case("owner@localhost", true)]
    #[case("owner.restaurants.test", false)]
    #[case("a b@c.d", false)]
    #[case("a@b@c", false)]
    fn email_shape(#[case] value: &str, #[case] ok: bool) {
        assert_eq!(email(value).is_ok(), ok);
    }

    #[rstest]
    #[case("+48 123 456 789", true)]
    #[case("123", true)]
    #[case("12", false)]
    #[case("++123", false)]
    #[case("call me", false)]
    fn phone_pattern(#[case] value: &str, #[case] ok: bool) {
        assert_eq!(phone(value).is_ok(), ok);
    }

    #[rstest]
    #[case("12345", true)]
    #[case("1234", false)]
    #[case("123456", false)]
    #[case("1234a", false)]
    fn zip_pattern(#[case] value: &str, #[case] ok: bool) {
        assert_eq!(zip_code(value).is_ok(), ok);
    }

    #[rstest]
    #[case(0.0, false)]
    #[case(-1.0, false)]
    #[case(f32::NAN, false)]
    #[case(0.5, true)]
    fn positive_rejects_zero_and_nan(#[case] value: f32, #[case] ok: bool) {
        assert_eq!(positive(value).is_ok(), ok);
    }

    #[rstest]
    fn check_records_one_finding_per_field() {
        let mut errors = ValidationErrors::new();
        check(&mut errors, "name", [not_empty(""), length("", 3, 100)]);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.iter().next().map(|error| error.message.as_str()),
            Some("must not be empty")
        );
    }

    #[rstest]
    fn check_records_nothing_when_chain_passes() {
        let mut errors = ValidationErrors::new();
        check(&mut errors, "name", [not_empty("Taco"), length("Taco", 3, 100)]);
        assert!(errors.is_empty());
    }
}
