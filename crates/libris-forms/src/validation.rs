//! Form field validators.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationErrors;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email regex is valid")
});

/// Trait for field validators.
pub trait Validator: Send + Sync {
    /// Validates a value and returns an error message if invalid.
    fn validate(&self, value: &str) -> Result<(), String>;

    /// Returns the error message for this validator.
    fn message(&self) -> &str;
}

/// Runs every validator against `value` and records each failure under
/// `field`.
pub fn check(errors: &mut ValidationErrors, field: &str, value: &str, validators: &[&dyn Validator]) {
    for validator in validators {
        if let Err(message) = validator.validate(value) {
            errors.add(field, message);
        }
    }
}

/// Validator that requires a non-blank value.
#[derive(Debug, Clone)]
pub struct RequiredValidator {
    message: String,
}

impl RequiredValidator {
    /// Creates a new RequiredValidator with default message.
    #[must_use]
    pub fn new() -> Self {
        Self::with_message("This field is required")
    }

    /// Creates a new RequiredValidator with custom message.
    #[must_use]
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for RequiredValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for RequiredValidator {
    fn validate(&self, value: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            Err(self.message.clone())
        } else {
            Ok(())
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Validator that enforces a maximum length in characters.
#[derive(Debug, Clone)]
pub struct MaxLengthValidator {
    max_length: usize,
    message: String,
}

impl MaxLengthValidator {
    /// Creates a new MaxLengthValidator.
    #[must_use]
    pub fn new(max_length: usize) -> Self {
        Self::with_message(
            max_length,
            format!("Please enter at most {max_length} characters"),
        )
    }

    /// Creates a new MaxLengthValidator with custom message.
    #[must_use]
    pub fn with_message(max_length: usize, message: impl Into<String>) -> Self {
        Self {
            max_length,
            message: message.into(),
        }
    }
}

impl Validator for MaxLengthValidator {
    fn validate(&self, value: &str) -> Result<(), String> {
        if value.chars().count() > self.max_length {
            Err(self.message.clone())
        } else {
            Ok(())
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Validator that enforces a minimum length in characters.
#[derive(Debug, Clone)]
pub struct MinLengthValidator {
    min_length: usize,
    message: String,
}

impl MinLengthValidator {
    /// Creates a new MinLengthValidator.
    #[must_use]
    pub fn new(min_length: usize) -> Self {
        Self::with_message(
            min_length,
            format!("Please enter at least {min_length} characters"),
        )
    }

    /// Creates a new MinLengthValidator with custom message.
    #[must_use]
    pub fn with_message(min_length: usize, message: impl Into<String>) -> Self {
        Self {
            min_length,
            message: message.into(),
        }
    }
}

impl Validator for MinLengthValidator {
    fn validate(&self, value: &str) -> Result<(), String> {
        if value.chars().count() < self.min_length {
            Err(self.message.clone())
        } else {
            Ok(())
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Validator for email addresses.
#[derive(Debug, Clone)]
pub struct EmailValidator {
    message: String,
}

impl EmailValidator {
    /// Creates a new EmailValidator with default message.
    #[must_use]
    pub fn new() -> Self {
        Self::with_message("Invalid email")
    }

    /// Creates a new EmailValidator with custom message.
    #[must_use]
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for EmailValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for EmailValidator {
    fn validate(&self, value: &str) -> Result<(), String> {
        if EMAIL.is_match(value) {
            Ok(())
        } else {
            Err(self.message.clone())
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Character classes a value can be required to contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// An ASCII letter.
    Letter,
    /// An ASCII digit.
    Digit,
}

impl CharClass {
    fn matches(self, c: char) -> bool {
        match self {
            Self::Letter => c.is_ascii_alphabetic(),
            Self::Digit => c.is_ascii_digit(),
        }
    }
}

/// Validator that requires at least one character of a class.
#[derive(Debug, Clone)]
pub struct ContainsValidator {
    class: CharClass,
    message: String,
}

impl ContainsValidator {
    /// Creates a new ContainsValidator.
    #[must_use]
    pub fn new(class: CharClass, message: impl Into<String>) -> Self {
        Self {
            class,
            message: message.into(),
        }
    }
}

impl Validator for ContainsValidator {
    fn validate(&self, value: &str) -> Result<(), String> {
        if value.chars().any(|c| self.class.matches(c)) {
            Ok(())
        } else {
            Err(self.message.clone())
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Validator for integers within an inclusive range.
#[derive(Debug, Clone)]
pub struct IntegerValidator {
    min: Option<i64>,
    max: Option<i64>,
    message: String,
}

impl IntegerValidator {
    /// Creates a new IntegerValidator with optional bounds.
    #[must_use]
    pub fn new(min: Option<i64>, max: Option<i64>) -> Self {
        let message = match (min, max) {
            (Some(min), Some(max)) => format!("Value must be between {min} and {max}"),
            (Some(min), None) => format!("Value must be at least {min}"),
            (None, Some(max)) => format!("Value must be at most {max}"),
            (None, None) => "Enter a whole number".to_string(),
        };
        Self { min, max, message }
    }

    /// Creates a new IntegerValidator with custom message.
    #[must_use]
    pub fn with_message(min: Option<i64>, max: Option<i64>, message: impl Into<String>) -> Self {
        Self {
            min,
            max,
            message: message.into(),
        }
    }
}

impl Validator for IntegerValidator {
    fn validate(&self, value: &str) -> Result<(), String> {
        let num: i64 = value.trim().parse().map_err(|_| self.message.clone())?;

        if self.min.is_some_and(|min| num < min) || self.max.is_some_and(|max| num > max) {
            return Err(self.message.clone());
        }

        Ok(())
    }

    fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_validator() {
        let v = RequiredValidator::with_message("Name is required");
        assert!(v.validate("Ursula").is_ok());
        assert_eq!(v.validate("").unwrap_err(), "Name is required");
        assert!(v.validate("   ").is_err());
    }

    #[test]
    fn test_length_validators_count_characters() {
        let max = MaxLengthValidator::new(5);
        assert!(max.validate("Čapek").is_ok());
        assert!(max.validate("Le Guin").is_err());

        let min = MinLengthValidator::new(6);
        assert!(min.validate("abc123").is_ok());
        assert!(min.validate("ab1").is_err());
    }

    #[test]
    fn test_email_validator() {
        let v = EmailValidator::new();
        assert!(v.validate("reader@example.com").is_ok());
        assert!(v.validate("first.last@library.co.uk").is_ok());
        assert!(v.validate("invalid").is_err());
        assert!(v.validate("@example.com").is_err());
    }

    #[test]
    fn test_contains_validator() {
        let letter = ContainsValidator::new(CharClass::Letter, "needs a letter");
        let digit = ContainsValidator::new(CharClass::Digit, "needs a digit");
        assert!(letter.validate("123a").is_ok());
        assert!(letter.validate("123456").is_err());
        assert!(digit.validate("secret1").is_ok());
        assert!(digit.validate("secret").is_err());
    }

    #[test]
    fn test_integer_validator() {
        let v = IntegerValidator::new(Some(0), Some(9999));
        assert!(v.validate("1969").is_ok());
        assert!(v.validate("0").is_ok());
        assert!(v.validate("-1").is_err());
        assert!(v.validate("10000").is_err());
        assert!(v.validate("1969.5").is_err());
        assert!(v.validate("soon").is_err());
    }

    #[test]
    fn test_check_records_every_failure() {
        let mut errors = ValidationErrors::new();
        let min = MinLengthValidator::new(6);
        let digit = ContainsValidator::new(CharClass::Digit, "needs a digit");
        check(&mut errors, "password", "abc", &[&min, &digit]);
        assert_eq!(
            errors.get("password"),
            ["Please enter at least 6 characters", "needs a digit"]
        );
    }
}
