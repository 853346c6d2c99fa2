//! Error types for forms.

use thiserror::Error;

/// Form-specific errors.
#[derive(Debug, Error)]
pub enum FormError {
    /// Validation failed with errors.
    #[error("validation failed:\n{0}")]
    Invalid(ValidationErrors),

    /// Missing required field.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A field could not be converted to the expected type.
    #[error("invalid value for field {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// A single validation message, optionally tied to a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field name, or `None` for errors about the whole entity.
    pub field: Option<String>,
    /// Human-readable message shown in the form.
    pub message: String,
}

/// Validation errors of one entity, in the order they were found.
///
/// Forms display the messages as a list above the fields, so insertion order
/// is kept and the same message is never stored twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Creates an empty error list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an error for a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.push(Some(field.to_string()), message.into());
    }

    /// Adds an error that concerns the entity as a whole.
    pub fn add_general(&mut self, message: impl Into<String>) {
        self.push(None, message.into());
    }

    fn push(&mut self, field: Option<String>, message: String) {
        let duplicate = self
            .errors
            .iter()
            .any(|e| e.field == field && e.message == message);
        if !duplicate {
            self.errors.push(FieldError { field, message });
        }
    }

    /// Returns whether there are any errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns the messages recorded for a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.field.as_deref() == Some(field))
            .map(|e| e.message.as_str())
            .collect()
    }

    /// Returns whether a field has at least one error.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field.as_deref() == Some(field))
    }

    /// Returns all messages in insertion order.
    #[must_use]
    pub fn messages(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.message.as_str()).collect()
    }

    /// Iterates over the errors.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Appends the errors of another list.
    pub fn extend(&mut self, other: ValidationErrors) {
        for error in other.errors {
            self.push(error.field, error.message);
        }
    }

    /// Turns the list into a `Result`, failing when it is non-empty.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(FormError::Invalid(self))
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for error in &self.errors {
            match &error.field {
                Some(field) => writeln!(f, "{field}: {}", error.message)?,
                None => writeln!(f, "{}", error.message)?,
            }
        }
        Ok(())
    }
}

/// Result type alias for form operations.
pub type Result<T> = std::result::Result<T, FormError>;
