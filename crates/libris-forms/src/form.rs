//! Access to submitted form fields.

use std::collections::HashMap;
use std::str::FromStr;

use crate::error::{FormError, Result};

/// Decoded fields of a submitted form.
///
/// Missing fields read as empty strings, the way an HTML form submits a blank
/// input, so entity constructors can take values without special-casing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    fields: HashMap<String, String>,
}

impl FormData {
    /// Creates an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Returns a field with surrounding whitespace removed, or `""`.
    #[must_use]
    pub fn get(&self, name: &str) -> &str {
        self.fields.get(name).map_or("", |v| v.trim())
    }

    /// Returns a field if it was submitted with a non-blank value.
    #[must_use]
    pub fn optional(&self, name: &str) -> Option<&str> {
        Some(self.get(name)).filter(|v| !v.is_empty())
    }

    /// Returns a non-blank field or [`FormError::MissingField`].
    pub fn require(&self, name: &str) -> Result<&str> {
        self.optional(name)
            .ok_or_else(|| FormError::MissingField(name.to_string()))
    }

    /// Parses a non-blank field.
    pub fn parse<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(name)
            .map(|value| {
                value.parse().map_err(|err: T::Err| FormError::InvalidValue {
                    field: name.to_string(),
                    message: err.to_string(),
                })
            })
            .transpose()
    }

    /// Returns whether the field was submitted at all.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }
}

impl From<HashMap<String, String>> for FormData {
    fn from(fields: HashMap<String, String>) -> Self {
        Self { fields }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> FormData {
        [
            ("title", "  The Dispossessed "),
            ("available", "3"),
            ("published_year", ""),
            ("isbn", "abc"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_get_trims_and_defaults() {
        let form = form();
        assert_eq!(form.get("title"), "The Dispossessed");
        assert_eq!(form.get("missing"), "");
        assert!(form.contains("published_year"));
        assert!(!form.contains("missing"));
    }

    #[test]
    fn test_optional_and_require() {
        let form = form();
        assert_eq!(form.optional("published_year"), None);
        assert!(matches!(
            form.require("published_year"),
            Err(FormError::MissingField(ref f)) if f == "published_year"
        ));
        assert_eq!(form.require("available").unwrap(), "3");
    }

    #[test]
    fn test_parse() {
        let form = form();
        assert_eq!(form.parse::<i64>("available").unwrap(), Some(3));
        assert_eq!(form.parse::<i64>("published_year").unwrap(), None);
        assert!(form.parse::<i64>("isbn").is_err());
    }
}
