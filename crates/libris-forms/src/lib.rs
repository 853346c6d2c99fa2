//! # libris-forms
//!
//! Submitted form data and field validation for the libris catalog.
//!
//! Entities validate themselves into a [`ValidationErrors`] list that keeps
//! the order in which problems were found, so the form can redisplay them.
//!
//! ```rust
//! use libris_forms::validation::{check, EmailValidator, RequiredValidator};
//! use libris_forms::{FormData, ValidationErrors};
//!
//! let form: FormData = [("name", ""), ("email", "reader@example.com")]
//!     .into_iter()
//!     .collect();
//!
//! let mut errors = ValidationErrors::new();
//! check(
//!     &mut errors,
//!     "name",
//!     form.get("name"),
//!     &[&RequiredValidator::with_message("Name is required")],
//! );
//! check(&mut errors, "email", form.get("email"), &[&EmailValidator::new()]);
//!
//! assert_eq!(errors.messages(), ["Name is required"]);
//! ```

mod error;
mod form;
pub mod validation;

pub use error::{FieldError, FormError, Result, ValidationErrors};
pub use form::FormData;
