//! Error types for the application.

use libris_auth::AuthError;
use libris_forms::FormError;
use libris_router::{Halt, Response, RouterError};
use thiserror::Error;

use crate::views;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Authentication or session error.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Form data error.
    #[error("form error: {0}")]
    Form(#[from] FormError),

    /// Route table error.
    #[error("routing error: {0}")]
    Router(#[from] RouterError),

    /// The requested record does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// The route did not provide a usable record id.
    #[error("missing or invalid id parameter")]
    MissingId,
}

impl From<AppError> for Halt {
    fn from(err: AppError) -> Self {
        match err {
            AppError::NotFound { .. } | AppError::MissingId => {
                Halt::Respond(views::errors::page(404, &err.to_string()))
            }
            err => Halt::failed(err),
        }
    }
}

impl AppError {
    /// Renders this error as a page, for failures outside an action.
    #[must_use]
    pub fn into_response(self) -> Response {
        match Halt::from(self) {
            Halt::Respond(response) => response,
            Halt::Failed(_) => views::errors::page(500, "Something went wrong"),
        }
    }
}

/// Result type alias for application operations.
pub type Result<T> = std::result::Result<T, AppError>;
