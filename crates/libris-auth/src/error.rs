//! Error types for authentication.

use thiserror::Error;

/// Authentication-specific errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Session data could not be encoded or decoded.
    #[error("session data error: {0}")]
    SessionData(#[from] serde_json::Error),

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// Session not found or expired.
    #[error("session not found or expired")]
    SessionNotFound,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHashError,

    /// A stored role name is not known.
    #[error("unknown role: {0}")]
    UnknownRole(String),
}

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;
