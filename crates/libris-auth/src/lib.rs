//! # libris-auth
//!
//! Users, sessions and flash messages for the libris catalog.
//!
//! This crate provides:
//! - `User` with reader and librarian roles, password hashing (Argon2)
//! - `UserForm` validation for signup and profile changes
//! - `Session` storage with the return-to page and one-shot flash messages
//!
//! ```rust
//! use libris_auth::{hash_password, verify_password};
//!
//! let hash = hash_password("shelf42").expect("hashing works");
//! assert!(verify_password("shelf42", &hash));
//! assert!(!verify_password("shelf43", &hash));
//! ```

mod error;
mod flash;
mod password;
mod session;
mod user;

pub use error::{AuthError, Result};
pub use flash::{FlashKind, FlashMessage};
pub use password::{hash_password, verify_password};
pub use session::{create_session_table, Session, SessionData};
pub use user::{create_user_table, Role, User, UserForm};

use sqlx::SqlitePool;

/// Creates all authentication tables.
pub async fn create_tables(pool: &SqlitePool) -> Result<()> {
    create_user_table(pool).await?;
    create_session_table(pool).await?;
    Ok(())
}
