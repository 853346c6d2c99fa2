//! # libris-app
//!
//! A server-rendered library catalog. Visitors browse and search books,
//! readers borrow and return them, and librarians manage authors and books.
//!
//! Requests go through [`server::App::handle`]: the session is loaded, the
//! request path is dispatched to a controller action with a request-scoped
//! [`Ctx`], and the session is saved again.

pub mod config;
pub mod context;
pub mod controllers;
pub mod error;
pub mod models;
pub mod server;
pub mod state;
pub mod views;

pub use config::Config;
pub use context::Ctx;
pub use error::{AppError, Result};
pub use server::App;
pub use state::AppState;
