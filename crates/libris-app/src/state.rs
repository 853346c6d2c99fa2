//! Shared application state.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;

/// State shared by every request: the connection pool and configuration.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: SqlitePool,
    /// Application configuration.
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates the shared state.
    #[must_use]
    pub fn new(pool: SqlitePool, config: Config) -> Self {
        Self {
            pool,
            config: Arc::new(config),
        }
    }
}
