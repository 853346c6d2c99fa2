//! libris server
//!
//! Serves the library catalog over HTTP.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use libris_auth::User;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use libris_app::models::create_schema;
use libris_app::{server, App, AppState, Config};

const SESSION_SWEEP_PERIOD: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    let log_level = if config.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database)
        .await?;
    create_schema(&pool).await?;

    if let (Some(email), Some(password)) = (&config.librarian_email, &config.librarian_password) {
        seed_librarian(&pool, email, password).await?;
    }

    server::spawn_session_sweeper(pool.clone(), SESSION_SWEEP_PERIOD);

    let listener = TcpListener::bind(config.listen_addr()).await?;
    info!("libris running at http://{}{}", config.listen_addr(), config.base_path());

    let app = Arc::new(App::new(AppState::new(pool, config))?);
    server::serve(app, listener).await?;
    Ok(())
}

/// Creates the librarian account unless the e-mail is already registered.
async fn seed_librarian(pool: &SqlitePool, email: &str, password: &str) -> anyhow::Result<()> {
    if User::email_exists(pool, email).await? {
        info!(email, "librarian account already exists");
        return Ok(());
    }

    let mut librarian = User::create_librarian("Head", "Librarian", email, password)?;
    librarian.save(pool).await?;
    info!(email, user_id = librarian.user_id, "librarian account created");
    Ok(())
}
