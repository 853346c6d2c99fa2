//! Server-side sessions: logged-in user, return-to page and flash messages.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::{AuthError, Result};
use crate::flash::{FlashKind, FlashMessage};
use crate::user::User;

/// Session data stored as JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    /// User ID if authenticated.
    pub user_id: Option<i64>,
    /// Page to go back to after logging in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_to: Option<String>,
    /// Messages waiting to be shown.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flashes: Vec<FlashMessage>,
}

impl SessionData {
    /// Returns whether there is nothing worth keeping: no user, no return-to
    /// page and no pending messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.user_id.is_none() && self.return_to.is_none() && self.flashes.is_empty()
    }
}

#[derive(FromRow)]
struct SessionRow {
    session_key: String,
    session_data: String,
    expire_date: DateTime<Utc>,
}

/// A browser session, identified by the `session_id` cookie.
#[derive(Debug, Clone)]
pub struct Session {
    /// Unique session key (64 character hex string).
    pub session_key: String,
    /// Decoded session data.
    pub data: SessionData,
    /// Session expiration timestamp.
    pub expire_date: DateTime<Utc>,
    stored: bool,
}

impl Session {
    /// Name of the cookie carrying the session key.
    pub const COOKIE_NAME: &'static str = "session_id";

    /// Default session expiration time (2 weeks).
    pub const DEFAULT_EXPIRY_DAYS: i64 = 14;

    /// Creates a new anonymous session.
    #[must_use]
    pub fn new() -> Self {
        Self {
            session_key: generate_session_key(),
            data: SessionData::default(),
            expire_date: Utc::now() + Duration::days(Self::DEFAULT_EXPIRY_DAYS),
            stored: false,
        }
    }

    /// Returns whether the session has to be written back.
    ///
    /// A session that was never stored and holds nothing is skipped, so
    /// cookie-less visitors leave no rows behind.
    #[must_use]
    pub fn needs_saving(&self) -> bool {
        self.stored || !self.data.is_empty()
    }

    /// Returns whether this session has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expire_date
    }

    /// Returns the logged-in user's ID.
    #[must_use]
    pub fn user_id(&self) -> Option<i64> {
        self.data.user_id
    }

    /// Logs `user` in under a fresh session key, dropping the old key so a
    /// key known before login cannot be reused.
    pub async fn login(&mut self, pool: &SqlitePool, user: &User) -> Result<()> {
        self.delete(pool).await?;
        self.session_key = generate_session_key();
        self.data.user_id = Some(user.user_id);
        self.extend(Self::DEFAULT_EXPIRY_DAYS);
        debug!(user_id = user.user_id, "session key regenerated");
        Ok(())
    }

    /// Destroys the session and replaces it with an empty anonymous one.
    pub async fn logout(&mut self, pool: &SqlitePool) -> Result<()> {
        self.delete(pool).await?;
        *self = Self::new();
        Ok(())
    }

    /// Remembers the page to return to after logging in.
    pub fn remember_page(&mut self, page: impl Into<String>) {
        self.data.return_to = Some(page.into());
    }

    /// Takes the remembered page, or `/` if none.
    pub fn take_return_to(&mut self) -> String {
        self.data.return_to.take().unwrap_or_else(|| "/".to_string())
    }

    /// Queues a flash message.
    pub fn add_flash(&mut self, body: impl Into<String>, kind: FlashKind) {
        self.data.flashes.push(FlashMessage::new(body, kind));
    }

    /// Drains the queued flash messages. Each message is returned once.
    pub fn take_flashes(&mut self) -> Vec<FlashMessage> {
        std::mem::take(&mut self.data.flashes)
    }

    /// Extends the session expiration.
    pub fn extend(&mut self, days: i64) {
        self.expire_date = Utc::now() + Duration::days(days);
    }

    /// Returns the `Set-Cookie` header value for this session.
    #[must_use]
    pub fn cookie(&self, path: &str) -> String {
        let path = if path.is_empty() { "/" } else { path };
        format!(
            "{}={}; Path={path}; HttpOnly; SameSite=Lax",
            Self::COOKIE_NAME,
            self.session_key
        )
    }

    /// Saves the session to the database.
    pub async fn save(&self, pool: &SqlitePool) -> Result<()> {
        let session_data = serde_json::to_string(&self.data)?;

        sqlx::query(
            r#"
            INSERT INTO sessions (session_key, session_data, expire_date, user_id)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(session_key) DO UPDATE SET
                session_data = excluded.session_data,
                expire_date = excluded.expire_date,
                user_id = excluded.user_id
            "#,
        )
        .bind(&self.session_key)
        .bind(session_data)
        .bind(self.expire_date)
        .bind(self.data.user_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Deletes the session from the database.
    pub async fn delete(&self, pool: &SqlitePool) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE session_key = ?")
            .bind(&self.session_key)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Finds an unexpired session by its key.
    pub async fn get_by_key(pool: &SqlitePool, session_key: &str) -> Result<Self> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT session_key, session_data, expire_date FROM sessions
             WHERE session_key = ? AND expire_date > ?",
        )
        .bind(session_key)
        .bind(Utc::now())
        .fetch_optional(pool)
        .await?
        .ok_or(AuthError::SessionNotFound)?;

        Ok(Self {
            session_key: row.session_key,
            data: serde_json::from_str(&row.session_data)?,
            expire_date: row.expire_date,
            stored: true,
        })
    }

    /// Loads the session named by a cookie value, or starts a new one when
    /// there is no cookie or the session is gone.
    pub async fn load(pool: &SqlitePool, session_key: Option<&str>) -> Result<Self> {
        let Some(key) = session_key else {
            return Ok(Self::new());
        };

        match Self::get_by_key(pool, key).await {
            Ok(session) => Ok(session),
            Err(AuthError::SessionNotFound | AuthError::SessionData(_)) => {
                debug!("unknown or unreadable session, starting a new one");
                Ok(Self::new())
            }
            Err(err) => Err(err),
        }
    }

    /// Deletes all expired sessions.
    pub async fn clear_expired(pool: &SqlitePool) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expire_date < ?")
            .bind(Utc::now())
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Generates a cryptographically secure session key.
fn generate_session_key() -> String {
    use rand::RngExt;
    let mut rng = rand::rng();
    let mut bytes = [0u8; 32];
    rng.fill(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// SQL to create the sessions table.
pub const CREATE_SESSION_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS sessions (
    session_key VARCHAR(64) PRIMARY KEY,
    session_data TEXT NOT NULL,
    expire_date TIMESTAMP NOT NULL,
    user_id INTEGER REFERENCES users(user_id) ON DELETE CASCADE
)
"#;

/// Creates the sessions table if it doesn't exist.
pub async fn create_session_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(CREATE_SESSION_TABLE_SQL).execute(pool).await?;
    Ok(())
}
