//! Command-line and environment configuration.

use clap::Parser;

/// Library management web application.
#[derive(Debug, Clone, Parser)]
#[command(name = "libris")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Database URL (SQLite path or connection string).
    #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite:libris.sqlite3?mode=rwc")]
    pub database: String,

    /// Address to listen on.
    #[arg(long, env = "LIBRIS_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, env = "LIBRIS_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Path prefix the application is mounted under, e.g. `/library`.
    #[arg(long, env = "LIBRIS_BASE_PATH", default_value = "")]
    pub base_path: String,

    /// How many books a reader may hold at once.
    #[arg(long, env = "LIBRIS_MAX_BORROWED", default_value_t = 3)]
    pub max_borrowed: i64,

    /// E-mail of a librarian account to create at startup.
    #[arg(long, env = "LIBRIS_LIBRARIAN_EMAIL", requires = "librarian_password")]
    pub librarian_email: Option<String>,

    /// Password of the librarian account created at startup.
    #[arg(long, env = "LIBRIS_LIBRARIAN_PASSWORD", requires = "librarian_email")]
    pub librarian_password: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Returns the socket address to bind.
    #[must_use]
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the base path without a trailing slash.
    #[must_use]
    pub fn base_path(&self) -> &str {
        self.base_path.trim_end_matches('/')
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: "sqlite:libris.sqlite3?mode=rwc".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            base_path: String::new(),
            max_borrowed: 3,
            librarian_email: None,
            librarian_password: None,
            verbose: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_arguments() {
        let config = Config::parse_from([
            "libris",
            "--database",
            "sqlite::memory:",
            "--port",
            "8080",
            "--base-path",
            "/library/",
            "--max-borrowed",
            "5",
        ]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.base_path(), "/library");
        assert_eq!(config.max_borrowed, 5);
        assert_eq!(config.listen_addr(), format!("{}:8080", config.host));
    }

    #[test]
    fn test_librarian_seed_needs_both_values() {
        let result = Config::try_parse_from(["libris", "--librarian-email", "dewey@example.com"]);
        assert!(result.is_err());
    }
}
