//! Data access, one module per entity.

pub mod author;
pub mod book;
pub mod loans;
pub mod paginator;

use sqlx::SqlitePool;

use crate::error::Result;

pub use author::Author;
pub use book::{Book, BookSort};
pub use loans::{Loan, LoanRefusal, ReaderLoans};
pub use paginator::{Counted, PageLink, Pagination};

const CREATE_CATALOG_TABLES_SQL: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS authors (
        author_id INTEGER PRIMARY KEY AUTOINCREMENT,
        name VARCHAR(100) NOT NULL,
        surname VARCHAR(100) NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS books (
        book_id INTEGER PRIMARY KEY AUTOINCREMENT,
        title VARCHAR(255) NOT NULL,
        author_id INTEGER NOT NULL REFERENCES authors(author_id),
        isbn VARCHAR(20),
        published_year INTEGER,
        available INTEGER NOT NULL DEFAULT 0 CHECK (available >= 0),
        borrowed INTEGER NOT NULL DEFAULT 0 CHECK (borrowed >= 0)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS borrows (
        borrow_id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
        book_id INTEGER NOT NULL REFERENCES books(book_id) ON DELETE CASCADE,
        borrow_date TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        UNIQUE (user_id, book_id)
    )
    "#,
];

/// Creates every table the application uses, in dependency order.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    libris_auth::create_tables(pool).await?;
    for sql in CREATE_CATALOG_TABLES_SQL {
        sqlx::query(sql).execute(pool).await?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    use sqlx::sqlite::SqlitePoolOptions;

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .expect("Failed to create in-memory SQLite pool");
    create_schema(&pool).await.unwrap();
    pool
}
