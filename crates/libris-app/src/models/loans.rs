//! Borrowing and returning books.
//!
//! A loan is a row in `borrows` plus one copy moved from `books.available`
//! to `books.borrowed`. Both changes happen in one transaction.

use chrono::{DateTime, Utc};
use libris_auth::User;
use sqlx::{FromRow, Row, SqlitePool};
use thiserror::Error;
use tracing::{debug, info};

use crate::error::Result;

/// Why a loan could not be made or ended.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoanRefusal {
    /// No copy is on the shelf.
    #[error("This book is not available at the moment")]
    Unavailable,
    /// The user already holds a copy.
    #[error("You have already borrowed this book")]
    AlreadyBorrowed,
    /// The user holds the maximum number of books.
    #[error("You can borrow at most {0} books at a time")]
    LimitReached(i64),
    /// The user does not hold this book.
    #[error("You have not borrowed this book")]
    NotBorrowed,
    /// The book does not exist.
    #[error("Book not found")]
    UnknownBook,
}

/// A book held by a user.
#[derive(Debug, Clone, FromRow)]
pub struct Loan {
    /// Borrowed book.
    pub book_id: i64,
    /// Title of the book.
    pub title: String,
    /// Author's given name.
    pub author_name: String,
    /// Author's family name.
    pub author_surname: String,
    /// When the book was borrowed.
    pub borrow_date: DateTime<Utc>,
}

/// A reader with the books they hold.
#[derive(Debug, Clone)]
pub struct ReaderLoans {
    /// The reader.
    pub reader: User,
    /// Their loans, oldest first.
    pub loans: Vec<Loan>,
}

/// Lends one copy of a book to `user`.
///
/// The outer `Result` carries database failures; the inner one tells whether
/// the loan was refused.
pub async fn borrow(
    pool: &SqlitePool,
    user: &User,
    book_id: i64,
    max_borrowed: i64,
) -> Result<std::result::Result<(), LoanRefusal>> {
    let mut tx = pool.begin().await?;

    let Some(row) = sqlx::query("SELECT available FROM books WHERE book_id = ?")
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?
    else {
        return Ok(Err(LoanRefusal::UnknownBook));
    };
    let available: i64 = row.get(0);

    let held = sqlx::query("SELECT COUNT(*) FROM borrows WHERE user_id = ? AND book_id = ?")
        .bind(user.user_id)
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await?
        .get::<i64, _>(0);
    let count = sqlx::query("SELECT COUNT(*) FROM borrows WHERE user_id = ?")
        .bind(user.user_id)
        .fetch_one(&mut *tx)
        .await?
        .get::<i64, _>(0);

    let refusal = if held > 0 {
        Some(LoanRefusal::AlreadyBorrowed)
    } else if available < 1 {
        Some(LoanRefusal::Unavailable)
    } else if count >= max_borrowed {
        Some(LoanRefusal::LimitReached(max_borrowed))
    } else {
        None
    };
    if let Some(refusal) = refusal {
        debug!(user_id = user.user_id, book_id, %refusal, "loan refused");
        return Ok(Err(refusal));
    }

    sqlx::query("INSERT INTO borrows (user_id, book_id, borrow_date) VALUES (?, ?, ?)")
        .bind(user.user_id)
        .bind(book_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;
    sqlx::query(
        "UPDATE books SET available = available - 1, borrowed = borrowed + 1 WHERE book_id = ?",
    )
    .bind(book_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    info!(user_id = user.user_id, book_id, "book borrowed");
    Ok(Ok(()))
}

/// Takes back the copy of a book held by `user`.
pub async fn return_book(
    pool: &SqlitePool,
    user: &User,
    book_id: i64,
) -> Result<std::result::Result<(), LoanRefusal>> {
    let mut tx = pool.begin().await?;

    let deleted = sqlx::query("DELETE FROM borrows WHERE user_id = ? AND book_id = ?")
        .bind(user.user_id)
        .bind(book_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    if deleted == 0 {
        return Ok(Err(LoanRefusal::NotBorrowed));
    }

    sqlx::query(
        "UPDATE books SET available = available + 1, borrowed = borrowed - 1 WHERE book_id = ?",
    )
    .bind(book_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    info!(user_id = user.user_id, book_id, "book returned");
    Ok(Ok(()))
}

/// Returns whether `user` holds a copy of the book.
pub async fn is_book_taken(pool: &SqlitePool, user: &User, book_id: i64) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) FROM borrows WHERE user_id = ? AND book_id = ?")
        .bind(user.user_id)
        .bind(book_id)
        .fetch_one(pool)
        .await?;
    Ok(row.get::<i64, _>(0) > 0)
}

/// Returns how many books `user` holds.
pub async fn borrow_count(pool: &SqlitePool, user: &User) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) FROM borrows WHERE user_id = ?")
        .bind(user.user_id)
        .fetch_one(pool)
        .await?;
    Ok(row.get(0))
}

/// Returns the books `user` holds, oldest loan first.
pub async fn user_books(pool: &SqlitePool, user: &User) -> Result<Vec<Loan>> {
    let loans = sqlx::query_as::<_, Loan>(
        r#"
        SELECT books.book_id, books.title, authors.name AS author_name,
               authors.surname AS author_surname, borrows.borrow_date
        FROM borrows
        INNER JOIN books ON books.book_id = borrows.book_id
        INNER JOIN authors ON authors.author_id = books.author_id
        WHERE borrows.user_id = ?
        ORDER BY borrows.borrow_date ASC, borrows.borrow_id ASC
        "#,
    )
    .bind(user.user_id)
    .fetch_all(pool)
    .await?;
    Ok(loans)
}

/// Returns every reader who holds at least one book, by surname.
pub async fn readers_data(pool: &SqlitePool) -> Result<Vec<ReaderLoans>> {
    let mut readers = Vec::new();
    for reader in User::all_readers(pool).await? {
        let loans = user_books(pool, &reader).await?;
        if !loans.is_empty() {
            readers.push(ReaderLoans { reader, loans });
        }
    }
    Ok(readers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_pool;

    struct Fixture {
        pool: SqlitePool,
        reader: User,
        books: Vec<i64>,
    }

    async fn fixture(copies: &[i64]) -> Fixture {
        let pool = test_pool().await;
        let mut reader = User::create("Ada", "Lovelace", "ada@example.com", "engine1").unwrap();
        reader.save(&pool).await.unwrap();

        let author_id = sqlx::query("INSERT INTO authors (name, surname) VALUES ('Stanisław', 'Lem')")
            .execute(&pool)
            .await
            .unwrap()
            .last_insert_rowid();

        let mut books = Vec::new();
        for (i, available) in copies.iter().enumerate() {
            let id = sqlx::query("INSERT INTO books (title, author_id, available) VALUES (?, ?, ?)")
                .bind(format!("Book {i}"))
                .bind(author_id)
                .bind(available)
                .execute(&pool)
                .await
                .unwrap()
                .last_insert_rowid();
            books.push(id);
        }

        Fixture { pool, reader, books }
    }

    async fn counters(pool: &SqlitePool, book_id: i64) -> (i64, i64) {
        let row = sqlx::query("SELECT available, borrowed FROM books WHERE book_id = ?")
            .bind(book_id)
            .fetch_one(pool)
            .await
            .unwrap();
        (row.get(0), row.get(1))
    }

    #[tokio::test]
    async fn test_borrow_and_return_move_one_copy() {
        let f = fixture(&[2]).await;
        let book = f.books[0];

        borrow(&f.pool, &f.reader, book, 3).await.unwrap().unwrap();
        assert_eq!(counters(&f.pool, book).await, (1, 1));
        assert!(is_book_taken(&f.pool, &f.reader, book).await.unwrap());
        assert_eq!(borrow_count(&f.pool, &f.reader).await.unwrap(), 1);

        return_book(&f.pool, &f.reader, book).await.unwrap().unwrap();
        assert_eq!(counters(&f.pool, book).await, (2, 0));
        assert!(!is_book_taken(&f.pool, &f.reader, book).await.unwrap());
    }

    #[tokio::test]
    async fn test_borrow_refusals_leave_counters_alone() {
        let f = fixture(&[0, 1]).await;

        assert_eq!(
            borrow(&f.pool, &f.reader, f.books[0], 3).await.unwrap(),
            Err(LoanRefusal::Unavailable)
        );
        assert_eq!(counters(&f.pool, f.books[0]).await, (0, 0));

        borrow(&f.pool, &f.reader, f.books[1], 3).await.unwrap().unwrap();
        assert_eq!(
            borrow(&f.pool, &f.reader, f.books[1], 3).await.unwrap(),
            Err(LoanRefusal::AlreadyBorrowed)
        );
        assert_eq!(counters(&f.pool, f.books[1]).await, (0, 1));

        assert_eq!(
            borrow(&f.pool, &f.reader, 999, 3).await.unwrap(),
            Err(LoanRefusal::UnknownBook)
        );
    }

    #[tokio::test]
    async fn test_borrow_limit() {
        let f = fixture(&[1, 1, 1]).await;
        borrow(&f.pool, &f.reader, f.books[0], 2).await.unwrap().unwrap();
        borrow(&f.pool, &f.reader, f.books[1], 2).await.unwrap().unwrap();

        assert_eq!(
            borrow(&f.pool, &f.reader, f.books[2], 2).await.unwrap(),
            Err(LoanRefusal::LimitReached(2))
        );
        assert_eq!(counters(&f.pool, f.books[2]).await, (1, 0));
    }

    #[tokio::test]
    async fn test_return_without_loan_is_refused() {
        let f = fixture(&[1]).await;
        assert_eq!(
            return_book(&f.pool, &f.reader, f.books[0]).await.unwrap(),
            Err(LoanRefusal::NotBorrowed)
        );
        assert_eq!(counters(&f.pool, f.books[0]).await, (1, 0));
    }

    #[tokio::test]
    async fn test_user_books_and_readers_data() {
        let f = fixture(&[1, 1]).await;
        borrow(&f.pool, &f.reader, f.books[1], 3).await.unwrap().unwrap();
        borrow(&f.pool, &f.reader, f.books[0], 3).await.unwrap().unwrap();

        let loans = user_books(&f.pool, &f.reader).await.unwrap();
        assert_eq!(
            loans.iter().map(|l| l.book_id).collect::<Vec<_>>(),
            [f.books[1], f.books[0]]
        );

        let mut idle = User::create("Grace", "Hopper", "grace@example.com", "cobol59").unwrap();
        idle.save(&f.pool).await.unwrap();

        let readers = readers_data(&f.pool).await.unwrap();
        assert_eq!(readers.len(), 1);
        assert_eq!(readers[0].reader.user_id, f.reader.user_id);
        assert_eq!(readers[0].loans.len(), 2);
    }
}
