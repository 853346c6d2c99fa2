//! Authors of books in the catalog.

use libris_forms::validation::{check, MaxLengthValidator, RequiredValidator};
use libris_forms::{FormData, ValidationErrors};
use sqlx::{FromRow, Row, SqlitePool};
use tracing::info;

use crate::error::{AppError, Result};

/// An author.
#[derive(Debug, Clone, Default, FromRow)]
pub struct Author {
    /// Primary key, `0` until saved.
    pub author_id: i64,
    /// Given name.
    pub name: String,
    /// Family name.
    pub surname: String,
    /// Problems found by the last [`Author::validate`].
    #[sqlx(skip)]
    pub errors: ValidationErrors,
}

impl Author {
    /// Reads an author from a submitted form.
    #[must_use]
    pub fn from_form(data: &FormData) -> Self {
        Self {
            author_id: 0,
            name: data.get("name").to_string(),
            surname: data.get("surname").to_string(),
            errors: ValidationErrors::new(),
        }
    }

    /// Replaces the editable fields with a submitted form.
    pub fn apply_form(&mut self, data: &FormData) {
        self.name = data.get("name").to_string();
        self.surname = data.get("surname").to_string();
    }

    /// Returns "name surname".
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }

    /// Validates the author, replacing `errors`.
    pub fn validate(&mut self) {
        let mut errors = ValidationErrors::new();
        let max = MaxLengthValidator::new(100);
        check(
            &mut errors,
            "name",
            &self.name,
            &[&RequiredValidator::with_message("Name is required"), &max],
        );
        check(
            &mut errors,
            "surname",
            &self.surname,
            &[&RequiredValidator::with_message("Surname is required"), &max],
        );
        self.errors = errors;
    }

    /// Validates and inserts or updates the author.
    ///
    /// Returns `false` when validation failed; nothing is written then.
    pub async fn save(&mut self, pool: &SqlitePool) -> Result<bool> {
        self.validate();
        if !self.errors.is_empty() {
            return Ok(false);
        }

        if self.author_id == 0 {
            let result = sqlx::query("INSERT INTO authors (name, surname) VALUES (?, ?)")
                .bind(&self.name)
                .bind(&self.surname)
                .execute(pool)
                .await?;
            self.author_id = result.last_insert_rowid();
            info!(author_id = self.author_id, "author added");
        } else {
            sqlx::query("UPDATE authors SET name = ?, surname = ? WHERE author_id = ?")
                .bind(&self.name)
                .bind(&self.surname)
                .bind(self.author_id)
                .execute(pool)
                .await?;
            info!(author_id = self.author_id, "author updated");
        }

        Ok(true)
    }

    /// Deletes the author unless books still reference them.
    ///
    /// Returns `false` with an error recorded when the author has books.
    pub async fn delete(&mut self, pool: &SqlitePool) -> Result<bool> {
        let books = Self::book_count(pool, self.author_id).await?;
        if books > 0 {
            self.errors = ValidationErrors::new();
            self.errors.add_general(format!(
                "{} still has {books} book(s) in the catalog; delete or reassign them first",
                self.full_name()
            ));
            return Ok(false);
        }

        sqlx::query("DELETE FROM authors WHERE author_id = ?")
            .bind(self.author_id)
            .execute(pool)
            .await?;
        info!(author_id = self.author_id, "author deleted");
        Ok(true)
    }

    /// Returns every author, ordered by surname.
    pub async fn all(pool: &SqlitePool) -> Result<Vec<Self>> {
        let authors =
            sqlx::query_as::<_, Author>("SELECT * FROM authors ORDER BY surname, name")
                .fetch_all(pool)
                .await?;
        Ok(authors)
    }

    /// Finds an author by ID.
    pub async fn find_by_id(pool: &SqlitePool, author_id: i64) -> Result<Option<Self>> {
        let author = sqlx::query_as::<_, Author>("SELECT * FROM authors WHERE author_id = ?")
            .bind(author_id)
            .fetch_optional(pool)
            .await?;
        Ok(author)
    }

    /// Finds an author by ID, failing with [`AppError::NotFound`].
    pub async fn get(pool: &SqlitePool, author_id: i64) -> Result<Self> {
        Self::find_by_id(pool, author_id)
            .await?
            .ok_or(AppError::NotFound {
                entity: "author",
                id: author_id,
            })
    }

    /// Returns the number of authors.
    pub async fn count(pool: &SqlitePool) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) FROM authors")
            .fetch_one(pool)
            .await?;
        Ok(row.get(0))
    }

    /// Returns how many books reference an author.
    pub async fn book_count(pool: &SqlitePool, author_id: i64) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) FROM books WHERE author_id = ?")
            .bind(author_id)
            .fetch_one(pool)
            .await?;
        Ok(row.get(0))
    }
}
