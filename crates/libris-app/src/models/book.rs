//! Books in the catalog.

use libris_forms::validation::{check, IntegerValidator, MaxLengthValidator, RequiredValidator};
use libris_forms::{FormData, ValidationErrors};
use sqlx::{FromRow, Row, SqlitePool};
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::models::author::Author;

const SELECT_BOOKS: &str = r#"
SELECT books.*, authors.name AS author_name, authors.surname AS author_surname
FROM books
INNER JOIN authors ON authors.author_id = books.author_id
"#;

/// A catalog entry with its copy counters.
#[derive(Debug, Clone, Default, FromRow)]
pub struct Book {
    /// Primary key, `0` until saved.
    pub book_id: i64,
    /// Title.
    pub title: String,
    /// Author reference.
    pub author_id: i64,
    /// ISBN, if known.
    pub isbn: Option<String>,
    /// Year of publication, if known.
    pub published_year: Option<i64>,
    /// Copies on the shelf.
    pub available: i64,
    /// Copies out on loan.
    pub borrowed: i64,
    /// Author's given name, filled by catalog queries.
    #[sqlx(default)]
    pub author_name: String,
    /// Author's family name, filled by catalog queries.
    #[sqlx(default)]
    pub author_surname: String,
    /// Problems found by the last [`Book::validate`].
    #[sqlx(skip)]
    pub errors: ValidationErrors,
}

/// Column the book list is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BookSort {
    /// Alphabetical by title.
    #[default]
    Title,
    /// By author surname, then title.
    Author,
    /// Newest publication first.
    Year,
    /// Most copies on the shelf first.
    Available,
}

impl BookSort {
    /// Parses a `sort` query value. Unknown values are `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "title" => Some(Self::Title),
            "author" => Some(Self::Author),
            "year" => Some(Self::Year),
            "available" => Some(Self::Available),
            _ => None,
        }
    }

    /// Returns the `sort` query value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::Year => "year",
            Self::Available => "available",
        }
    }

    fn order_by(&self) -> &'static str {
        match self {
            Self::Title => "books.title ASC",
            Self::Author => "authors.surname ASC, authors.name ASC, books.title ASC",
            Self::Year => "books.published_year DESC, books.title ASC",
            Self::Available => "books.available DESC, books.title ASC",
        }
    }

    /// All orders, in the order the sort menu lists them.
    pub const ALL: [BookSort; 4] = [Self::Title, Self::Author, Self::Year, Self::Available];
}

/// Fields whose raw value could not be parsed keep a validation error; the
/// number stays at its previous value.
fn read_number(
    data: &FormData,
    field: &str,
    validator: &IntegerValidator,
    errors: &mut ValidationErrors,
) -> Option<i64> {
    let raw = data.get(field);
    if raw.is_empty() {
        return None;
    }
    check(errors, field, raw, &[validator]);
    raw.parse().ok()
}

impl Book {
    /// Reads a book from a submitted form.
    #[must_use]
    pub fn from_form(data: &FormData) -> Self {
        let mut book = Self::default();
        book.apply_form(data);
        book
    }

    /// Replaces the editable fields with a submitted form.
    ///
    /// Numbers that fail to parse are reported when the book is validated.
    pub fn apply_form(&mut self, data: &FormData) {
        let mut errors = ValidationErrors::new();

        self.title = data.get("title").to_string();
        self.author_id = data.parse("author_id").ok().flatten().unwrap_or(0);
        self.isbn = data.optional("isbn").map(str::to_string);

        let available = IntegerValidator::with_message(
            Some(0),
            None,
            "Available copies must be a whole number of at least 0",
        );
        match read_number(data, "available", &available, &mut errors) {
            Some(n) => self.available = n,
            None if data.get("available").is_empty() => self.available = 0,
            None => {}
        }

        let year = IntegerValidator::with_message(
            Some(0),
            Some(9999),
            "Published year must be between 0 and 9999",
        );
        self.published_year = read_number(data, "published_year", &year, &mut errors);

        self.errors = errors;
    }

    /// Returns "name surname" of the author.
    #[must_use]
    pub fn author_full_name(&self) -> String {
        format!("{} {}", self.author_name, self.author_surname)
    }

    /// Validates the book, keeping errors found while reading the form.
    pub async fn validate(&mut self, pool: &SqlitePool) -> Result<()> {
        let mut errors = std::mem::take(&mut self.errors);

        check(
            &mut errors,
            "title",
            &self.title,
            &[
                &RequiredValidator::with_message("Title is required"),
                &MaxLengthValidator::new(255),
            ],
        );

        if self.available < 0 {
            errors.add("available", "Available copies must be a whole number of at least 0");
        }

        if Author::find_by_id(pool, self.author_id).await?.is_none() {
            errors.add("author_id", "Please select an existing author");
        }

        self.errors = errors;
        Ok(())
    }

    /// Validates and inserts or updates the book.
    ///
    /// Returns `false` when validation failed; nothing is written then.
    pub async fn save(&mut self, pool: &SqlitePool) -> Result<bool> {
        self.validate(pool).await?;
        if !self.errors.is_empty() {
            return Ok(false);
        }

        if self.book_id == 0 {
            let result = sqlx::query(
                r#"
                INSERT INTO books (title, author_id, isbn, published_year, available, borrowed)
                VALUES (?, ?, ?, ?, ?, 0)
                "#,
            )
            .bind(&self.title)
            .bind(self.author_id)
            .bind(&self.isbn)
            .bind(self.published_year)
            .bind(self.available)
            .execute(pool)
            .await?;
            self.book_id = result.last_insert_rowid();
            info!(book_id = self.book_id, "book added");
        } else {
            sqlx::query(
                r#"
                UPDATE books
                SET title = ?, author_id = ?, isbn = ?, published_year = ?, available = ?
                WHERE book_id = ?
                "#,
            )
            .bind(&self.title)
            .bind(self.author_id)
            .bind(&self.isbn)
            .bind(self.published_year)
            .bind(self.available)
            .bind(self.book_id)
            .execute(pool)
            .await?;
            info!(book_id = self.book_id, "book updated");
        }

        Ok(true)
    }

    /// Deletes the book unless copies are out on loan.
    ///
    /// Returns `false` with an error recorded when copies are borrowed.
    pub async fn delete(&mut self, pool: &SqlitePool) -> Result<bool> {
        if self.borrowed > 0 {
            self.errors = ValidationErrors::new();
            self.errors.add_general(format!(
                "{} copies of \"{}\" are still on loan",
                self.borrowed, self.title
            ));
            return Ok(false);
        }

        sqlx::query("DELETE FROM books WHERE book_id = ?")
            .bind(self.book_id)
            .execute(pool)
            .await?;
        info!(book_id = self.book_id, "book deleted");
        Ok(true)
    }

    /// Returns one page of the catalog.
    ///
    /// `page` counts from 1; pages past the end are empty.
    pub async fn page(pool: &SqlitePool, limit: i64, page: i64, sort: BookSort) -> Result<Vec<Self>> {
        let limit = limit.max(1);
        let offset = (page.max(1) - 1).saturating_mul(limit);
        debug!(limit, offset, sort = sort.as_str(), "loading book page");

        let sql = format!("{SELECT_BOOKS} ORDER BY {} LIMIT ? OFFSET ?", sort.order_by());
        let books = sqlx::query_as::<_, Book>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;
        Ok(books)
    }

    /// Finds books whose title or author name contains `term`.
    pub async fn search(pool: &SqlitePool, term: &str) -> Result<Vec<Self>> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let pattern = format!("%{term}%");
        let sql = format!(
            "{SELECT_BOOKS} WHERE books.title LIKE ?1 OR authors.name LIKE ?1 \
             OR authors.surname LIKE ?1 ORDER BY books.title ASC"
        );
        let books = sqlx::query_as::<_, Book>(&sql)
            .bind(pattern)
            .fetch_all(pool)
            .await?;
        Ok(books)
    }

    /// Finds a book by ID.
    pub async fn find_by_id(pool: &SqlitePool, book_id: i64) -> Result<Option<Self>> {
        let sql = format!("{SELECT_BOOKS} WHERE books.book_id = ?");
        let book = sqlx::query_as::<_, Book>(&sql)
            .bind(book_id)
            .fetch_optional(pool)
            .await?;
        Ok(book)
    }

    /// Finds a book by ID, failing with [`AppError::NotFound`].
    pub async fn get(pool: &SqlitePool, book_id: i64) -> Result<Self> {
        Self::find_by_id(pool, book_id)
            .await?
            .ok_or(AppError::NotFound {
                entity: "book",
                id: book_id,
            })
    }

    /// Returns the number of catalog entries.
    pub async fn count(pool: &SqlitePool) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) FROM books")
            .fetch_one(pool)
            .await?;
        Ok(row.get(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_pool;

    async fn author(pool: &SqlitePool, name: &str, surname: &str) -> i64 {
        let mut author = Author::from_form(&FormData::new().with("name", name).with("surname", surname));
        author.save(pool).await.unwrap();
        author.author_id
    }

    fn form(title: &str, author_id: i64, available: &str, year: &str) -> FormData {
        FormData::new()
            .with("title", title)
            .with("author_id", author_id.to_string())
            .with("available", available)
            .with("published_year", year)
    }

    async fn add(pool: &SqlitePool, title: &str, author_id: i64, available: &str, year: &str) -> Book {
        let mut book = Book::from_form(&form(title, author_id, available, year));
        assert!(book.save(pool).await.unwrap(), "{:?}", book.errors);
        book
    }

    #[test]
    fn test_sort_parse() {
        assert_eq!(BookSort::parse("author"), Some(BookSort::Author));
        assert_eq!(BookSort::parse("default"), None);
        for sort in BookSort::ALL {
            assert_eq!(BookSort::parse(sort.as_str()), Some(sort));
        }
    }

    #[tokio::test]
    async fn test_validation_messages() {
        let pool = test_pool().await;
        let mut book = Book::from_form(&form("", 42, "-1", "12000"));
        assert!(!book.save(&pool).await.unwrap());
        assert_eq!(
            book.errors.messages(),
            [
                "Available copies must be a whole number of at least 0",
                "Published year must be between 0 and 9999",
                "Title is required",
                "Please select an existing author",
            ]
        );
        assert_eq!(Book::count(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_non_numeric_values_are_rejected() {
        let pool = test_pool().await;
        let author_id = author(&pool, "Stanisław", "Lem").await;
        let mut book = Book::from_form(&form("Solaris", author_id, "three", ""));
        assert!(!book.save(&pool).await.unwrap());
        assert_eq!(book.errors.get("available").len(), 1);
        assert_eq!(book.published_year, None);
    }

    #[tokio::test]
    async fn test_save_find_and_update() {
        let pool = test_pool().await;
        let author_id = author(&pool, "Stanisław", "Lem").await;
        let mut book = add(&pool, "Solaris", author_id, "2", "1961").await;

        let stored = Book::get(&pool, book.book_id).await.unwrap();
        assert_eq!(stored.title, "Solaris");
        assert_eq!(stored.author_full_name(), "Stanisław Lem");
        assert_eq!(stored.published_year, Some(1961));
        assert_eq!(stored.borrowed, 0);

        book.apply_form(&form("Solaris", author_id, "4", ""));
        assert!(book.save(&pool).await.unwrap());
        let stored = Book::get(&pool, book.book_id).await.unwrap();
        assert_eq!(stored.available, 4);
        assert_eq!(stored.published_year, None);
    }

    #[tokio::test]
    async fn test_page_and_sort() {
        let pool = test_pool().await;
        let lem = author(&pool, "Stanisław", "Lem").await;
        let asimov = author(&pool, "Isaac", "Asimov").await;
        add(&pool, "Solaris", lem, "1", "1961").await;
        add(&pool, "Foundation", asimov, "3", "1951").await;
        add(&pool, "Cyberiad", lem, "2", "1965").await;

        let titles = |books: Vec<Book>| books.into_iter().map(|b| b.title).collect::<Vec<_>>();

        let first = Book::page(&pool, 2, 1, BookSort::Title).await.unwrap();
        assert_eq!(titles(first), ["Cyberiad", "Foundation"]);
        let second = Book::page(&pool, 2, 2, BookSort::Title).await.unwrap();
        assert_eq!(titles(second), ["Solaris"]);
        assert!(Book::page(&pool, 2, 3, BookSort::Title).await.unwrap().is_empty());

        let by_author = Book::page(&pool, 5, 1, BookSort::Author).await.unwrap();
        assert_eq!(titles(by_author), ["Foundation", "Cyberiad", "Solaris"]);
        let by_year = Book::page(&pool, 5, 1, BookSort::Year).await.unwrap();
        assert_eq!(titles(by_year), ["Cyberiad", "Solaris", "Foundation"]);
    }

    #[tokio::test]
    async fn test_search_title_and_author() {
        let pool = test_pool().await;
        let lem = author(&pool, "Stanisław", "Lem").await;
        let asimov = author(&pool, "Isaac", "Asimov").await;
        add(&pool, "Solaris", lem, "1", "").await;
        add(&pool, "Foundation", asimov, "1", "").await;

        assert_eq!(Book::search(&pool, "found").await.unwrap().len(), 1);
        assert_eq!(Book::search(&pool, "lem").await.unwrap()[0].title, "Solaris");
        assert!(Book::search(&pool, "tolkien").await.unwrap().is_empty());
        assert!(Book::search(&pool, "  ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_refused_while_on_loan() {
        let pool = test_pool().await;
        let lem = author(&pool, "Stanisław", "Lem").await;
        let book = add(&pool, "Solaris", lem, "1", "").await;

        let mut stored = Book::get(&pool, book.book_id).await.unwrap();
        stored.borrowed = 1;
        assert!(!stored.delete(&pool).await.unwrap());
        assert_eq!(stored.errors.len(), 1);

        stored.borrowed = 0;
        assert!(stored.delete(&pool).await.unwrap());
        assert!(Book::find_by_id(&pool, book.book_id).await.unwrap().is_none());
    }
}
