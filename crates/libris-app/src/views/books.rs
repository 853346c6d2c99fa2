//! Catalog pages.

use crate::models::{Author, Book, BookSort, PageLink, Pagination};

use super::{button_form, html_escape, render_errors, text_field, url};

/// Query parameters that shape the catalog list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    /// Rows per page.
    pub limit: i64,
    /// Page links on each side of the current page.
    pub links: i64,
    /// Row order.
    pub sort: BookSort,
}

impl ListQuery {
    fn href(&self, base: &str, page: i64) -> String {
        url(
            base,
            &format!(
                "/books/index?limit={}&page={page}&links={}&sort={}",
                self.limit,
                self.links,
                self.sort.as_str()
            ),
        )
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            limit: 5,
            links: 2,
            sort: BookSort::Title,
        }
    }
}

/// Renders one page of the catalog with its sort menu and page links.
pub fn index(
    base: &str,
    books: &[Book],
    pagination: &Pagination,
    query: ListQuery,
    can_manage: bool,
) -> String {
    format!(
        "{sort}\n{table}\n{pages}\n{new}",
        sort = sort_menu(base, query),
        table = book_table(base, books),
        pages = page_links(base, pagination, query),
        new = if can_manage {
            format!(
                r#"<a href="{}" class="btn btn-primary">Add book</a>"#,
                url(base, "/books/new")
            )
        } else {
            String::new()
        },
    )
}

/// Renders search results.
#[must_use]
pub fn search(base: &str, term: &str, books: &[Book]) -> String {
    format!(
        r#"<p>Results for <strong>{term}</strong>:</p>
{table}"#,
        term = html_escape(term),
        table = book_table(base, books),
    )
}

fn sort_menu(base: &str, query: ListQuery) -> String {
    let options: String = BookSort::ALL
        .iter()
        .map(|sort| {
            let selected = if *sort == query.sort { " selected" } else { "" };
            format!(
                r#"<option value="{value}"{selected}>{label}</option>"#,
                value = sort.as_str(),
                label = sort_label(*sort),
            )
        })
        .collect();

    format!(
        r#"<form method="get" action="{action}" class="row g-2 mb-3">
    <input type="hidden" name="limit" value="{limit}">
    <input type="hidden" name="links" value="{links}">
    <div class="col-auto">
        <select name="sort" class="form-select">
            <option value="default">Sort by...</option>
            {options}
        </select>
    </div>
    <div class="col-auto"><button type="submit" class="btn btn-outline-secondary">Sort</button></div>
</form>"#,
        action = url(base, "/books/index"),
        limit = query.limit,
        links = query.links,
    )
}

fn sort_label(sort: BookSort) -> &'static str {
    match sort {
        BookSort::Title => "Title",
        BookSort::Author => "Author",
        BookSort::Year => "Year published",
        BookSort::Available => "Copies available",
    }
}

fn book_table(base: &str, books: &[Book]) -> String {
    if books.is_empty() {
        return r#"<p class="text-muted">No books in the catalog.</p>"#.to_string();
    }

    let rows: String = books
        .iter()
        .map(|book| {
            format!(
                r#"<tr>
        <td><a href="{href}">{title}</a></td>
        <td>{author}</td>
        <td>{year}</td>
        <td>{available}</td>
    </tr>"#,
                href = url(base, &format!("/books/show/{}", book.book_id)),
                title = html_escape(&book.title),
                author = html_escape(&book.author_full_name()),
                year = book.published_year.map(|y| y.to_string()).unwrap_or_default(),
                available = book.available,
            )
        })
        .collect();

    format!(
        r#"<table class="table table-striped">
    <thead><tr><th>Title</th><th>Author</th><th>Year</th><th>Available</th></tr></thead>
    <tbody>
    {rows}
    </tbody>
</table>"#
    )
}

fn page_links(base: &str, pagination: &Pagination, query: ListQuery) -> String {
    if pagination.is_single_page() {
        return String::new();
    }

    let item = |label: &str, page: Option<i64>, active: bool| -> String {
        match page {
            Some(page) => format!(
                r#"<li class="page-item{active}"><a class="page-link" href="{href}">{label}</a></li>"#,
                active = if active { " active" } else { "" },
                href = html_escape(&query.href(base, page)),
            ),
            None => format!(
                r#"<li class="page-item disabled"><span class="page-link">{label}</span></li>"#
            ),
        }
    };

    let mut items = item("&laquo;", pagination.previous, false);
    for link in &pagination.links {
        items.push_str(&match link {
            PageLink::Page(page, current) => item(&page.to_string(), Some(*page), *current),
            PageLink::Gap => item("&hellip;", None, false),
        });
    }
    items.push_str(&item("&raquo;", pagination.next, false));

    format!(r#"<nav><ul class="pagination">{items}</ul></nav>"#)
}

/// What the current visitor may do with a book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BookActions {
    /// Logged in and not holding the book.
    pub can_borrow: bool,
    /// Holding the book.
    pub can_return: bool,
    /// Librarian.
    pub can_manage: bool,
}

/// Renders a single book.
#[must_use]
pub fn show(base: &str, book: &Book, actions: BookActions) -> String {
    let id = book.book_id;
    let mut buttons = String::new();
    if actions.can_borrow && book.available > 0 {
        buttons.push_str(&button_form(
            &url(base, &format!("/books/borrow/{id}")),
            "Borrow",
            "btn-primary",
        ));
    }
    if actions.can_return {
        buttons.push_str(&button_form(
            &url(base, &format!("/books/return/{id}")),
            "Return",
            "btn-outline-primary",
        ));
    }
    if actions.can_manage {
        buttons.push_str(&format!(
            r#" <a href="{edit}" class="btn btn-outline-secondary">Edit</a> <a href="{delete}" class="btn btn-outline-danger">Delete</a>"#,
            edit = url(base, &format!("/books/edit/{id}")),
            delete = url(base, &format!("/books/delete/{id}")),
        ));
    }

    format!(
        r#"<dl class="row">
    <dt class="col-sm-3">Title</dt><dd class="col-sm-9">{title}</dd>
    <dt class="col-sm-3">Author</dt><dd class="col-sm-9">{author}</dd>
    <dt class="col-sm-3">ISBN</dt><dd class="col-sm-9">{isbn}</dd>
    <dt class="col-sm-3">Published</dt><dd class="col-sm-9">{year}</dd>
    <dt class="col-sm-3">Available</dt><dd class="col-sm-9">{available}</dd>
    <dt class="col-sm-3">On loan</dt><dd class="col-sm-9">{borrowed}</dd>
</dl>
<div>{buttons}</div>"#,
        title = html_escape(&book.title),
        author = html_escape(&book.author_full_name()),
        isbn = html_escape(book.isbn.as_deref().unwrap_or("")),
        year = book.published_year.map(|y| y.to_string()).unwrap_or_default(),
        available = book.available,
        borrowed = book.borrowed,
    )
}

/// Renders the add/edit form, posting to `action`.
#[must_use]
pub fn form(base: &str, book: &Book, authors: &[Author], action: &str) -> String {
    let options: String = authors
        .iter()
        .map(|author| {
            let selected = if author.author_id == book.author_id { " selected" } else { "" };
            format!(
                r#"<option value="{id}"{selected}>{name}</option>"#,
                id = author.author_id,
                name = html_escape(&author.full_name()),
            )
        })
        .collect();
    let year = book.published_year.map(|y| y.to_string()).unwrap_or_default();

    format!(
        r#"{errors}
<form method="post" action="{action}">
    {title}
    <div class="mb-3">
        <label for="input_author_id" class="form-label">Author</label>
        <select id="input_author_id" name="author_id" class="form-select">
            <option value="">Choose...</option>
            {options}
        </select>
    </div>
    {isbn}
    {year}
    {available}
    <button type="submit" class="btn btn-primary">Save</button>
    <a href="{cancel}" class="btn btn-link">Cancel</a>
</form>"#,
        errors = render_errors(&book.errors),
        action = html_escape(&url(base, action)),
        title = text_field("title", "Title", &book.title, "text"),
        isbn = text_field("isbn", "ISBN", book.isbn.as_deref().unwrap_or(""), "text"),
        year = text_field("published_year", "Year published", &year, "number"),
        available = text_field("available", "Copies available", &book.available.to_string(), "number"),
        cancel = url(base, "/books/index"),
    )
}

/// Renders the delete confirmation.
#[must_use]
pub fn delete(base: &str, book: &Book) -> String {
    format!(
        r#"{errors}
<p>Delete <strong>{title}</strong> by {author}?</p>
{button}
<a href="{cancel}" class="btn btn-link">Cancel</a>"#,
        errors = render_errors(&book.errors),
        title = html_escape(&book.title),
        author = html_escape(&book.author_full_name()),
        button = button_form(
            &url(base, &format!("/books/delete/{}", book.book_id)),
            "Delete",
            "btn-danger"
        ),
        cancel = url(base, &format!("/books/show/{}", book.book_id)),
    )
}
