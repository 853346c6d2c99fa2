//! Readers and their loans, for librarians.

use crate::models::ReaderLoans;

use super::{html_escape, url};

/// Renders every reader with the books they hold.
#[must_use]
pub fn index(base: &str, readers: &[ReaderLoans]) -> String {
    if readers.is_empty() {
        return r#"<p class="text-muted">No readers have signed up yet.</p>"#.to_string();
    }

    readers
        .iter()
        .map(|entry| {
            let books = if entry.loans.is_empty() {
                r#"<li class="list-group-item text-muted">No borrowed books</li>"#.to_string()
            } else {
                entry
                    .loans
                    .iter()
                    .map(|loan| {
                        format!(
                            r#"<li class="list-group-item"><a href="{href}">{title}</a> <small class="text-muted">since {date}</small></li>"#,
                            href = url(base, &format!("/books/show/{}", loan.book_id)),
                            title = html_escape(&loan.title),
                            date = loan.borrow_date.format("%Y-%m-%d"),
                        )
                    })
                    .collect()
            };
            format!(
                r#"<div class="card mb-3">
    <div class="card-header">{name} <small class="text-muted">{email}</small></div>
    <ul class="list-group list-group-flush">{books}</ul>
</div>"#,
                name = html_escape(&entry.reader.full_name()),
                email = html_escape(&entry.reader.email),
            )
        })
        .collect()
}
