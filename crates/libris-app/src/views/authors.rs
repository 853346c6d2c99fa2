//! Author pages.

use crate::models::Author;

use super::{button_form, html_escape, render_errors, text_field, url};

/// Renders the author list. Edit and delete links appear only for logged-in
/// users.
#[must_use]
pub fn index(base: &str, authors: &[Author], can_manage: bool) -> String {
    if authors.is_empty() {
        return r#"<p class="text-muted">No authors yet.</p>"#.to_string() + &new_link(base, can_manage);
    }

    let rows: String = authors
        .iter()
        .map(|author| {
            let actions = if can_manage {
                format!(
                    r#"<a href="{edit}" class="btn btn-sm btn-outline-secondary">Edit</a>
            <a href="{delete}" class="btn btn-sm btn-outline-danger">Delete</a>"#,
                    edit = url(base, &format!("/authors/edit/{}", author.author_id)),
                    delete = url(base, &format!("/authors/delete/{}", author.author_id)),
                )
            } else {
                String::new()
            };
            format!(
                r#"<tr>
        <td>{surname}</td>
        <td>{name}</td>
        <td class="text-end">{actions}</td>
    </tr>"#,
                surname = html_escape(&author.surname),
                name = html_escape(&author.name),
            )
        })
        .collect();

    format!(
        r#"<table class="table table-striped">
    <thead><tr><th>Surname</th><th>Name</th><th></th></tr></thead>
    <tbody>
    {rows}
    </tbody>
</table>
{new}"#,
        new = new_link(base, can_manage),
    )
}

fn new_link(base: &str, can_manage: bool) -> String {
    if !can_manage {
        return String::new();
    }
    format!(
        r#"<a href="{}" class="btn btn-primary">Add author</a>"#,
        url(base, "/authors/new")
    )
}

/// Renders the add/edit form, posting to `action`.
#[must_use]
pub fn form(base: &str, author: &Author, action: &str) -> String {
    format!(
        r#"{errors}
<form method="post" action="{action}">
    {name}
    {surname}
    <button type="submit" class="btn btn-primary">Save</button>
    <a href="{cancel}" class="btn btn-link">Cancel</a>
</form>"#,
        errors = render_errors(&author.errors),
        action = html_escape(&url(base, action)),
        name = text_field("name", "Name", &author.name, "text"),
        surname = text_field("surname", "Surname", &author.surname, "text"),
        cancel = url(base, "/authors/index"),
    )
}

/// Renders the delete confirmation.
#[must_use]
pub fn delete(base: &str, author: &Author) -> String {
    format!(
        r#"{errors}
<p>Delete <strong>{full_name}</strong>?</p>
{button}
<a href="{cancel}" class="btn btn-link">Cancel</a>"#,
        errors = render_errors(&author.errors),
        full_name = html_escape(&author.full_name()),
        button = button_form(
            &url(base, &format!("/authors/delete/{}", author.author_id)),
            "Delete",
            "btn-danger"
        ),
        cancel = url(base, "/authors/index"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tolkien() -> Author {
        Author {
            author_id: 3,
            name: "J. R. R.".to_string(),
            surname: "Tolkien".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_index_hides_management_links_from_guests() {
        let authors = [tolkien()];

        let guest = index("", &authors, false);
        assert!(guest.contains("Tolkien"));
        assert!(!guest.contains("/authors/edit/3"));

        let member = index("", &authors, true);
        assert!(member.contains("/authors/edit/3"));
        assert!(member.contains("/authors/delete/3"));
        assert!(member.contains("/authors/new"));
    }

    #[test]
    fn test_form_shows_errors_and_values() {
        let mut author = tolkien();
        author.errors.add("surname", "Surname is required");

        let html = form("/lib", &author, "/authors/update/3");
        assert!(html.contains("Surname is required"));
        assert!(html.contains(r#"action="/lib/authors/update/3""#));
        assert!(html.contains(r#"value="J. R. R.""#));
    }

    #[test]
    fn test_delete_posts_to_itself() {
        let html = delete("", &tolkien());
        assert!(html.contains(r#"method="post" action="/authors/delete/3""#));
        assert!(html.contains("J. R. R. Tolkien"));
    }
}
