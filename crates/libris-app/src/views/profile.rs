//! The reader's own page.

use libris_auth::{User, UserForm};

use crate::models::Loan;

use super::{button_form, html_escape, render_errors, text_field, url};

/// Renders the user's details and the books they hold.
#[must_use]
pub fn show(base: &str, user: &User, loans: &[Loan], max_borrowed: i64) -> String {
    let held = if loans.is_empty() {
        r#"<p class="text-muted">You have no borrowed books.</p>"#.to_string()
    } else {
        let rows: String = loans
            .iter()
            .map(|loan| {
                format!(
                    r#"<tr>
        <td><a href="{href}">{title}</a></td>
        <td>{author}</td>
        <td>{date}</td>
        <td class="text-end">{button}</td>
    </tr>"#,
                    href = url(base, &format!("/books/show/{}", loan.book_id)),
                    title = html_escape(&loan.title),
                    author = html_escape(&format!("{} {}", loan.author_name, loan.author_surname)),
                    date = loan.borrow_date.format("%Y-%m-%d"),
                    button = button_form(
                        &url(base, &format!("/books/return/{}", loan.book_id)),
                        "Return",
                        "btn-sm btn-outline-primary"
                    ),
                )
            })
            .collect();
        format!(
            r#"<table class="table">
    <thead><tr><th>Title</th><th>Author</th><th>Borrowed</th><th></th></tr></thead>
    <tbody>
    {rows}
    </tbody>
</table>"#
        )
    };

    format!(
        r#"<p>{name} &lt;{email}&gt; <a href="{edit}" class="btn btn-sm btn-outline-secondary">Edit profile</a></p>
<h2 class="h5">Borrowed books ({count} of {max_borrowed})</h2>
{held}"#,
        name = html_escape(&user.full_name()),
        email = html_escape(&user.email),
        edit = url(base, "/profile/edit"),
        count = loans.len(),
    )
}

/// Renders the profile form. Blank password fields keep the password.
#[must_use]
pub fn edit(base: &str, form: &UserForm) -> String {
    format!(
        r#"{errors}
<form method="post" action="{action}" class="col-md-6">
    {name}
    {surname}
    {email}
    {password}
    {confirmation}
    <button type="submit" class="btn btn-primary">Save</button>
    <a href="{cancel}" class="btn btn-link">Cancel</a>
</form>"#,
        errors = render_errors(&form.errors),
        action = html_escape(&url(base, "/profile/update")),
        name = text_field("name", "Name", &form.name, "text"),
        surname = text_field("surname", "Surname", &form.surname, "text"),
        email = text_field("email", "Email", &form.email, "email"),
        password = text_field("password", "New password", "", "password"),
        confirmation = text_field("password_confirmation", "Repeat new password", "", "password"),
        cancel = url(base, "/profile/show"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_profile_lists_loans_with_return_buttons() {
        let user = User::create("Ada", "Lovelace", "ada@example.com", "engine1").unwrap();
        let loans = [Loan {
            book_id: 7,
            title: "The Hobbit".to_string(),
            author_name: "J. R. R.".to_string(),
            author_surname: "Tolkien".to_string(),
            borrow_date: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        }];

        let html = show("", &user, &loans, 3);
        assert!(html.contains("Borrowed books (1 of 3)"));
        assert!(html.contains("2024-03-01"));
        assert!(html.contains(r#"action="/books/return/7""#));
    }

    #[test]
    fn test_edit_form_posts_to_update() {
        let form = UserForm {
            name: "Ada".to_string(),
            ..UserForm::default()
        };
        let html = edit("", &form);
        assert!(html.contains(r#"action="/profile/update""#));
        assert!(html.contains(r#"value="Ada""#));
    }

    #[test]
    fn test_profile_without_loans() {
        let user = User::create("Ada", "Lovelace", "ada@example.com", "engine1").unwrap();
        assert!(show("", &user, &[], 3).contains("no borrowed books"));
    }
}
