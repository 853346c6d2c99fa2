//! Login page.

use super::{html_escape, text_field, url};

/// Renders the login form, keeping the e-mail of a failed attempt.
#[must_use]
pub fn new(base: &str, email: &str) -> String {
    format!(
        r#"<form method="post" action="{action}" class="col-md-6">
    {email}
    {password}
    <button type="submit" class="btn btn-primary">Log in</button>
    <a href="{signup}" class="btn btn-link">Create an account</a>
</form>"#,
        action = html_escape(&url(base, "/login/create")),
        email = text_field("email", "Email", email, "email"),
        password = text_field("password", "Password", "", "password"),
        signup = url(base, "/signup"),
    )
}
