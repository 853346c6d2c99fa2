//! Signup pages.

use libris_auth::UserForm;

use super::{html_escape, render_errors, text_field, url};

/// Renders the signup form with the values and errors of `form`.
///
/// Passwords are never echoed back.
#[must_use]
pub fn new(base: &str, form: &UserForm) -> String {
    format!(
        r#"{errors}
<form method="post" action="{action}" class="col-md-6">
    {name}
    {surname}
    {email}
    {password}
    {confirmation}
    <button type="submit" class="btn btn-primary">Sign up</button>
</form>"#,
        errors = render_errors(&form.errors),
        action = html_escape(&url(base, "/signup/create")),
        name = text_field("name", "Name", &form.name, "text"),
        surname = text_field("surname", "Surname", &form.surname, "text"),
        email = text_field("email", "Email", &form.email, "email"),
        password = text_field("password", "Password", "", "password"),
        confirmation = text_field("password_confirmation", "Repeat password", "", "password"),
    )
}

/// Renders the page shown after a successful signup.
#[must_use]
pub fn success(base: &str) -> String {
    format!(
        r#"<p>Signup successful. You can now <a href="{}">log in</a>.</p>"#,
        url(base, "/login")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use libris_forms::FormData;

    #[test]
    fn test_signup_form_redisplays_values_not_passwords() {
        let data = FormData::new()
            .with("name", "Ada")
            .with("surname", "Lovelace")
            .with("email", "ada@example.com")
            .with("password", "engine1")
            .with("password_confirmation", "engine2");
        let mut form = UserForm::signup(&data);
        form.errors.add("password", "Password must match confirmation");

        let html = new("", &form);
        assert!(html.contains("Password must match confirmation"));
        assert!(html.contains(r#"value="Lovelace""#));
        assert!(!html.contains("engine1"));
    }

    #[test]
    fn test_success_links_to_login() {
        assert!(success("/lib").contains(r#"href="/lib/login""#));
    }
}
