//! Server-rendered HTML pages.
//!
//! Every page body is built here and wrapped by [`layout::render_page`].
//! Values interpolated into format-string templates go through
//! [`html_escape`]; builder-produced markup escapes text itself.

pub mod authors;
pub mod books;
pub mod errors;
pub mod home;
pub mod layout;
pub mod login;
pub mod profile;
pub mod readers;
pub mod signup;

use libris_forms::ValidationErrors;

pub use layout::{render_page, PageContext};

/// Escapes HTML special characters.
#[must_use]
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Prefixes an application path with the mount point.
#[must_use]
pub fn url(base_path: &str, path: &str) -> String {
    format!("{}{path}", base_path.trim_end_matches('/'))
}

/// Renders validation errors as a list above a form, or nothing.
fn render_errors(errors: &ValidationErrors) -> String {
    if errors.is_empty() {
        return String::new();
    }

    let items: String = errors
        .messages()
        .into_iter()
        .map(|m| format!("<li>{}</li>", html_escape(m)))
        .collect();
    format!(
        r#"<div class="alert alert-danger" role="alert">
    <p class="mb-1">Errors:</p>
    <ul class="mb-0">{items}</ul>
</div>"#
    )
}

/// Renders a labelled text input.
fn text_field(name: &str, label: &str, value: &str, input_type: &str) -> String {
    format!(
        r#"<div class="mb-3">
    <label for="input_{name}" class="form-label">{label}</label>
    <input type="{input_type}" id="input_{name}" name="{name}" class="form-control" value="{value}">
</div>"#,
        name = html_escape(name),
        label = html_escape(label),
        value = html_escape(value),
        input_type = input_type,
    )
}

/// Renders a POST form holding only a submit button.
fn button_form(action: &str, label: &str, class: &str) -> String {
    format!(
        r#"<form method="post" action="{action}" class="d-inline"><button type="submit" class="btn {class}">{label}</button></form>"#,
        action = html_escape(action),
        label = html_escape(label),
        class = class,
    )
}
