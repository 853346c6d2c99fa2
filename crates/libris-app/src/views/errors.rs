//! Error pages.

use libris_router::Response;

use super::{html_escape, render_page, PageContext};

/// Renders an error page with the given status.
///
/// Error pages are rendered without a user or flash messages so they never
/// depend on the database.
#[must_use]
pub fn page(status: u16, message: &str) -> Response {
    let title = match status {
        404 => "Page not found",
        405 => "Method not allowed",
        _ => "Something went wrong",
    };
    let ctx = PageContext {
        title,
        base_path: "",
        user: None,
        flashes: &[],
    };
    let content = format!(
        r#"<p class="lead">{message}</p><p><a href="/">Back to the home page</a></p>"#,
        message = html_escape(message)
    );

    Response::html(render_page(&ctx, &content)).status(status)
}
