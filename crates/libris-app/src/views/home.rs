//! Landing page.

use ironhtml::typed::Element;
use ironhtml_elements::{Div, A, H5, P};

use super::url;

/// Catalog figures shown on the landing page.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogStats {
    /// Number of catalog entries.
    pub books: i64,
    /// Number of authors.
    pub authors: i64,
}

/// Renders the landing page body.
#[must_use]
pub fn index(base: &str, stats: CatalogStats, logged_in: bool) -> String {
    let mut html = String::new();

    Element::<Div>::new()
        .class("row")
        .child::<Div, _>(|col| stat_card(col, "Books", stats.books, &url(base, "/books/index")))
        .child::<Div, _>(|col| {
            stat_card(col, "Authors", stats.authors, &url(base, "/authors/index"))
        })
        .render_to(&mut html);

    if !logged_in {
        let signup = url(base, "/signup");
        let login = url(base, "/login");
        Element::<P>::new()
            .class("mt-3")
            .child::<A, _>(|a| a.attr("href", &signup).text("Sign up"))
            .text(" or ")
            .child::<A, _>(|a| a.attr("href", &login).text("log in"))
            .text(" to borrow books.")
            .render_to(&mut html);
    }

    html
}

fn stat_card(col: Element<Div>, label: &str, count: i64, href: &str) -> Element<Div> {
    let count = count.to_string();
    col.class("col-md-4 mb-3").child::<Div, _>(|card| {
        card.class("card").child::<Div, _>(|body| {
            body.class("card-body")
                .child::<H5, _>(|h| h.class("card-title").text(label))
                .child::<P, _>(|p| p.class("display-6").text(&count))
                .child::<A, _>(|a| a.class("btn btn-outline-primary btn-sm").attr("href", href).text("Browse"))
        })
    })
}
