//! Page layout shared by every view.

use ironhtml::typed::{Document, Element};
use ironhtml_elements::{
    Body, Div, Form, Head, Html, Input, Li, Link, Meta, Nav, Title, Ul, A, H1,
};
use libris_auth::{FlashMessage, User};

use super::url;

const BOOTSTRAP_CSS: &str = "https://cdn.jsdelivr.net/npm/bootstrap@5.3.2/dist/css/bootstrap.min.css";

/// Everything the layout needs besides the page body.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    /// Page title, shown as the heading too.
    pub title: &'a str,
    /// Path prefix for links.
    pub base_path: &'a str,
    /// Logged-in user, if any.
    pub user: Option<&'a User>,
    /// Flash messages to show once.
    pub flashes: &'a [FlashMessage],
}

/// Renders a complete page around `content`.
#[must_use]
pub fn render_page(ctx: &PageContext<'_>, content: &str) -> String {
    let title = format!("{} | Libris", ctx.title);

    Document::new()
        .doctype()
        .root::<Html, _>(|html_el| {
            html_el
                .attr("lang", "en")
                .child::<Head, _>(|head| {
                    head.child::<Meta, _>(|m| m.attr("charset", "UTF-8"))
                        .child::<Meta, _>(|m| {
                            m.attr("name", "viewport")
                                .attr("content", "width=device-width, initial-scale=1.0")
                        })
                        .child::<Title, _>(|t| t.text(&title))
                        .child::<Link, _>(|l| l.attr("href", BOOTSTRAP_CSS).attr("rel", "stylesheet"))
                })
                .child::<Body, _>(|body| {
                    body.child::<Nav, _>(|nav| render_navbar(nav, ctx))
                        .child::<Div, _>(|main| {
                            let main = render_flashes(
                                main.class("container py-4").attr("role", "main"),
                                ctx.flashes,
                            );
                            let heading = ctx.title;
                            main.child::<H1, _>(|h| h.class("h3 mb-4").text(heading))
                                .raw(content)
                        })
                })
        })
        .build()
}

fn render_navbar(nav: Element<Nav>, ctx: &PageContext<'_>) -> Element<Nav> {
    let base = ctx.base_path;
    let home = url(base, "/");
    let search_action = url(base, "/books/search");

    let mut links: Vec<(String, &str)> = vec![
        (url(base, "/books/index"), "Catalog"),
        (url(base, "/authors/index"), "Authors"),
    ];
    match ctx.user {
        Some(user) => {
            links.push((url(base, "/profile/show"), "My books"));
            if user.is_librarian() {
                links.push((url(base, "/readers/index"), "Readers"));
            }
            links.push((url(base, "/logout"), "Log out"));
        }
        None => {
            links.push((url(base, "/login"), "Log in"));
            links.push((url(base, "/signup"), "Sign up"));
        }
    }

    nav.class("navbar navbar-expand-lg navbar-dark bg-dark").child::<Div, _>(|d| {
        d.class("container")
            .child::<A, _>(|a| a.class("navbar-brand").attr("href", &home).text("Libris"))
            .child::<Ul, _>(|ul| {
                ul.class("navbar-nav me-auto")
                    .children(links.iter(), |(href, label), li: Element<Li>| {
                        li.class("nav-item")
                            .child::<A, _>(|a| a.class("nav-link").attr("href", href).text(*label))
                    })
            })
            .child::<Form, _>(|f| {
                f.class("d-flex")
                    .attr("method", "get")
                    .attr("action", &search_action)
                    .child::<Input, _>(|i| {
                        i.class("form-control me-2")
                            .attr("type", "search")
                            .attr("name", "search")
                            .attr("placeholder", "Title or author")
                    })
            })
            .when(ctx.user.is_some(), |d| {
                let name = ctx.user.map(User::full_name).unwrap_or_default();
                d.child::<Div, _>(|s| s.class("navbar-text ms-3").text(&name))
            })
    })
}

fn render_flashes(wrapper: Element<Div>, flashes: &[FlashMessage]) -> Element<Div> {
    let mut w = wrapper;
    for flash in flashes {
        let class = format!("alert alert-{}", flash.kind.as_str());
        w = w.child::<Div, _>(|d| d.class(&class).attr("role", "alert").text(&flash.body));
    }
    w
}
