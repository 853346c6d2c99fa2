//! Landing page.

use libris_router::{ActionResult, BoxFuture, Controller, RouteParams};

use crate::context::Ctx;
use crate::models::{paginator, Counted};
use crate::views::home::{self, CatalogStats};

/// Serves the landing page.
pub struct Home;

impl Home {
    /// Creates the controller; it uses no route parameters.
    #[must_use]
    pub fn new(_params: RouteParams) -> Self {
        Self
    }

    async fn index(&self, cx: &mut Ctx) -> ActionResult {
        let stats = CatalogStats {
            books: paginator::total_rows(cx.pool(), Counted::Books).await?,
            authors: paginator::total_rows(cx.pool(), Counted::Authors).await?,
        };
        let logged_in = cx.current_user().await?.is_some();

        let content = home::index(cx.base_path(), stats, logged_in);
        cx.render("Welcome to the library", &content).await
    }
}

impl Controller<Ctx> for Home {
    fn call<'a>(&'a self, action: &str, cx: &'a mut Ctx) -> Option<BoxFuture<'a, ActionResult>> {
        let fut: BoxFuture<'a, ActionResult> = match action {
            "index" => Box::pin(self.index(cx)),
            _ => return None,
        };
        Some(fut)
    }
}
