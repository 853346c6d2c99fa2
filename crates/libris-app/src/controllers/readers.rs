//! Readers overview for librarians.

use libris_router::{ActionResult, BoxFuture, Controller, RouteParams};

use crate::context::Ctx;
use crate::models::loans;
use crate::views;

/// Lists readers and the books they hold.
pub struct Readers;

impl Readers {
    /// Creates the controller; it uses no route parameters.
    #[must_use]
    pub fn new(_params: RouteParams) -> Self {
        Self
    }

    async fn index(&self, cx: &mut Ctx) -> ActionResult {
        cx.require_librarian().await?;

        let readers = loans::readers_data(cx.pool()).await?;
        let content = views::readers::index(cx.base_path(), &readers);
        cx.render("Readers", &content).await
    }
}

impl Controller<Ctx> for Readers {
    fn call<'a>(&'a self, action: &str, cx: &'a mut Ctx) -> Option<BoxFuture<'a, ActionResult>> {
        let fut: BoxFuture<'a, ActionResult> = match action {
            "index" => Box::pin(self.index(cx)),
            _ => return None,
        };
        Some(fut)
    }
}
