//! Author management.

use libris_auth::FlashKind;
use libris_router::{ActionResult, BoxFuture, Controller, Method, RouteParams};

use super::route_id;
use crate::context::Ctx;
use crate::models::Author;
use crate::views;

/// Author list and CRUD forms. Changes need a logged-in user.
pub struct Authors {
    params: RouteParams,
}

impl Authors {
    /// Creates the controller for one request.
    #[must_use]
    pub fn new(params: RouteParams) -> Self {
        Self { params }
    }

    async fn index(&self, cx: &mut Ctx) -> ActionResult {
        let authors = Author::all(cx.pool()).await?;
        let can_manage = cx.current_user().await?.is_some();

        let content = views::authors::index(cx.base_path(), &authors, can_manage);
        cx.render("Authors", &content).await
    }

    async fn new_form(&self, cx: &mut Ctx) -> ActionResult {
        cx.require_login().await?;

        let content = views::authors::form(cx.base_path(), &Author::default(), "/authors/create");
        cx.render("New author", &content).await
    }

    async fn create(&self, cx: &mut Ctx) -> ActionResult {
        cx.require_login().await?;
        cx.require_post()?;

        let mut author = Author::from_form(&cx.form());
        if author.save(cx.pool()).await? {
            cx.flash("Author successfully added", FlashKind::Success);
            Err(cx.redirect("/authors/index"))
        } else {
            let content = views::authors::form(cx.base_path(), &author, "/authors/create");
            cx.render("New author", &content).await
        }
    }

    async fn edit(&self, cx: &mut Ctx) -> ActionResult {
        cx.require_login().await?;
        let id = route_id(&self.params)?;

        let author = Author::get(cx.pool(), id).await?;
        let action = format!("/authors/update/{id}");
        let content = views::authors::form(cx.base_path(), &author, &action);
        cx.render("Edit author", &content).await
    }

    async fn update(&self, cx: &mut Ctx) -> ActionResult {
        cx.require_login().await?;
        cx.require_post()?;
        let id = route_id(&self.params)?;

        let mut author = Author::get(cx.pool(), id).await?;
        author.apply_form(&cx.form());
        if author.save(cx.pool()).await? {
            cx.flash("Changes saved", FlashKind::Success);
            Err(cx.redirect("/authors/index"))
        } else {
            let action = format!("/authors/update/{id}");
            let content = views::authors::form(cx.base_path(), &author, &action);
            cx.render("Edit author", &content).await
        }
    }

    /// GET asks for confirmation, POST deletes.
    async fn delete(&self, cx: &mut Ctx) -> ActionResult {
        cx.require_login().await?;
        let id = route_id(&self.params)?;

        let mut author = Author::get(cx.pool(), id).await?;
        if cx.request.method == Method::Post && author.delete(cx.pool()).await? {
            cx.flash("Author was successfully deleted", FlashKind::Success);
            return Err(cx.redirect("/authors/index"));
        }

        let content = views::authors::delete(cx.base_path(), &author);
        cx.render("Delete author", &content).await
    }
}

impl Controller<Ctx> for Authors {
    fn call<'a>(&'a self, action: &str, cx: &'a mut Ctx) -> Option<BoxFuture<'a, ActionResult>> {
        let fut: BoxFuture<'a, ActionResult> = match action {
            "index" => Box::pin(self.index(cx)),
            "new" => Box::pin(self.new_form(cx)),
            "create" => Box::pin(self.create(cx)),
            "edit" => Box::pin(self.edit(cx)),
            "update" => Box::pin(self.update(cx)),
            "delete" => Box::pin(self.delete(cx)),
            _ => return None,
        };
        Some(fut)
    }
}
