//! The logged-in user's page.

use libris_auth::{FlashKind, UserForm};
use libris_router::{ActionResult, BoxFuture, Controller, RouteParams};

use crate::context::Ctx;
use crate::error::AppError;
use crate::models::loans;
use crate::views;

/// The user's borrowed books and account details.
pub struct Profile;

impl Profile {
    /// Creates the controller; it uses no route parameters.
    #[must_use]
    pub fn new(_params: RouteParams) -> Self {
        Self
    }

    async fn show(&self, cx: &mut Ctx) -> ActionResult {
        let user = cx.require_login().await?;

        let held = loans::user_books(cx.pool(), &user).await?;
        let content = views::profile::show(cx.base_path(), &user, &held, cx.config().max_borrowed);
        cx.render("My books", &content).await
    }

    async fn edit(&self, cx: &mut Ctx) -> ActionResult {
        let user = cx.require_login().await?;

        let form = UserForm {
            user_id: Some(user.user_id),
            name: user.name.clone(),
            surname: user.surname.clone(),
            email: user.email.clone(),
            ..UserForm::default()
        };
        let content = views::profile::edit(cx.base_path(), &form);
        cx.render("Edit profile", &content).await
    }

    async fn update(&self, cx: &mut Ctx) -> ActionResult {
        let mut user = cx.require_login().await?;
        cx.require_post()?;

        let mut form = UserForm::profile(&user, &cx.form());
        if user
            .update_profile(cx.pool(), &mut form)
            .await
            .map_err(AppError::from)?
        {
            cx.reset_user();
            cx.flash("Changes saved", FlashKind::Success);
            Err(cx.redirect("/profile/show"))
        } else {
            let content = views::profile::edit(cx.base_path(), &form);
            cx.render("Edit profile", &content).await
        }
    }
}

impl Controller<Ctx> for Profile {
    fn call<'a>(&'a self, action: &str, cx: &'a mut Ctx) -> Option<BoxFuture<'a, ActionResult>> {
        let fut: BoxFuture<'a, ActionResult> = match action {
            "show" => Box::pin(self.show(cx)),
            "edit" => Box::pin(self.edit(cx)),
            "update" => Box::pin(self.update(cx)),
            _ => return None,
        };
        Some(fut)
    }
}
