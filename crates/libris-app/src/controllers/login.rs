//! Logging in and out.

use libris_auth::{FlashKind, User};
use libris_router::{ActionResult, BoxFuture, Controller, RouteParams};
use tracing::info;

use crate::context::Ctx;
use crate::error::AppError;
use crate::views;

/// Login and logout actions.
pub struct Login;

impl Login {
    /// Creates the controller; it uses no route parameters.
    #[must_use]
    pub fn new(_params: RouteParams) -> Self {
        Self
    }

    async fn new_form(&self, cx: &mut Ctx) -> ActionResult {
        let content = views::login::new(cx.base_path(), "");
        cx.render("Log in", &content).await
    }

    async fn create(&self, cx: &mut Ctx) -> ActionResult {
        cx.require_post()?;

        let form = cx.form();
        let email = form.get("email");
        let user = User::authenticate(cx.pool(), email, form.get("password"))
            .await
            .map_err(AppError::from)?;

        match user {
            Some(user) => {
                cx.session
                    .login(&cx.state.pool, &user)
                    .await
                    .map_err(AppError::from)?;
                cx.reset_user();
                info!(user_id = user.user_id, "user logged in");

                cx.flash("Login successful", FlashKind::Success);
                let return_to = cx.session.take_return_to();
                Err(cx.redirect(&return_to))
            }
            None => {
                cx.flash("Login unsuccessful, please try again", FlashKind::Warning);
                let content = views::login::new(cx.base_path(), email);
                cx.render("Log in", &content).await
            }
        }
    }

    async fn destroy(&self, cx: &mut Ctx) -> ActionResult {
        let user = cx.require_login().await?;

        cx.session
            .logout(&cx.state.pool)
            .await
            .map_err(AppError::from)?;
        cx.reset_user();
        info!(user_id = user.user_id, "user logged out");

        Err(cx.redirect("/login/show-logout-message"))
    }

    /// Runs on a fresh session after logout so the message survives it.
    async fn show_logout_message(&self, cx: &mut Ctx) -> ActionResult {
        cx.flash("Logout successful", FlashKind::Success);
        Err(cx.redirect("/"))
    }
}

impl Controller<Ctx> for Login {
    fn call<'a>(&'a self, action: &str, cx: &'a mut Ctx) -> Option<BoxFuture<'a, ActionResult>> {
        let fut: BoxFuture<'a, ActionResult> = match action {
            "new" => Box::pin(self.new_form(cx)),
            "create" => Box::pin(self.create(cx)),
            "destroy" => Box::pin(self.destroy(cx)),
            "showLogoutMessage" => Box::pin(self.show_logout_message(cx)),
            _ => return None,
        };
        Some(fut)
    }
}
