//! Reader registration.

use libris_auth::UserForm;
use libris_router::{ActionResult, BoxFuture, Controller, RouteParams};
use tracing::info;

use crate::context::Ctx;
use crate::error::AppError;
use crate::views;

/// Signup actions.
pub struct Signup;

impl Signup {
    /// Creates the controller; it uses no route parameters.
    #[must_use]
    pub fn new(_params: RouteParams) -> Self {
        Self
    }

    async fn new_form(&self, cx: &mut Ctx) -> ActionResult {
        let form = UserForm::default();
        let content = views::signup::new(cx.base_path(), &form);
        cx.render("Sign up", &content).await
    }

    async fn create(&self, cx: &mut Ctx) -> ActionResult {
        cx.require_post()?;

        let mut form = UserForm::signup(&cx.form());
        match form.save(cx.pool()).await.map_err(AppError::from)? {
            Some(user) => {
                info!(user_id = user.user_id, "reader signed up");
                let content = views::signup::success(cx.base_path());
                cx.render("Signup successful", &content).await
            }
            None => {
                let content = views::signup::new(cx.base_path(), &form);
                cx.render("Sign up", &content).await
            }
        }
    }
}

impl Controller<Ctx> for Signup {
    fn call<'a>(&'a self, action: &str, cx: &'a mut Ctx) -> Option<BoxFuture<'a, ActionResult>> {
        let fut: BoxFuture<'a, ActionResult> = match action {
            "new" => Box::pin(self.new_form(cx)),
            "create" => Box::pin(self.create(cx)),
            _ => return None,
        };
        Some(fut)
    }
}
