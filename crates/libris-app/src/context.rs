//! Request-scoped context handed to every controller action.

use libris_auth::{FlashKind, Session, User};
use libris_forms::FormData;
use libris_router::{ActionResult, Halt, Method, Request, Response};
use sqlx::SqlitePool;
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::views::{self, PageContext};

/// Everything an action can see about the current request.
///
/// The guards live here instead of on a controller base: an action starts
/// with `let user = cx.require_login().await?;` and a failed guard halts it
/// with a redirect.
pub struct Ctx {
    /// Shared application state.
    pub state: AppState,
    /// The request being handled.
    pub request: Request,
    /// The visitor's session, saved after the action.
    pub session: Session,
    user: Option<Option<User>>,
}

impl Ctx {
    /// Creates the context for one request.
    #[must_use]
    pub fn new(state: AppState, request: Request, session: Session) -> Self {
        Self {
            state,
            request,
            session,
            user: None,
        }
    }

    /// Returns the database pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.state.pool
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.state.config
    }

    /// Returns the mount point of the application.
    #[must_use]
    pub fn base_path(&self) -> &str {
        self.state.config.base_path()
    }

    /// Returns the logged-in user, looked up once per request.
    pub async fn current_user(&mut self) -> Result<Option<User>> {
        if let Some(user) = &self.user {
            return Ok(user.clone());
        }

        let user = match self.session.user_id() {
            Some(user_id) => User::find_by_id(&self.state.pool, user_id)
                .await
                .map_err(AppError::from)?,
            None => None,
        };
        self.user = Some(user.clone());
        Ok(user)
    }

    /// Forgets the cached user after a login or logout.
    pub fn reset_user(&mut self) {
        self.user = None;
    }

    /// Returns the logged-in user or redirects to the login page.
    ///
    /// GET requests are remembered so the login can return to them.
    pub async fn require_login(&mut self) -> std::result::Result<User, Halt> {
        if let Some(user) = self.current_user().await? {
            return Ok(user);
        }

        if self.request.method == Method::Get {
            self.session.remember_page(self.requested_page());
        }
        self.flash("Please login to access that page", FlashKind::Info);
        debug!(path = %self.request.path, "login required");
        Err(self.redirect("/login"))
    }

    /// Returns the logged-in librarian or redirects to the home page.
    pub async fn require_librarian(&mut self) -> std::result::Result<User, Halt> {
        match self.current_user().await? {
            Some(user) if user.is_librarian() => Ok(user),
            _ => {
                self.flash("Only librarians can access that page", FlashKind::Info);
                debug!(path = %self.request.path, "librarian required");
                Err(self.redirect("/"))
            }
        }
    }

    /// Halts with 405 unless the request is a POST.
    pub fn require_post(&self) -> std::result::Result<(), Halt> {
        if self.request.method == Method::Post {
            Ok(())
        } else {
            Err(Halt::Respond(views::errors::page(
                405,
                "This page only accepts form submissions",
            )))
        }
    }

    /// Builds a 303 redirect to an application path.
    ///
    /// The location is absolute: the request's host, then the mount point,
    /// then `path`.
    #[must_use]
    pub fn redirect(&self, path: &str) -> Halt {
        let listen_addr;
        let host = match self.request.get_header("Host") {
            Some(host) => host,
            None => {
                listen_addr = self.state.config.listen_addr();
                &listen_addr
            }
        };
        Halt::Respond(Response::see_other(format!(
            "http://{host}{}{path}",
            self.base_path()
        )))
    }

    /// Queues a message for the next rendered page.
    pub fn flash(&mut self, body: impl Into<String>, kind: FlashKind) {
        self.session.add_flash(body, kind);
    }

    /// Returns the submitted form fields.
    #[must_use]
    pub fn form(&self) -> FormData {
        FormData::from(self.request.form())
    }

    /// Returns a query parameter, or `""`.
    #[must_use]
    pub fn query(&self, name: &str) -> &str {
        self.request.get_query(name).map(str::trim).unwrap_or("")
    }

    /// Parses a query parameter, falling back to `default` when it is missing
    /// or malformed.
    #[must_use]
    pub fn query_or<T: std::str::FromStr>(&self, name: &str, default: T) -> T {
        self.query(name).parse().unwrap_or(default)
    }

    /// Renders `content` in the layout with the current user and the pending
    /// flash messages. The messages are consumed.
    pub async fn render(&mut self, title: &str, content: &str) -> ActionResult {
        let user = self.current_user().await?;
        let flashes = self.session.take_flashes();
        let page = PageContext {
            title,
            base_path: self.base_path(),
            user: user.as_ref(),
            flashes: &flashes,
        };
        Ok(Response::html(views::render_page(&page, content)))
    }

    fn requested_page(&self) -> String {
        if self.request.query_string.is_empty() {
            self.request.path.clone()
        } else {
            format!("{}?{}", self.request.path, self.request.query_string)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_pool;

    async fn ctx(request: Request) -> Ctx {
        let state = AppState::new(test_pool().await, Config::default());
        Ctx::new(state, request, Session::new())
    }

    fn location(halt: Halt) -> String {
        match halt {
            Halt::Respond(response) => {
                assert_eq!(response.status, 303);
                response.location().unwrap().to_string()
            }
            Halt::Failed(err) => panic!("unexpected failure: {err}"),
        }
    }

    #[tokio::test]
    async fn test_require_login_remembers_page() {
        let mut cx = ctx(Request::get("/profile/show?tab=loans").header("Host", "books.test")).await;

        let halt = cx.require_login().await.unwrap_err();
        assert_eq!(location(halt), "http://books.test/login");
        assert_eq!(cx.session.take_return_to(), "/profile/show?tab=loans");

        let flashes = cx.session.take_flashes();
        assert_eq!(flashes.len(), 1);
        assert_eq!(flashes[0].body, "Please login to access that page");
        assert_eq!(flashes[0].kind, FlashKind::Info);
    }

    #[tokio::test]
    async fn test_require_login_does_not_remember_posts() {
        let mut cx = ctx(Request::post("/books/borrow/1")).await;

        assert!(cx.require_login().await.is_err());
        assert_eq!(cx.session.take_return_to(), "/");
    }

    #[tokio::test]
    async fn test_require_librarian_rejects_reader() {
        let mut cx = ctx(Request::get("/books/new").header("Host", "books.test")).await;
        let mut reader = User::create("Ada", "Lovelace", "ada@example.com", "engine1").unwrap();
        reader.save(cx.pool()).await.unwrap();
        cx.session.login(&cx.state.pool, &reader).await.unwrap();

        let halt = cx.require_librarian().await.unwrap_err();
        assert_eq!(location(halt), "http://books.test/");
        let flashes = cx.session.take_flashes();
        assert_eq!(flashes[0].body, "Only librarians can access that page");
        assert_eq!(flashes[0].kind, FlashKind::Info);
    }

    #[tokio::test]
    async fn test_require_librarian_accepts_librarian() {
        let mut cx = ctx(Request::get("/books/new")).await;
        let mut librarian =
            User::create_librarian("Melvil", "Dewey", "dewey@example.com", "decimal1").unwrap();
        librarian.save(cx.pool()).await.unwrap();
        cx.session.login(&cx.state.pool, &librarian).await.unwrap();

        let user = cx.require_librarian().await.unwrap();
        assert_eq!(user.email, "dewey@example.com");
        assert!(cx.session.take_flashes().is_empty());
    }

    #[tokio::test]
    async fn test_redirect_uses_base_path() {
        let config = Config {
            base_path: "/library/".to_string(),
            ..Config::default()
        };
        let state = AppState::new(test_pool().await, config);
        let cx = Ctx::new(state, Request::get("/"), Session::new());

        assert_eq!(
            location(cx.redirect("/books/index")),
            "http://127.0.0.1:3000/library/books/index"
        );
    }

    #[tokio::test]
    async fn test_require_post() {
        let cx = ctx(Request::get("/books/delete/1")).await;
        match cx.require_post() {
            Err(Halt::Respond(response)) => assert_eq!(response.status, 405),
            _ => panic!("GET must be refused"),
        }
    }

    #[tokio::test]
    async fn test_render_drains_flashes() {
        let mut cx = ctx(Request::get("/")).await;
        cx.flash("Changes saved", FlashKind::Success);

        let page = cx.render("Home", "<p>hi</p>").await.unwrap();
        assert!(page.body_string().unwrap().contains("Changes saved"));

        let again = cx.render("Home", "").await.unwrap();
        assert!(!again.body_string().unwrap().contains("Changes saved"));
    }
}
