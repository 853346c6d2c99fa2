//! End-to-end tests: requests go through `App::handle` with a real session
//! store and an in-memory database.

use libris_app::models::{create_schema, Author, Book};
use libris_app::{App, AppState, Config};
use libris_auth::User;
use libris_router::{Request, Response};
use sqlx::sqlite::SqlitePoolOptions;

const HOST: &str = "library.test";

/// A browser stand-in that keeps the session cookie between requests.
struct Client {
    app: App,
    cookie: Option<String>,
}

impl Client {
    async fn new() -> Self {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .expect("Failed to create in-memory SQLite pool");
        create_schema(&pool).await.unwrap();

        let config = Config {
            max_borrowed: 2,
            ..Config::default()
        };
        let app = App::new(AppState::new(pool, config)).unwrap();
        Self { app, cookie: None }
    }

    fn pool(&self) -> &sqlx::SqlitePool {
        &self.app.state().pool
    }

    async fn send(&mut self, request: Request) -> Response {
        let mut request = request.header("Host", HOST);
        if let Some(cookie) = &self.cookie {
            request = request.header("Cookie", cookie.clone());
        }

        let response = self.app.handle(request).await;
        if let Some(set_cookie) = response.headers.get("Set-Cookie") {
            let pair = set_cookie.split(';').next().unwrap().to_string();
            self.cookie = Some(pair);
        }
        response
    }

    async fn get(&mut self, target: &str) -> Response {
        self.send(Request::get(target)).await
    }

    async fn post(&mut self, target: &str, fields: &[(&str, &str)]) -> Response {
        self.send(Request::post(target).form_body(fields)).await
    }

    /// Follows a redirect and returns the page it leads to.
    async fn follow(&mut self, response: &Response) -> Response {
        assert_eq!(response.status, 303, "expected a redirect");
        let location = response.location().unwrap();
        let path = location
            .strip_prefix(&format!("http://{HOST}"))
            .expect("redirect to the request host");
        self.get(path).await
    }

    async fn login(&mut self, email: &str, password: &str) {
        let response = self
            .post("/login/create", &[("email", email), ("password", password)])
            .await;
        assert_eq!(response.status, 303, "login failed for {email}");
        self.follow(&response).await;
    }
}

fn body(response: &Response) -> String {
    response.body_string().unwrap()
}

async fn seed_catalog(pool: &sqlx::SqlitePool, available: i64) -> Book {
    let mut author = Author {
        name: "J. R. R.".to_string(),
        surname: "Tolkien".to_string(),
        ..Default::default()
    };
    assert!(author.save(pool).await.unwrap());

    let mut book = Book {
        title: "The Hobbit".to_string(),
        author_id: author.author_id,
        available,
        ..Default::default()
    };
    assert!(book.save(pool).await.unwrap());
    book
}

async fn seed_user(pool: &sqlx::SqlitePool, librarian: bool) {
    let mut user = if librarian {
        User::create_librarian("Melvil", "Dewey", "dewey@example.com", "decimal1").unwrap()
    } else {
        User::create("Ada", "Lovelace", "ada@example.com", "engine1").unwrap()
    };
    user.save(pool).await.unwrap();
}

#[tokio::test]
async fn test_home_page() {
    let mut client = Client::new().await;
    let response = client.get("/").await;

    assert_eq!(response.status, 200);
    assert!(body(&response).contains("Welcome to the library"));
}

async fn stored_sessions(pool: &sqlx::SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM sessions")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_anonymous_visits_store_no_session() {
    let mut client = Client::new().await;
    seed_catalog(client.pool(), 1).await;

    for path in ["/", "/books/index", "/authors/index", "/books/show/1"] {
        let response = client.get(path).await;
        assert_eq!(response.status, 200, "{path}");
        assert!(response.headers.get("Set-Cookie").is_none(), "{path}");
    }
    assert_eq!(stored_sessions(client.pool()).await, 0);

    let response = client.get("/profile/show").await;
    assert!(response.headers.get("Set-Cookie").unwrap().starts_with("session_id="));
    assert_eq!(stored_sessions(client.pool()).await, 1);
}

#[tokio::test]
async fn test_unroutable_paths_are_not_found() {
    let mut client = Client::new().await;

    for path in ["/books/createAction", "/widgets/index", "/books/fly", "/books/edit/abc/def"] {
        let response = client.get(path).await;
        assert_eq!(response.status, 404, "{path}");
    }
}

#[tokio::test]
async fn test_reader_is_sent_home_from_librarian_pages() {
    let mut client = Client::new().await;
    seed_user(client.pool(), false).await;
    client.login("ada@example.com", "engine1").await;

    let response = client.get("/books/new").await;
    assert_eq!(response.status, 303);
    assert_eq!(response.location(), Some("http://library.test/"));

    let home = client.follow(&response).await;
    assert!(body(&home).contains("Only librarians can access that page"));
    assert!(body(&home).contains("alert-info"));
}

#[tokio::test]
async fn test_librarian_reaches_librarian_pages() {
    let mut client = Client::new().await;
    seed_user(client.pool(), true).await;
    client.login("dewey@example.com", "decimal1").await;

    let response = client.get("/books/new").await;
    assert_eq!(response.status, 200);
    assert!(body(&response).contains(r#"name="author_id""#));
}

#[tokio::test]
async fn test_login_required_returns_to_requested_page() {
    let mut client = Client::new().await;
    seed_user(client.pool(), false).await;

    let response = client.get("/profile/show").await;
    assert_eq!(response.location(), Some("http://library.test/login"));
    let login_page = client.follow(&response).await;
    assert!(body(&login_page).contains("Please login to access that page"));

    let response = client
        .post("/login/create", &[("email", "ada@example.com"), ("password", "engine1")])
        .await;
    assert_eq!(response.location(), Some("http://library.test/profile/show"));
    let profile = client.follow(&response).await;
    assert!(body(&profile).contains("Login successful"));
    assert!(body(&profile).contains("Borrowed books (0 of 2)"));
}

#[tokio::test]
async fn test_failed_login_keeps_email() {
    let mut client = Client::new().await;
    seed_user(client.pool(), false).await;

    let response = client
        .post("/login/create", &[("email", "ada@example.com"), ("password", "wrong1")])
        .await;
    assert_eq!(response.status, 200);
    let page = body(&response);
    assert!(page.contains("Login unsuccessful, please try again"));
    assert!(page.contains(r#"value="ada@example.com""#));
}

#[tokio::test]
async fn test_logout_shows_message_once() {
    let mut client = Client::new().await;
    seed_user(client.pool(), false).await;
    client.login("ada@example.com", "engine1").await;

    let response = client.get("/logout").await;
    assert_eq!(
        response.location(),
        Some("http://library.test/login/show-logout-message")
    );
    let response = client.follow(&response).await;
    let home = client.follow(&response).await;
    assert!(body(&home).contains("Logout successful"));
    assert!(body(&home).contains("/signup"));

    let again = client.get("/").await;
    assert!(!body(&again).contains("Logout successful"));
}

#[tokio::test]
async fn test_signup_then_login() {
    let mut client = Client::new().await;

    let response = client
        .post(
            "/signup/create",
            &[
                ("name", "Ada"),
                ("surname", "Lovelace"),
                ("email", "ada@example.com"),
                ("password", "engine1"),
                ("password_confirmation", "engine1"),
            ],
        )
        .await;
    assert_eq!(response.status, 200);
    assert!(body(&response).contains("Signup successful"));

    client.login("ada@example.com", "engine1").await;
    let profile = client.get("/profile/show").await;
    assert_eq!(profile.status, 200);
}

#[tokio::test]
async fn test_signup_errors_are_redisplayed() {
    let mut client = Client::new().await;

    let response = client
        .post(
            "/signup/create",
            &[
                ("name", ""),
                ("surname", "Lovelace"),
                ("email", "not-an-email"),
                ("password", "abc"),
                ("password_confirmation", "abc"),
            ],
        )
        .await;
    let page = body(&response);
    assert!(page.contains("Name is required"));
    assert!(page.contains("Invalid email"));
    assert!(page.contains("Password needs at least one number"));
}

#[tokio::test]
async fn test_borrow_and_return() {
    let mut client = Client::new().await;
    let book = seed_catalog(client.pool(), 1).await;
    seed_user(client.pool(), false).await;
    client.login("ada@example.com", "engine1").await;

    let borrow = format!("/books/borrow/{}", book.book_id);
    let response = client.post(&borrow, &[]).await;
    let page = client.follow(&response).await;
    assert!(body(&page).contains("You borrowed"));

    let stored = Book::get(client.pool(), book.book_id).await.unwrap();
    assert_eq!((stored.available, stored.borrowed), (0, 1));

    let response = client.post(&borrow, &[]).await;
    let page = client.follow(&response).await;
    assert!(body(&page).contains("You have already borrowed this book"));

    let profile = client.get("/profile/show").await;
    assert!(body(&profile).contains("The Hobbit"));

    let response = client
        .post(&format!("/books/return/{}", book.book_id), &[])
        .await;
    let page = client.follow(&response).await;
    assert!(body(&page).contains("You returned"));

    let stored = Book::get(client.pool(), book.book_id).await.unwrap();
    assert_eq!((stored.available, stored.borrowed), (1, 0));
}

#[tokio::test]
async fn test_borrow_requires_post() {
    let mut client = Client::new().await;
    let book = seed_catalog(client.pool(), 1).await;
    seed_user(client.pool(), false).await;
    client.login("ada@example.com", "engine1").await;

    let response = client.get(&format!("/books/borrow/{}", book.book_id)).await;
    assert_eq!(response.status, 405);
}

#[tokio::test]
async fn test_catalog_sort_and_search_warnings() {
    let mut client = Client::new().await;
    seed_catalog(client.pool(), 3).await;

    let response = client.get("/books/index?sort=default").await;
    assert_eq!(response.location(), Some("http://library.test/books/index"));
    let page = client.follow(&response).await;
    assert!(body(&page).contains("Please select the sort criteria from the list"));

    let response = client.get("/books/search?search=dragons").await;
    let page = client.follow(&response).await;
    assert!(body(&page).contains("Book or author not found, try again"));

    let response = client.get("/books/search?search=tolk").await;
    assert_eq!(response.status, 200);
    assert!(body(&response).contains("The Hobbit"));
}

#[tokio::test]
async fn test_catalog_survives_extreme_paging() {
    let mut client = Client::new().await;
    seed_catalog(client.pool(), 1).await;

    for query in [
        "links=9223372036854775807",
        "links=-9223372036854775808",
        "limit=9223372036854775807",
        "limit=-5&page=9223372036854775807",
    ] {
        let response = client.get(&format!("/books/index?{query}")).await;
        assert_eq!(response.status, 200, "{query}");
        assert!(body(&response).contains("The Hobbit"), "{query}");
    }

    let response = client.get("/books/index?limit=500&links=50").await;
    assert!(body(&response).contains(r#"name="limit" value="100""#));
    assert!(body(&response).contains(r#"name="links" value="10""#));
}

#[tokio::test]
async fn test_missing_book_is_not_found() {
    let mut client = Client::new().await;
    let response = client.get("/books/show/404").await;
    assert_eq!(response.status, 404);
}

#[tokio::test]
async fn test_librarian_manages_books() {
    let mut client = Client::new().await;
    let book = seed_catalog(client.pool(), 1).await;
    seed_user(client.pool(), true).await;
    client.login("dewey@example.com", "decimal1").await;

    let author_id = book.author_id.to_string();
    let response = client
        .post(
            "/books/create",
            &[
                ("title", "The Silmarillion"),
                ("author_id", &author_id),
                ("available", "2"),
                ("published_year", "1977"),
            ],
        )
        .await;
    let page = client.follow(&response).await;
    assert!(body(&page).contains("Book successfully added"));
    assert!(body(&page).contains("The Silmarillion"));

    let response = client
        .post(
            &format!("/books/update/{}", book.book_id),
            &[("title", ""), ("author_id", &author_id), ("available", "1")],
        )
        .await;
    assert_eq!(response.status, 200);
    assert!(body(&response).contains("Title is required"));

    let confirm = client.get(&format!("/books/delete/{}", book.book_id)).await;
    assert_eq!(confirm.status, 200);
    let response = client
        .post(&format!("/books/delete/{}", book.book_id), &[])
        .await;
    let page = client.follow(&response).await;
    assert!(body(&page).contains("Book was successfully deleted"));
}

#[tokio::test]
async fn test_author_with_books_cannot_be_deleted() {
    let mut client = Client::new().await;
    let book = seed_catalog(client.pool(), 1).await;
    seed_user(client.pool(), false).await;
    client.login("ada@example.com", "engine1").await;

    let response = client
        .post(&format!("/authors/delete/{}", book.author_id), &[])
        .await;
    assert_eq!(response.status, 200);
    assert!(body(&response).contains("still has 1 book(s)"));

    let response = client
        .post("/authors/create", &[("name", "Ursula"), ("surname", "Le Guin")])
        .await;
    let page = client.follow(&response).await;
    assert!(body(&page).contains("Author successfully added"));
}
