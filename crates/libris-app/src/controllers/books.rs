//! The catalog: browsing, searching, borrowing and librarian CRUD.

use libris_auth::FlashKind;
use libris_router::{ActionResult, BoxFuture, Controller, Method, RouteParams};

use super::route_id;
use crate::context::Ctx;
use crate::models::{loans, paginator, Author, Book, BookSort, Counted};
use crate::views;
use crate::views::books::{BookActions, ListQuery};

/// Catalog actions.
pub struct Books {
    params: RouteParams,
}

impl Books {
    /// Creates the controller for one request.
    #[must_use]
    pub fn new(params: RouteParams) -> Self {
        Self { params }
    }

    /// Paged list. Query: `limit`, `page`, `links`, `sort`.
    async fn index(&self, cx: &mut Ctx) -> ActionResult {
        let defaults = ListQuery::default();
        if cx.query("sort") == "default" {
            cx.flash("Please select the sort criteria from the list", FlashKind::Warning);
            return Err(cx.redirect("/books/index"));
        }
        let sort = BookSort::parse(cx.query("sort")).unwrap_or_default();
        let query = ListQuery {
            limit: cx
                .query_or("limit", defaults.limit)
                .clamp(1, paginator::MAX_LIMIT),
            links: cx
                .query_or("links", defaults.links)
                .clamp(0, paginator::MAX_LINKS),
            sort,
        };
        let page = cx.query_or("page", 1);

        let total = paginator::total_rows(cx.pool(), Counted::Books).await?;
        let pagination = paginator::links(query.limit, page, query.links, total);
        let books = Book::page(cx.pool(), pagination.limit, pagination.page, sort).await?;
        let can_manage = cx
            .current_user()
            .await?
            .is_some_and(|user| user.is_librarian());

        let content = views::books::index(cx.base_path(), &books, &pagination, query, can_manage);
        cx.render("Catalog", &content).await
    }

    async fn search(&self, cx: &mut Ctx) -> ActionResult {
        let term = cx.query("search").to_string();
        let books = if term.is_empty() {
            Vec::new()
        } else {
            Book::search(cx.pool(), &term).await?
        };

        if books.is_empty() {
            cx.flash("Book or author not found, try again", FlashKind::Warning);
            return Err(cx.redirect("/books/index"));
        }

        let content = views::books::search(cx.base_path(), &term, &books);
        cx.render("Search results", &content).await
    }

    async fn show(&self, cx: &mut Ctx) -> ActionResult {
        let id = route_id(&self.params)?;
        let book = Book::get(cx.pool(), id).await?;

        let actions = match cx.current_user().await? {
            Some(user) => {
                let taken = loans::is_book_taken(cx.pool(), &user, id).await?;
                BookActions {
                    can_borrow: !taken,
                    can_return: taken,
                    can_manage: user.is_librarian(),
                }
            }
            None => BookActions::default(),
        };

        let content = views::books::show(cx.base_path(), &book, actions);
        cx.render(&book.title, &content).await
    }

    async fn new_form(&self, cx: &mut Ctx) -> ActionResult {
        cx.require_librarian().await?;

        let authors = Author::all(cx.pool()).await?;
        let content = views::books::form(cx.base_path(), &Book::default(), &authors, "/books/create");
        cx.render("New book", &content).await
    }

    async fn create(&self, cx: &mut Ctx) -> ActionResult {
        cx.require_librarian().await?;
        cx.require_post()?;

        let mut book = Book::from_form(&cx.form());
        if book.save(cx.pool()).await? {
            cx.flash("Book successfully added", FlashKind::Success);
            return Err(cx.redirect("/books/index"));
        }

        let authors = Author::all(cx.pool()).await?;
        let content = views::books::form(cx.base_path(), &book, &authors, "/books/create");
        cx.render("New book", &content).await
    }

    async fn edit(&self, cx: &mut Ctx) -> ActionResult {
        cx.require_librarian().await?;
        let id = route_id(&self.params)?;

        let book = Book::get(cx.pool(), id).await?;
        let authors = Author::all(cx.pool()).await?;
        let action = format!("/books/update/{id}");
        let content = views::books::form(cx.base_path(), &book, &authors, &action);
        cx.render("Edit book", &content).await
    }

    async fn update(&self, cx: &mut Ctx) -> ActionResult {
        cx.require_librarian().await?;
        cx.require_post()?;
        let id = route_id(&self.params)?;

        let mut book = Book::get(cx.pool(), id).await?;
        book.apply_form(&cx.form());
        if book.save(cx.pool()).await? {
            cx.flash("Changes saved", FlashKind::Success);
            return Err(cx.redirect("/books/index"));
        }

        let authors = Author::all(cx.pool()).await?;
        let action = format!("/books/update/{id}");
        let content = views::books::form(cx.base_path(), &book, &authors, &action);
        cx.render("Edit book", &content).await
    }

    /// GET asks for confirmation, POST deletes.
    async fn delete(&self, cx: &mut Ctx) -> ActionResult {
        cx.require_librarian().await?;
        let id = route_id(&self.params)?;

        let mut book = Book::get(cx.pool(), id).await?;
        if cx.request.method == Method::Post && book.delete(cx.pool()).await? {
            cx.flash("Book was successfully deleted", FlashKind::Success);
            return Err(cx.redirect("/books/index"));
        }

        let content = views::books::delete(cx.base_path(), &book);
        cx.render("Delete book", &content).await
    }

    async fn borrow(&self, cx: &mut Ctx) -> ActionResult {
        let user = cx.require_login().await?;
        cx.require_post()?;
        let id = route_id(&self.params)?;

        let book = Book::get(cx.pool(), id).await?;
        let max_borrowed = cx.config().max_borrowed;
        match loans::borrow(cx.pool(), &user, book.book_id, max_borrowed).await? {
            Ok(()) => cx.flash(format!("You borrowed \"{}\"", book.title), FlashKind::Success),
            Err(refusal) => cx.flash(refusal.to_string(), FlashKind::Warning),
        }
        Err(cx.redirect(&format!("/books/show/{id}")))
    }

    async fn return_book(&self, cx: &mut Ctx) -> ActionResult {
        let user = cx.require_login().await?;
        cx.require_post()?;
        let id = route_id(&self.params)?;

        let book = Book::get(cx.pool(), id).await?;
        match loans::return_book(cx.pool(), &user, book.book_id).await? {
            Ok(()) => cx.flash(format!("You returned \"{}\"", book.title), FlashKind::Success),
            Err(refusal) => cx.flash(refusal.to_string(), FlashKind::Warning),
        }
        Err(cx.redirect("/profile/show"))
    }
}

impl Controller<Ctx> for Books {
    fn call<'a>(&'a self, action: &str, cx: &'a mut Ctx) -> Option<BoxFuture<'a, ActionResult>> {
        let fut: BoxFuture<'a, ActionResult> = match action {
            "index" => Box::pin(self.index(cx)),
            "search" => Box::pin(self.search(cx)),
            "show" => Box::pin(self.show(cx)),
            "new" => Box::pin(self.new_form(cx)),
            "create" => Box::pin(self.create(cx)),
            "edit" => Box::pin(self.edit(cx)),
            "update" => Box::pin(self.update(cx)),
            "delete" => Box::pin(self.delete(cx)),
            "borrow" => Box::pin(self.borrow(cx)),
            "return" => Box::pin(self.return_book(cx)),
            _ => return None,
        };
        Some(fut)
    }
}
