//! Defines routes for the book catalog.
//!
//! ## Structure
//! - **Site**
//!   - `GET    /`         — home page
//!   - `GET    /healthz`  — liveness
//!   - `GET    /readyz`   — readiness
//!
//! - **Books** (mounted under `/books`)
//!   - `GET    /books`            — list books (supports title, publishedBefore, publishedAfter)
//!   - `POST   /books`            — create book
//!   - `GET    /books/new`        — creation form
//!   - `GET    /books/{id}`       — detail view
//!   - `PUT    /books/{id}`       — update book
//!   - `DELETE /books/{id}`       — delete book
//!   - `GET    /books/{id}/edit`  — edit form
//!
//! Browsers reach PUT and DELETE through `POST ...?_method=`; see
//! `method_override`.

use crate::{
    handlers::{
        book_handlers::{
            create_book, delete_book, edit_book, list_books, new_book, show_book, update_book,
        },
        health_handlers::{healthz, readyz},
        site_handlers::home,
    },
    services::store::Catalog,
};
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub const ROOT_PATH: &str = "/";
pub const BOOKS_PATH: &str = "/books";

/// Detail page of a book.
pub fn book_path(id: Uuid) -> String {
    format!("{}/{}", BOOKS_PATH, id)
}

/// Build and return the router for all catalog routes.
///
/// The router carries shared state (`Catalog`) to all handlers.
pub fn routes() -> Router<Catalog> {
    let book_routes = Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/new", get(new_book))
        .route(
            "/{id}",
            get(show_book).put(update_book).delete(delete_book),
        )
        .route("/{id}/edit", get(edit_book));

    Router::new()
        .route(ROOT_PATH, get(home))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .nest(BOOKS_PATH, book_routes)
}

/// Fully wired application router with request tracing.
pub fn app(catalog: Catalog) -> Router {
    routes()
        .layer(TraceLayer::new_for_http())
        .with_state(catalog)
}
