//! HTTP handlers for the book routes.
//!
//! Every store failure ends in a fixed fallback (redirect or re-rendered
//! form) so no error detail reaches the browser. The underlying error is
//! logged, with "not found" kept apart from real store failures.

use crate::{
    errors::AppError,
    models::{
        book::Book,
        forms::{BookDraft, BookForm, ListBooksQuery},
    },
    routes::routes::{BOOKS_PATH, ROOT_PATH, book_path},
    services::{
        cover::{CoverError, CoverOutcome, save_cover},
        store::{Catalog, StoreError},
    },
    views::{self, books::FormKind},
};
use axum::{
    extract::{
        Form, Path, Query, State,
        rejection::{FormRejection, QueryRejection},
    },
    response::{IntoResponse, Redirect, Response},
};
use tracing::{error, info, warn};
use uuid::Uuid;

const REMOVE_ERROR: &str = "Could not remove book";

/// GET `/books` — filtered listing.
pub async fn list_books(
    State(catalog): State<Catalog>,
    query: Result<Query<ListBooksQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(search) = query?;
    let filter = search
        .to_filter()
        .map_err(|err| AppError::bad_request(err.to_string()))?;

    match catalog.books.find_books(&filter).await {
        Ok(books) => Ok(views::books::index(&books, &search).into_response()),
        Err(err) => {
            log_store_error("listing books", None, &err);
            Ok(Redirect::to(ROOT_PATH).into_response())
        }
    }
}

/// GET `/books/new` — empty creation form.
pub async fn new_book(State(catalog): State<Catalog>) -> Response {
    render_form_page(&catalog, FormKind::New, &BookDraft::default(), false).await
}

/// POST `/books` — create a book and redirect to it.
pub async fn create_book(
    State(catalog): State<Catalog>,
    form: Result<Form<BookForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(form) = form?;
    let draft = BookDraft::from_form(None, &form);

    let fields = match form.validate() {
        Ok(fields) => fields,
        Err(err) => {
            warn!(error = %err, "invalid book submission");
            return Ok(render_form_page(&catalog, FormKind::New, &draft, true).await);
        }
    };

    let mut book = Book::new(fields);
    if let Err(err) = attach_cover(&mut book, form.cover()) {
        warn!(error = %err, "rejected cover payload");
        return Ok(render_form_page(&catalog, FormKind::New, &draft, true).await);
    }

    match catalog.books.insert_book(&book).await {
        Ok(saved) => {
            info!(book_id = %saved.id, title = %saved.title, "created book");
            Ok(Redirect::to(&book_path(saved.id)).into_response())
        }
        Err(err) => {
            log_store_error("creating book", None, &err);
            Ok(render_form_page(&catalog, FormKind::New, &draft, true).await)
        }
    }
}

/// GET `/books/{id}` — detail view with the author populated.
pub async fn show_book(State(catalog): State<Catalog>, Path(id): Path<String>) -> Response {
    let populated = async {
        let book = catalog.books.fetch_book(parse_id(&id)?).await?;
        let author = catalog.authors.fetch_author(book.author_id).await?;
        Ok::<_, StoreError>((book, author))
    };

    match populated.await {
        Ok((book, author)) => views::books::show(&book, Some(&author), None).into_response(),
        Err(err) => {
            log_store_error("showing book", Some(&id), &err);
            Redirect::to(ROOT_PATH).into_response()
        }
    }
}

/// GET `/books/{id}/edit` — edit form for an existing book.
pub async fn edit_book(State(catalog): State<Catalog>, Path(id): Path<String>) -> Response {
    match fetch(&catalog, &id).await {
        Ok(book) => {
            render_form_page(&catalog, FormKind::Edit, &BookDraft::from_book(&book), false).await
        }
        Err(err) => {
            log_store_error("loading book for edit", Some(&id), &err);
            Redirect::to(ROOT_PATH).into_response()
        }
    }
}

/// PUT `/books/{id}` — overwrite a book's fields, and its cover if one was sent.
pub async fn update_book(
    State(catalog): State<Catalog>,
    Path(id): Path<String>,
    form: Result<Form<BookForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(form) = form?;

    let mut book = match fetch(&catalog, &id).await {
        Ok(book) => book,
        Err(err) => {
            log_store_error("loading book for update", Some(&id), &err);
            return Ok(Redirect::to(ROOT_PATH).into_response());
        }
    };

    let fields = match form.validate() {
        Ok(fields) => fields,
        Err(err) => {
            warn!(book_id = %book.id, error = %err, "invalid book submission");
            let draft = BookDraft::from_form(Some(book.id), &form);
            return Ok(render_form_page(&catalog, FormKind::Edit, &draft, true).await);
        }
    };

    book.apply(fields);
    if let Some(cover) = form.cover() {
        if let Err(err) = attach_cover(&mut book, Some(cover)) {
            warn!(book_id = %book.id, error = %err, "rejected cover payload");
            let draft = BookDraft::from_book(&book);
            return Ok(render_form_page(&catalog, FormKind::Edit, &draft, true).await);
        }
    }

    match catalog.books.update_book(&book).await {
        Ok(saved) => {
            info!(book_id = %saved.id, "updated book");
            Ok(Redirect::to(&book_path(saved.id)).into_response())
        }
        Err(err) => {
            log_store_error("updating book", Some(&id), &err);
            let draft = BookDraft::from_book(&book);
            Ok(render_form_page(&catalog, FormKind::Edit, &draft, true).await)
        }
    }
}

/// DELETE `/books/{id}` — remove a book and go back to the listing.
pub async fn delete_book(State(catalog): State<Catalog>, Path(id): Path<String>) -> Response {
    let book = match fetch(&catalog, &id).await {
        Ok(book) => book,
        Err(err) => {
            log_store_error("loading book for delete", Some(&id), &err);
            return Redirect::to(ROOT_PATH).into_response();
        }
    };

    match catalog.books.delete_book(book.id).await {
        Ok(()) => {
            info!(book_id = %book.id, "deleted book");
            Redirect::to(BOOKS_PATH).into_response()
        }
        Err(err) => {
            log_store_error("deleting book", Some(&id), &err);
            let author = catalog.authors.fetch_author(book.author_id).await.ok();
            views::books::show(&book, author.as_ref(), Some(REMOVE_ERROR)).into_response()
        }
    }
}

/// Render `books/new` or `books/edit` with a fresh author list.
///
/// If the authors cannot be loaded the form would be unusable, so the user
/// is sent back to the listing instead.
async fn render_form_page(
    catalog: &Catalog,
    kind: FormKind,
    draft: &BookDraft,
    has_error: bool,
) -> Response {
    match catalog.authors.list_authors().await {
        Ok(authors) => {
            let error = has_error.then(|| kind.error_message());
            views::books::form(kind, &authors, draft, error).into_response()
        }
        Err(err) => {
            log_store_error(kind.template(), None, &err);
            Redirect::to(BOOKS_PATH).into_response()
        }
    }
}

async fn fetch(catalog: &Catalog, id: &str) -> Result<Book, StoreError> {
    catalog.books.fetch_book(parse_id(id)?).await
}

/// Ids that do not parse cannot exist, so they are reported as not found.
fn parse_id(id: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(id).map_err(|_| StoreError::book_not_found(id))
}

fn attach_cover(book: &mut Book, cover: Option<&str>) -> Result<(), CoverError> {
    match save_cover(book, cover)? {
        CoverOutcome::Attached => {
            info!(book_id = %book.id, mime_type = ?book.cover_image_type, "attached cover")
        }
        CoverOutcome::Rejected(mime_type) => {
            warn!(book_id = %book.id, ?mime_type, "ignoring cover with unsupported type")
        }
        CoverOutcome::Skipped => {}
    }
    Ok(())
}

fn log_store_error(action: &str, book_id: Option<&str>, err: &StoreError) {
    if err.is_not_found() {
        info!(action, book_id, error = %err, "record not found");
    } else {
        error!(action, book_id, error = %err, "store operation failed");
    }
}
