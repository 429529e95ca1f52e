//! Record store seams used by the HTTP handlers.
//!
//! Handlers only talk to [`BookStore`] and [`AuthorStore`]; the SQLite
//! implementation lives in `sqlite_store`.

use crate::models::{
    author::Author,
    book::{Book, BookFilter},
};
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use super::sqlite_store::SqliteCatalog;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} `{id}` not found")]
    NotFound { entity: &'static str, id: String },
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl StoreError {
    pub fn book_not_found(id: impl ToString) -> Self {
        StoreError::NotFound {
            entity: "book",
            id: id.to_string(),
        }
    }

    pub fn author_not_found(id: impl ToString) -> Self {
        StoreError::NotFound {
            entity: "author",
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait BookStore: Send + Sync + 'static {
    /// All books matching every predicate set in `filter`.
    async fn find_books(&self, filter: &BookFilter) -> StoreResult<Vec<Book>>;

    async fn fetch_book(&self, id: Uuid) -> StoreResult<Book>;

    async fn insert_book(&self, book: &Book) -> StoreResult<Book>;

    /// Overwrite the stored row with `book`. Last write wins.
    async fn update_book(&self, book: &Book) -> StoreResult<Book>;

    async fn delete_book(&self, id: Uuid) -> StoreResult<()>;

    /// Cheap round trip used by the readiness check.
    async fn ping(&self) -> StoreResult<()>;
}

#[async_trait]
pub trait AuthorStore: Send + Sync + 'static {
    async fn list_authors(&self) -> StoreResult<Vec<Author>>;

    async fn fetch_author(&self, id: Uuid) -> StoreResult<Author>;

    async fn insert_author(&self, name: &str) -> StoreResult<Author>;
}

/// Shared handler state: the two record stores.
///
/// Cloned into every request; holds no mutable state of its own.
#[derive(Clone)]
pub struct Catalog {
    pub books: Arc<dyn BookStore>,
    pub authors: Arc<dyn AuthorStore>,
}

impl Catalog {
    pub fn new(books: Arc<dyn BookStore>, authors: Arc<dyn AuthorStore>) -> Self {
        Self { books, authors }
    }

    /// Both stores backed by the same SQLite pool.
    pub fn sqlite(db: SqlitePool) -> Self {
        let store = Arc::new(SqliteCatalog::new(db));
        Self::new(store.clone(), store)
    }
}
