//! src/services/sqlite_store.rs
//!
//! SQLite-backed implementation of the book and author stores. Covers are
//! stored inline in the `books` row; there is no on-disk payload.

use super::store::{AuthorStore, BookStore, StoreError, StoreResult};
use crate::models::{
    author::Author,
    book::{Book, BookFilter},
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, SqlitePool, sqlite::Sqlite};
use tracing::debug;
use uuid::Uuid;

const BOOK_COLUMNS: &str = "id, title, author_id, publish_date, page_count, description, \
                            cover_image, cover_image_type, created_at";

/// Lowercased copy of the title kept beside it for searching. SQLite's own
/// `LIKE` and `lower()` only fold ASCII.
fn fold_title(title: &str) -> String {
    title.to_lowercase()
}

#[derive(Clone)]
pub struct SqliteCatalog {
    /// Shared SQLite connection pool.
    pub db: SqlitePool,
}

impl SqliteCatalog {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BookStore for SqliteCatalog {
    /// List books through a single dynamically built query.
    ///
    /// Each filter appends one `AND` clause; with no filters the query
    /// degenerates to a full scan.
    async fn find_books(&self, filter: &BookFilter) -> StoreResult<Vec<Book>> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT ");
        builder.push(BOOK_COLUMNS);
        builder.push(" FROM books");
        push_book_filter(&mut builder, filter);

        debug!(sql = builder.sql(), ?filter, "listing books");
        let rows: Vec<Book> = builder.build_query_as().fetch_all(&self.db).await?;
        Ok(rows)
    }

    async fn fetch_book(&self, id: Uuid) -> StoreResult<Book> {
        sqlx::query_as::<_, Book>(&format!("SELECT {} FROM books WHERE id = ?", BOOK_COLUMNS))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| StoreError::book_not_found(id))
    }

    async fn insert_book(&self, book: &Book) -> StoreResult<Book> {
        let saved = sqlx::query_as::<_, Book>(&format!(
            "INSERT INTO books ({cols}, title_folded) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING {cols}",
            cols = BOOK_COLUMNS
        ))
        .bind(book.id)
        .bind(&book.title)
        .bind(book.author_id)
        .bind(book.publish_date)
        .bind(book.page_count)
        .bind(&book.description)
        .bind(book.cover_image.as_deref())
        .bind(book.cover_image_type.as_deref())
        .bind(book.created_at)
        .bind(fold_title(&book.title))
        .fetch_one(&self.db)
        .await?;

        debug!(book_id = %saved.id, "inserted book");
        Ok(saved)
    }

    async fn update_book(&self, book: &Book) -> StoreResult<Book> {
        sqlx::query_as::<_, Book>(&format!(
            "UPDATE books SET
                title = ?, title_folded = ?, author_id = ?, publish_date = ?, page_count = ?,
                description = ?, cover_image = ?, cover_image_type = ?
             WHERE id = ?
             RETURNING {}",
            BOOK_COLUMNS
        ))
        .bind(&book.title)
        .bind(fold_title(&book.title))
        .bind(book.author_id)
        .bind(book.publish_date)
        .bind(book.page_count)
        .bind(&book.description)
        .bind(book.cover_image.as_deref())
        .bind(book.cover_image_type.as_deref())
        .bind(book.id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| StoreError::book_not_found(book.id))
    }

    async fn delete_book(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::book_not_found(id));
        }
        debug!(book_id = %id, "deleted book");
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.db)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl AuthorStore for SqliteCatalog {
    async fn list_authors(&self) -> StoreResult<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>(
            "SELECT id, name, created_at FROM authors ORDER BY name ASC",
        )
        .fetch_all(&self.db)
        .await?;
        Ok(authors)
    }

    async fn fetch_author(&self, id: Uuid) -> StoreResult<Author> {
        sqlx::query_as::<_, Author>("SELECT id, name, created_at FROM authors WHERE id = ?")
            .bind(id)
            .fetch_one(&self.db)
            .await
            .map_err(|err| match err {
                sqlx::Error::RowNotFound => StoreError::author_not_found(id),
                other => StoreError::Sqlx(other),
            })
    }

    async fn insert_author(&self, name: &str) -> StoreResult<Author> {
        let author = sqlx::query_as::<_, Author>(
            "INSERT INTO authors (id, name, created_at) VALUES (?, ?, ?)
             RETURNING id, name, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await?;
        Ok(author)
    }
}

/// Append the `WHERE` clause for `filter` to a `SELECT ... FROM books` query.
fn push_book_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &BookFilter) {
    builder.push(" WHERE 1 = 1");

    if let Some(title) = &filter.title {
        builder.push(" AND title_folded LIKE ");
        builder.push_bind(contains_pattern(&fold_title(title)));
        builder.push(" ESCAPE '\\'");
    }

    if let Some(before) = filter.published_before {
        builder.push(" AND publish_date <= ");
        builder.push_bind(before);
    }

    if let Some(after) = filter.published_after {
        builder.push(" AND publish_date >= ");
        builder.push_bind(after);
    }
}

/// `%needle%` with LIKE wildcards in `needle` escaped.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
