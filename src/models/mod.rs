//! Core data models for the book catalog.
//!
//! `Book` and `Author` map to database tables via `sqlx::FromRow`.
//! `forms` holds the typed request schemas that are validated at the HTTP
//! boundary before anything reaches the store.

pub mod author;
pub mod book;
pub mod cover;
pub mod forms;
