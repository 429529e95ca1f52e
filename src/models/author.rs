//! Represents an author that books reference by id.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// An author record. Books hold a non-owning reference to exactly one author.
#[derive(Clone, FromRow, Debug)]
pub struct Author {
    pub id: Uuid,

    pub name: String,

    /// When this author was added to the catalog.
    pub created_at: DateTime<Utc>,
}
