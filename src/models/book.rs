//! Represents a book record in the catalog.

use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A single book record.
///
/// The cover is embedded in the record. `cover_image` and `cover_image_type`
/// are either both set or both empty; use [`Book::set_cover`] to change them.
#[derive(Clone, FromRow, Debug)]
pub struct Book {
    /// Internal UUID for DB indexing.
    pub id: Uuid,

    pub title: String,

    /// Id of the referenced author. Not checked against the authors table.
    pub author_id: Uuid,

    pub publish_date: NaiveDate,

    pub page_count: i64,

    pub description: String,

    /// Raw image bytes.
    pub cover_image: Option<Vec<u8>>,

    /// Declared MIME type of `cover_image`.
    pub cover_image_type: Option<String>,

    /// Timestamp when the record was created.
    pub created_at: DateTime<Utc>,
}

/// Validated scalar fields submitted through the create and edit forms.
#[derive(Clone, Debug, PartialEq)]
pub struct BookFields {
    pub title: String,
    pub author_id: Uuid,
    pub publish_date: NaiveDate,
    pub page_count: i64,
    pub description: String,
}

/// Optional predicates for listing books. Unset fields do not filter.
///
/// Supplied predicates combine with AND; dates are inclusive bounds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BookFilter {
    /// Case-insensitive substring of the title.
    pub title: Option<String>,
    pub published_before: Option<NaiveDate>,
    pub published_after: Option<NaiveDate>,
}

impl Book {
    /// Build a new, not yet persisted record without a cover.
    pub fn new(fields: BookFields) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: fields.title,
            author_id: fields.author_id,
            publish_date: fields.publish_date,
            page_count: fields.page_count,
            description: fields.description,
            cover_image: None,
            cover_image_type: None,
            created_at: Utc::now(),
        }
    }

    /// Overwrite every scalar field. The cover is left alone.
    pub fn apply(&mut self, fields: BookFields) {
        self.title = fields.title;
        self.author_id = fields.author_id;
        self.publish_date = fields.publish_date;
        self.page_count = fields.page_count;
        self.description = fields.description;
    }

    pub fn set_cover(&mut self, image: Vec<u8>, mime_type: impl Into<String>) {
        self.cover_image = Some(image);
        self.cover_image_type = Some(mime_type.into());
    }

    /// Inline `data:` URI for the cover, suitable for an `<img src>`.
    pub fn cover_image_path(&self) -> Option<String> {
        match (&self.cover_image, &self.cover_image_type) {
            (Some(image), Some(mime_type)) => Some(format!(
                "data:{};charset=utf-8;base64,{}",
                mime_type,
                general_purpose::STANDARD.encode(image)
            )),
            _ => None,
        }
    }
}
