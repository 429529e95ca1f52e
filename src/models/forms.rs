//! Request schemas for the book routes.
//!
//! Axum deserializes bodies and query strings into these types; everything
//! arrives as text and is validated here so invalid values never reach the
//! store.

use super::book::{Book, BookFields, BookFilter};
use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("title must not be empty")]
    MissingTitle,
    #[error("author `{0}` is not a valid id")]
    InvalidAuthor(String),
    #[error("{field} `{value}` is not a date (expected YYYY-MM-DD)")]
    InvalidDate { field: &'static str, value: String },
    #[error("page count `{0}` must be a positive whole number")]
    InvalidPageCount(String),
}

/// Query string accepted by `GET /books`.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBooksQuery {
    pub title: Option<String>,
    pub published_before: Option<String>,
    pub published_after: Option<String>,
}

impl ListBooksQuery {
    /// Turn the raw query into a filter. Empty values count as absent.
    pub fn to_filter(&self) -> Result<BookFilter, FormError> {
        Ok(BookFilter {
            title: non_empty(self.title.as_deref()).map(str::to_string),
            published_before: parse_date_opt("publishedBefore", self.published_before.as_deref())?,
            published_after: parse_date_opt("publishedAfter", self.published_after.as_deref())?,
        })
    }
}

/// Body of `POST /books` and `PUT /books/{id}`.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookForm {
    #[serde(default)]
    pub title: String,
    /// Author id.
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub publish_date: String,
    #[serde(default)]
    pub page_count: String,
    #[serde(default)]
    pub description: String,
    /// JSON-encoded cover payload, see [`super::cover::CoverPayload`].
    pub cover: Option<String>,
}

impl BookForm {
    pub fn validate(&self) -> Result<BookFields, FormError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(FormError::MissingTitle);
        }

        let author_id = Uuid::parse_str(self.author.trim())
            .map_err(|_| FormError::InvalidAuthor(self.author.clone()))?;

        let publish_date = parse_date("publishDate", self.publish_date.trim())?;

        let page_count = self
            .page_count
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|count| *count > 0)
            .ok_or_else(|| FormError::InvalidPageCount(self.page_count.clone()))?;

        Ok(BookFields {
            title: title.to_string(),
            author_id,
            publish_date,
            page_count,
            description: self.description.clone(),
        })
    }

    /// Cover payload, if one was actually submitted.
    pub fn cover(&self) -> Option<&str> {
        non_empty(self.cover.as_deref())
    }
}

/// Values shown in the create/edit forms. Built from a stored record, or from
/// a rejected submission so the user does not lose what they typed.
#[derive(Debug, Default, Clone)]
pub struct BookDraft {
    pub id: Option<Uuid>,
    pub title: String,
    pub author_id: String,
    pub publish_date: String,
    pub page_count: String,
    pub description: String,
    pub cover_image_path: Option<String>,
}

impl BookDraft {
    pub fn from_book(book: &Book) -> Self {
        Self {
            id: Some(book.id),
            title: book.title.clone(),
            author_id: book.author_id.to_string(),
            publish_date: book.publish_date.format(DATE_FORMAT).to_string(),
            page_count: book.page_count.to_string(),
            description: book.description.clone(),
            cover_image_path: book.cover_image_path(),
        }
    }

    pub fn from_form(id: Option<Uuid>, form: &BookForm) -> Self {
        Self {
            id,
            title: form.title.clone(),
            author_id: form.author.clone(),
            publish_date: form.publish_date.clone(),
            page_count: form.page_count.clone(),
            description: form.description.clone(),
            cover_image_path: None,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, FormError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| FormError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

fn parse_date_opt(field: &'static str, value: Option<&str>) -> Result<Option<NaiveDate>, FormError> {
    non_empty(value).map(|v| parse_date(field, v)).transpose()
}
