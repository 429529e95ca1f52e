//! Cover payload validation.
//!
//! Browsers post the cover as a JSON string `{"type": ..., "data": <base64>}`
//! inside the book form. This module turns that into the book's cover fields.

use crate::models::{book::Book, cover::CoverPayload};
use base64::{
    Engine as _, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use serde_json::Value;
use thiserror::Error;

/// Declared MIME types accepted for covers.
///
/// `images/gif` is misspelled and never matches a real upload; it is kept
/// as-is because fixing it would start accepting GIF covers.
pub const IMAGE_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/png", "images/gif"];

/// Standard alphabet, padding optional.
const COVER_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Error)]
pub enum CoverError {
    #[error("cover payload is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("cover of type {0} carries no base64 data")]
    MissingData(String),
    #[error("cover data is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),
}

/// What [`save_cover`] did to the book.
#[derive(Debug, PartialEq, Eq)]
pub enum CoverOutcome {
    /// Nothing submitted; existing cover untouched.
    Skipped,
    Attached,
    /// Declared type missing or not in [`IMAGE_MIME_TYPES`]; existing cover
    /// untouched.
    Rejected(Option<String>),
}

/// Attach the encoded cover to `book`.
///
/// Absent, empty or `null` payloads leave the book alone. Any other JSON
/// without an allowed string `type` is rejected without touching the book.
/// Malformed JSON, an allowed type with no string `data`, or bad base64 is an
/// error and callers abort the save.
pub fn save_cover(book: &mut Book, cover_encoded: Option<&str>) -> Result<CoverOutcome, CoverError> {
    let Some(encoded) = cover_encoded.filter(|c| !c.is_empty()) else {
        return Ok(CoverOutcome::Skipped);
    };

    let value: Value = serde_json::from_str(encoded)?;
    if value.is_null() {
        return Ok(CoverOutcome::Skipped);
    }

    let cover = CoverPayload::from_json(value);
    let mime_type = match cover.declared_type() {
        Some(mime_type) if IMAGE_MIME_TYPES.contains(&mime_type) => mime_type,
        other => return Ok(CoverOutcome::Rejected(other.map(str::to_owned))),
    };

    let data = cover
        .encoded_data()
        .ok_or_else(|| CoverError::MissingData(mime_type.to_owned()))?;
    let image = COVER_ENGINE.decode(data.as_bytes())?;
    book.set_cover(image, mime_type);
    Ok(CoverOutcome::Attached)
}
