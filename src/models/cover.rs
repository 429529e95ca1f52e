//! Wire shape of the cover image submitted with the book forms.

use serde::Deserialize;
use serde_json::Value;

/// Cover payload as posted in the `cover` form field, JSON-encoded:
/// `{"type": "image/png", "data": "<base64>"}`.
///
/// Only lives for the duration of a request; it is converted into the
/// book's cover fields and never stored in this shape. Both fields are
/// loosely typed: a payload of the wrong shape simply has no usable type.
#[derive(Debug, Default, Deserialize)]
pub struct CoverPayload {
    /// Declared MIME type.
    #[serde(rename = "type", default)]
    pub mime_type: Option<Value>,

    /// Base64-encoded image bytes.
    #[serde(default)]
    pub data: Option<Value>,
}

impl CoverPayload {
    /// Read the payload out of any JSON value. Anything but an object
    /// yields an empty payload.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => serde_json::from_value(Value::Object(map)).unwrap_or_default(),
            _ => Self::default(),
        }
    }

    /// The declared type, if it is a string.
    pub fn declared_type(&self) -> Option<&str> {
        self.mime_type.as_ref().and_then(Value::as_str)
    }

    /// The encoded bytes, if they are a string.
    pub fn encoded_data(&self) -> Option<&str> {
        self.data.as_ref().and_then(Value::as_str)
    }
}
