//! Error taxonomy for store operations
//!
//! Validation and not-found errors are meant to be shown to the user right
//! away. Decode and storage errors are degradations: callers fall back to the
//! previous state.

use thiserror::Error;

use crate::storage::StorageError;

/// Why a share token or JSON payload could not be turned into items
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Token is not valid URL-safe base64
    #[error("Share token is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Decoded bytes are not UTF-8 text
    #[error("Share token does not contain UTF-8 text: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Text is not JSON
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON parsed but the top-level value is not an array
    #[error("Expected a JSON array of items, found {found}")]
    NotASequence { found: &'static str },
}

/// Errors returned by [`crate::ItemStore`] operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Empty required field or non-array payload
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Malformed share token or JSON text
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// No item with the given id
    #[error("Item not found: {0}")]
    NotFound(String),

    /// Persistence write rejected
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl StoreError {
    /// Whether the user can fix this by changing their input
    pub fn is_user_error(&self) -> bool {
        matches!(self, StoreError::Validation(_) | StoreError::NotFound(_))
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Name of a JSON value's kind, for error messages
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
