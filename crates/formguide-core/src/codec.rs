//! Share token codec
//!
//! A token is the item list serialized as JSON, taken as UTF-8 bytes and
//! encoded with the URL-safe base64 alphabet without padding. Working on the
//! UTF-8 bytes keeps titles in any script intact, and the alphabet needs no
//! escaping inside a query value.

use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;

use crate::error::DecodeError;
use crate::models::{now_millis, Item};
use crate::sanitize::{sanitize_value, SanitizePolicy};

/// Encode a list of items into a share token
pub fn encode(items: &[Item]) -> String {
    // Vec<Item> has only string and integer fields; serialization cannot fail.
    let json = serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string());
    URL_SAFE_NO_PAD.encode(json.as_bytes())
}

/// Decode a share token back into items
///
/// Records are repaired with the share policy rather than dropped.
pub fn decode(token: &str) -> Result<Vec<Item>, DecodeError> {
    let token = token.trim();
    let bytes = if token.ends_with('=') {
        URL_SAFE.decode(token)?
    } else {
        URL_SAFE_NO_PAD.decode(token)?
    };
    let text = String::from_utf8(bytes)?;
    let value: serde_json::Value = serde_json::from_str(&text)?;
    sanitize_value(&value, SanitizePolicy::Share, now_millis())
}
