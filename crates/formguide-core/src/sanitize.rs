//! Lenient schema for incoming item records
//!
//! Import files, share tokens and the persisted list are all untrusted JSON.
//! Each record is coerced field by field instead of rejecting the whole
//! payload. The two policies differ only in what happens to a record that
//! lacks an id or a title:
//!
//! - [`SanitizePolicy::Import`] drops it.
//! - [`SanitizePolicy::Share`] repairs it (mints an id, titles it `Untitled`).
//!
//! Both policies coerce scalar fields to strings, `tags` to a list of
//! strings, and timestamps to epoch milliseconds (defaulting to now).

use std::collections::HashSet;

use chrono::DateTime;
use serde_json::{Map, Value};

use crate::error::{json_kind, DecodeError};
use crate::models::{new_id, parse_tags, Item};

/// Title given to share records that arrive without one
pub const UNTITLED: &str = "Untitled";

/// What to do with records missing required fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanitizePolicy {
    /// Drop records without `id` or `title`, and repeated ids
    Import,
    /// Repair records: mint missing or repeated ids, default blank titles
    Share,
}

/// Sanitize a top-level JSON value that must be an array of records
pub fn sanitize_value(
    value: &Value,
    policy: SanitizePolicy,
    now: i64,
) -> Result<Vec<Item>, DecodeError> {
    match value {
        Value::Array(records) => Ok(sanitize_records(records, policy, now)),
        other => Err(DecodeError::NotASequence {
            found: json_kind(other),
        }),
    }
}

/// Sanitize each record, keeping list order
pub fn sanitize_records(records: &[Value], policy: SanitizePolicy, now: i64) -> Vec<Item> {
    let mut seen = HashSet::new();
    let items: Vec<Item> = records
        .iter()
        .filter_map(|record| sanitize_record(record, policy, now, &mut seen))
        .collect();

    let skipped = records.len() - items.len();
    if skipped > 0 {
        tracing::debug!("Skipped {} malformed record(s) ({:?} policy)", skipped, policy);
    }
    items
}

fn sanitize_record(
    record: &Value,
    policy: SanitizePolicy,
    now: i64,
    seen: &mut HashSet<String>,
) -> Option<Item> {
    let obj = record.as_object()?;

    let title = match non_blank(obj, "title") {
        Some(title) => title,
        None => match policy {
            SanitizePolicy::Import => return None,
            SanitizePolicy::Share => UNTITLED.to_string(),
        },
    };

    let id = match non_blank(obj, "id") {
        Some(id) if !seen.contains(&id) => id,
        _ if policy == SanitizePolicy::Import => return None,
        _ => fresh_id(seen),
    };
    seen.insert(id.clone());

    let created_at = obj
        .get("createdAt")
        .and_then(coerce_timestamp)
        .unwrap_or(now);
    let updated_at = obj
        .get("updatedAt")
        .and_then(coerce_timestamp)
        .unwrap_or(now)
        .max(created_at);

    Some(Item {
        id,
        title,
        content: field_string(obj, "content"),
        caution: field_string(obj, "caution"),
        link: field_string(obj, "link"),
        tags: obj.get("tags").map(coerce_tags).unwrap_or_default(),
        created_at,
        updated_at,
    })
}

fn fresh_id(seen: &HashSet<String>) -> String {
    loop {
        let id = new_id();
        if !seen.contains(&id) {
            return id;
        }
    }
}

fn non_blank(obj: &Map<String, Value>, key: &str) -> Option<String> {
    let value = field_string(obj, key);
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

fn field_string(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key).and_then(coerce_string).unwrap_or_default()
}

/// Strings pass through, numbers and booleans are stringified
fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Arrays keep their non-blank scalar entries; a string is comma-split
fn coerce_tags(value: &Value) -> Vec<String> {
    match value {
        Value::Array(values) => values
            .iter()
            .filter_map(coerce_string)
            .filter(|t| !t.trim().is_empty())
            .collect(),
        Value::String(s) => parse_tags(s),
        _ => Vec::new(),
    }
}

/// Epoch millis from a number, a numeric string, or an RFC 3339 date
fn coerce_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(|f| f as i64)
                })
                .or_else(|| {
                    DateTime::parse_from_rfc3339(s)
                        .ok()
                        .map(|dt| dt.timestamp_millis())
                })
        }
        _ => None,
    }
}
