//! View derivation: free-text filter plus sort
//!
//! Everything here is pure. The displayed list is always
//! `sort(filter(items, query), key)` and can be recomputed at will.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::Item;

/// Ordering applied to the view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortKey {
    /// Ascending by title
    Title,
    /// Most recently edited first
    #[default]
    UpdatedAt,
    /// Most recently created first
    CreatedAt,
    /// Unrecognized key; compared as a missing numeric field
    Other(String),
}

impl SortKey {
    pub fn as_str(&self) -> &str {
        match self {
            SortKey::Title => "title",
            SortKey::UpdatedAt => "updatedAt",
            SortKey::CreatedAt => "createdAt",
            SortKey::Other(key) => key,
        }
    }

    /// Numeric value used for descending comparison, if the key names one
    fn numeric(&self, item: &Item) -> i64 {
        match self {
            SortKey::UpdatedAt => item.updated_at,
            SortKey::CreatedAt => item.created_at,
            // no such field on an item; every value reads as 0
            SortKey::Title | SortKey::Other(_) => 0,
        }
    }
}

impl FromStr for SortKey {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "title" => SortKey::Title,
            "updatedAt" | "updated_at" | "updated" => SortKey::UpdatedAt,
            "createdAt" | "created_at" | "created" => SortKey::CreatedAt,
            other => SortKey::Other(other.to_string()),
        })
    }
}

impl From<String> for SortKey {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(key) => key,
            Err(never) => match never {},
        }
    }
}

impl From<SortKey> for String {
    fn from(key: SortKey) -> Self {
        key.as_str().to_string()
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Keep items whose text contains `query`, case-insensitively
///
/// A blank query returns every item in the original order.
pub fn filter(items: &[Item], query: &str) -> Vec<Item> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return items.to_vec();
    }

    items
        .iter()
        .filter(|item| item.haystack().to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Return a sorted copy of `items`
///
/// The sort is stable, so an unrecognized key leaves the input order intact.
pub fn sort(items: &[Item], key: &SortKey) -> Vec<Item> {
    let mut sorted = items.to_vec();
    match key {
        SortKey::Title => sorted.sort_by(|a, b| compare_titles(&a.title, &b.title)),
        _ => sorted.sort_by(|a, b| key.numeric(b).cmp(&key.numeric(a))),
    }
    sorted
}

/// Filter then sort
pub fn derive_view(items: &[Item], query: &str, key: &SortKey) -> Vec<Item> {
    sort(&filter(items, query), key)
}

/// Case-insensitive title order, ties broken by the raw text
fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
