//! Data models for formguide
//!
//! Defines the single entity, [`Item`], plus the input shapes used to create
//! and edit it. Items serialize with camelCase field names so that exported
//! files and share tokens keep the `createdAt`/`updatedAt` wire format.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Soft limit on title length, enforced by the shell rather than the store
pub const MAX_TITLE_CHARS: usize = 80;

/// One exercise-guide entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Unique identifier, minted at creation and never reassigned
    pub id: String,
    /// Display title (never blank)
    pub title: String,
    /// Instructions
    #[serde(default)]
    pub content: String,
    /// Cautions and contraindications
    #[serde(default)]
    pub caution: String,
    /// Reference link (free text, not validated)
    #[serde(default)]
    pub link: String,
    /// Tags in insertion order, duplicates kept
    #[serde(default)]
    pub tags: Vec<String>,
    /// Creation time in epoch milliseconds
    pub created_at: i64,
    /// Last edit time in epoch milliseconds
    pub updated_at: i64,
}

impl Item {
    /// Build a new item from a draft, minting a fresh id
    ///
    /// The draft is assumed to be validated; see [`ItemDraft::validate`].
    pub fn from_draft(draft: &ItemDraft, now: i64) -> Self {
        Self {
            id: new_id(),
            title: draft.title.trim().to_string(),
            content: draft.content.clone(),
            caution: draft.caution.clone(),
            link: draft.link.clone(),
            tags: parse_tags(&draft.tags),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply the fields named in `patch` and refresh `updated_at`
    pub fn apply_patch(&mut self, patch: &ItemPatch, now: i64) {
        if let Some(ref title) = patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(ref content) = patch.content {
            self.content = content.clone();
        }
        if let Some(ref caution) = patch.caution {
            self.caution = caution.clone();
        }
        if let Some(ref link) = patch.link {
            self.link = link.clone();
        }
        if let Some(ref tags) = patch.tags {
            self.tags = parse_tags(tags);
        }
        self.updated_at = now.max(self.created_at);
    }

    /// Text searched by the query engine
    pub fn haystack(&self) -> String {
        format!(
            "{} {} {} {}",
            self.title,
            self.content,
            self.caution,
            self.tags.join(" ")
        )
    }

    /// Tags rendered as `#a #b`
    pub fn hashtags(&self) -> String {
        self.tags
            .iter()
            .map(|t| format!("#{}", t))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Fields submitted when creating an item
///
/// `tags` is the raw comma-separated input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemDraft {
    pub title: String,
    pub content: String,
    pub caution: String,
    pub link: String,
    pub tags: String,
}

impl ItemDraft {
    /// Create a draft with only a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn caution(mut self, caution: impl Into<String>) -> Self {
        self.caution = caution.into();
        self
    }

    pub fn link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }

    pub fn tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self
    }

    /// Check that the title is not blank
    pub fn validate(&self) -> Result<(), String> {
        validate_title(&self.title)
    }
}

/// Fields replaced by an edit; `None` leaves the field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub caution: Option<String>,
    pub link: Option<String>,
    /// Raw comma-separated input
    pub tags: Option<String>,
}

impl ItemPatch {
    /// True if no field would change
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.caution.is_none()
            && self.link.is_none()
            && self.tags.is_none()
    }

    /// Check that a replacement title, if any, is not blank
    pub fn validate(&self) -> Result<(), String> {
        match self.title {
            Some(ref title) => validate_title(title),
            None => Ok(()),
        }
    }
}

fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        Err("title is required".to_string())
    } else {
        Ok(())
    }
}

/// Split comma-separated tag input, trimming each segment and dropping blanks
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Mint a new item id
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current time in epoch milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_draft() {
        let draft = ItemDraft::new("  Neck Tilt ")
            .content("Tilt slowly")
            .tags(" neck, , mobility ,neck");
        let item = Item::from_draft(&draft, 1_000);

        assert_eq!(item.title, "Neck Tilt");
        assert_eq!(item.content, "Tilt slowly");
        assert_eq!(item.tags, vec!["neck", "mobility", "neck"]);
        assert_eq!(item.created_at, 1_000);
        assert_eq!(item.updated_at, 1_000);
        assert!(!item.id.is_empty());
    }

    #[test]
    fn test_ids_are_unique() {
        let draft = ItemDraft::new("Same");
        let a = Item::from_draft(&draft, 0);
        let b = Item::from_draft(&draft, 0);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_apply_patch() {
        let mut item = Item::from_draft(&ItemDraft::new("Squat").caution("knees"), 100);
        let patch = ItemPatch {
            content: Some("Feet shoulder width".to_string()),
            tags: Some("legs".to_string()),
            ..Default::default()
        };
        item.apply_patch(&patch, 200);

        assert_eq!(item.title, "Squat");
        assert_eq!(item.caution, "knees");
        assert_eq!(item.content, "Feet shoulder width");
        assert_eq!(item.tags, vec!["legs"]);
        assert_eq!(item.created_at, 100);
        assert_eq!(item.updated_at, 200);
    }

    #[test]
    fn test_apply_patch_never_precedes_creation() {
        let mut item = Item::from_draft(&ItemDraft::new("Plank"), 500);
        item.apply_patch(&ItemPatch::default(), 10);
        assert_eq!(item.updated_at, 500);
    }

    #[test]
    fn test_validate_title() {
        assert!(ItemDraft::new("   ").validate().is_err());
        assert!(ItemDraft::new("Lunge").validate().is_ok());

        let patch = ItemPatch {
            title: Some("\t".to_string()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
        assert!(ItemPatch::default().validate().is_ok());
        assert!(ItemPatch::default().is_empty());
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(parse_tags("a, b ,c"), vec!["a", "b", "c"]);
        assert!(parse_tags("").is_empty());
        assert!(parse_tags(" , ,").is_empty());
    }

    #[test]
    fn test_haystack_and_hashtags() {
        let item = Item::from_draft(
            &ItemDraft::new("Bridge").content("Lift hips").tags("glutes, core"),
            0,
        );
        assert_eq!(item.haystack(), "Bridge Lift hips  glutes core");
        assert_eq!(item.hashtags(), "#glutes #core");
    }

    #[test]
    fn test_serialization_uses_camel_case() {
        let item = Item::from_draft(&ItemDraft::new("Calf Raise"), 42);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["createdAt"], 42);
        assert_eq!(json["updatedAt"], 42);
        assert!(json.get("created_at").is_none());

        let back: Item = serde_json::from_value(json).unwrap();
        assert_eq!(back, item);
    }
}
