//! Item list persistence
//!
//! Reads and writes the whole item list as a JSON array under one fixed key.
//! Loading never fails: an absent, unreadable or corrupt value degrades to an
//! empty list. Saving always overwrites the full list.
//!
//! Storage location: `<data_dir>/exercise-guides.json` (configurable via `Config`)

use crate::models::{now_millis, Item};
use crate::sanitize::{sanitize_value, SanitizePolicy};

use super::error::StorageResult;
use super::kv::KeyValueStore;

/// Key under which the item list is stored
pub const STORAGE_KEY: &str = "exercise-guides";

/// Persistence adapter binding the item list to a key-value backend
pub struct ItemPersistence<S> {
    backend: S,
}

impl<S: KeyValueStore> ItemPersistence<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    /// Get the backend
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Get mutable access to the backend
    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    /// Load the stored list, or an empty list if it is absent or corrupt
    ///
    /// Individual malformed records are dropped.
    pub fn load(&self) -> Vec<Item> {
        let raw = match self.backend.get(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!("No stored items under '{}'", STORAGE_KEY);
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!("Failed to read stored items: {}", e);
                return Vec::new();
            }
        };

        let value: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Stored items are not valid JSON, starting empty: {}", e);
                return Vec::new();
            }
        };

        match sanitize_value(&value, SanitizePolicy::Import, now_millis()) {
            Ok(items) => {
                tracing::debug!("Loaded {} item(s)", items.len());
                items
            }
            Err(e) => {
                tracing::warn!("Stored items are unusable, starting empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Overwrite the stored list
    pub fn save(&mut self, items: &[Item]) -> StorageResult<()> {
        let json = serde_json::to_string(items)?;
        self.backend.set(STORAGE_KEY, &json)?;
        tracing::debug!("Saved {} item(s)", items.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemDraft;
    use crate::storage::{FileKeyValueStore, MemoryKeyValueStore, StorageError};
    use tempfile::TempDir;

    fn sample_items() -> Vec<Item> {
        vec![
            Item::from_draft(&ItemDraft::new("Shoulder Stretch").tags("shoulder"), 2),
            Item::from_draft(
                &ItemDraft::new("Knee Bend")
                    .caution("Stop if it hurts")
                    .link("https://example.com/knee"),
                1,
            ),
        ]
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let mut persistence = ItemPersistence::new(FileKeyValueStore::new(temp_dir.path()));

        assert!(persistence.load().is_empty());

        let items = sample_items();
        persistence.save(&items).unwrap();
        assert_eq!(persistence.load(), items);
        assert!(temp_dir.path().join("exercise-guides.json").exists());
    }

    #[test]
    fn test_save_overwrites() {
        let mut persistence = ItemPersistence::new(MemoryKeyValueStore::new());
        let items = sample_items();

        persistence.save(&items).unwrap();
        persistence.save(&items[1..]).unwrap();
        assert_eq!(persistence.load(), items[1..].to_vec());
    }

    #[test]
    fn test_load_corrupt_json_is_empty() {
        let mut backend = MemoryKeyValueStore::new();
        backend.insert_raw(STORAGE_KEY, "{not json");
        let persistence = ItemPersistence::new(backend);

        assert!(persistence.load().is_empty());
    }

    #[test]
    fn test_load_non_array_is_empty() {
        let mut backend = MemoryKeyValueStore::new();
        backend.insert_raw(STORAGE_KEY, r#"{"id": "a", "title": "b"}"#);
        let persistence = ItemPersistence::new(backend);

        assert!(persistence.load().is_empty());
    }

    #[test]
    fn test_load_drops_malformed_records() {
        let mut backend = MemoryKeyValueStore::new();
        backend.insert_raw(
            STORAGE_KEY,
            r#"[{"id": "a", "title": "Good", "createdAt": 1, "updatedAt": 1}, {"title": "no id"}]"#,
        );
        let persistence = ItemPersistence::new(backend);

        let items = persistence.load();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Good");
    }

    #[test]
    fn test_save_rejected() {
        let mut persistence = ItemPersistence::new(MemoryKeyValueStore::new());
        persistence.save(&sample_items()).unwrap();

        persistence.backend_mut().reject_writes("quota exceeded");
        let err = persistence.save(&[]).unwrap_err();
        assert!(matches!(err, StorageError::Rejected { .. }));

        // last successful save is still what loads
        assert_eq!(persistence.load().len(), 2);
    }
}
