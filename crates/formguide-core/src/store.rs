//! Item store
//!
//! The `ItemStore` is the single source of truth for the item list. It owns:
//! - the in-memory list (most recent first)
//! - the persistence binding (full rewrite after every mutation)
//! - the current selection
//! - observers notified of every change
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = ItemStore::open_with_config(&Config::load()?);
//!
//! let id = store.create(&ItemDraft::new("Neck Tilt").tags("neck, mobility"))?;
//! store.update(&id, &ItemPatch { caution: Some("Go slow".into()), ..Default::default() })?;
//!
//! let view = store.view("neck", &SortKey::Title);
//! ```
//!
//! Destructive operations that need a user confirmation come in two steps:
//! `request_delete` returns a [`DeleteIntent`] that is applied with
//! `confirm_delete`. Dropping the intent cancels.
//!
//! A rejected persistence write does not fail the mutation. The in-memory
//! list stays authoritative, the error is logged and kept in
//! `last_storage_error` until the next successful write.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::config::Config;
use crate::error::{StoreError, StoreResult};
use crate::models::{now_millis, Item, ItemDraft, ItemPatch};
use crate::query::{derive_view, SortKey};
use crate::sanitize::{sanitize_value, SanitizePolicy};
use crate::share::ShareIntent;
use crate::storage::{
    FileKeyValueStore, ItemPersistence, KeyValueStore, MemoryKeyValueStore, StorageError,
};
use crate::transfer;

/// Change notification delivered to observers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Created { id: String },
    Updated { id: String },
    Deleted { id: String },
    Replaced { count: usize },
    SelectionChanged { id: Option<String> },
}

/// Handle returned by [`ItemStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&StoreEvent)>;

/// A pending deletion awaiting user confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteIntent {
    pub id: String,
    pub title: String,
}

/// In-memory item list bound to a persistence backend
pub struct ItemStore<S = FileKeyValueStore> {
    items: Vec<Item>,
    persistence: ItemPersistence<S>,
    selected: Option<String>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
    last_storage_error: Option<StorageError>,
}

impl ItemStore<FileKeyValueStore> {
    /// Open the store in the configured data directory
    pub fn open_with_config(config: &Config) -> Self {
        Self::with_backend(FileKeyValueStore::new(&config.data_dir))
    }
}

impl ItemStore<MemoryKeyValueStore> {
    /// Store backed by memory only
    pub fn in_memory() -> Self {
        Self::with_backend(MemoryKeyValueStore::new())
    }
}

impl<S: KeyValueStore> ItemStore<S> {
    /// Load the list from `backend`
    ///
    /// Absent or corrupt data yields an empty store.
    pub fn with_backend(backend: S) -> Self {
        let persistence = ItemPersistence::new(backend);
        let items = persistence.load();
        Self {
            items,
            persistence,
            selected: None,
            observers: Vec::new(),
            next_subscription: 0,
            last_storage_error: None,
        }
    }

    // ==================== Reads ====================

    /// All items in stored order
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Get an item by id
    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Filtered and sorted copy of the list
    pub fn view(&self, query: &str, key: &SortKey) -> Vec<Item> {
        derive_view(&self.items, query, key)
    }

    /// Every tag with the number of items carrying it, by name
    pub fn tags_with_counts(&self) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for tag in self.items.iter().flat_map(|item| item.tags.iter()) {
            *counts.entry(tag.as_str()).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(tag, count)| (tag.to_string(), count))
            .collect()
    }

    /// Resolve a full id or a unique id prefix
    pub fn resolve_id(&self, id_or_prefix: &str) -> StoreResult<String> {
        let needle = id_or_prefix.trim();
        if let Some(item) = self.get(needle) {
            return Ok(item.id.clone());
        }
        if needle.is_empty() {
            return Err(StoreError::NotFound(id_or_prefix.to_string()));
        }

        let matches: Vec<&Item> = self
            .items
            .iter()
            .filter(|item| item.id.starts_with(needle))
            .collect();

        match matches.as_slice() {
            [] => Err(StoreError::NotFound(id_or_prefix.to_string())),
            [item] => Ok(item.id.clone()),
            many => Err(StoreError::Validation(format!(
                "'{}' matches {} items; provide more characters",
                needle,
                many.len()
            ))),
        }
    }

    // ==================== Mutations ====================

    /// Create an item and return its id
    pub fn create(&mut self, draft: &ItemDraft) -> StoreResult<String> {
        draft.validate().map_err(StoreError::Validation)?;

        let item = Item::from_draft(draft, now_millis());
        let id = item.id.clone();
        self.items.insert(0, item);

        self.persist();
        self.notify(StoreEvent::Created { id: id.clone() });
        Ok(id)
    }

    /// Replace the fields named in `patch`
    ///
    /// An unknown id is reported before an invalid patch.
    pub fn update(&mut self, id: &str, patch: &ItemPatch) -> StoreResult<()> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        patch.validate().map_err(StoreError::Validation)?;
        item.apply_patch(patch, now_millis());

        self.persist();
        self.notify(StoreEvent::Updated { id: id.to_string() });
        Ok(())
    }

    /// Remove an item immediately
    pub fn delete(&mut self, id: &str) -> StoreResult<()> {
        let pos = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        self.items.remove(pos);

        self.persist();
        self.notify(StoreEvent::Deleted { id: id.to_string() });
        if self.selected.as_deref() == Some(id) {
            self.set_selection(None);
        }
        Ok(())
    }

    /// Start a deletion that the caller must confirm
    pub fn request_delete(&self, id: &str) -> StoreResult<DeleteIntent> {
        let item = self
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(DeleteIntent {
            id: item.id.clone(),
            title: item.title.clone(),
        })
    }

    /// Apply a confirmed deletion
    pub fn confirm_delete(&mut self, intent: DeleteIntent) -> StoreResult<()> {
        self.delete(&intent.id)
    }

    /// Replace the whole list from untrusted JSON
    ///
    /// `value` must be an array. Records are sanitized per `policy`; the
    /// number of items kept is returned.
    pub fn replace_all(&mut self, value: &Value, policy: SanitizePolicy) -> StoreResult<usize> {
        let items = sanitize_value(value, policy, now_millis())
            .map_err(|e| StoreError::Validation(e.to_string()))?;
        Ok(self.replace_items(items))
    }

    /// Replace the whole list with already sanitized items
    pub fn replace_items(&mut self, items: Vec<Item>) -> usize {
        let count = items.len();
        self.items = items;
        tracing::info!("Replaced item list ({} item(s))", count);

        self.persist();
        self.notify(StoreEvent::Replaced { count });
        let stale = match self.selected {
            Some(ref selected) => self.get(selected).is_none(),
            None => false,
        };
        if stale {
            self.set_selection(None);
        }
        count
    }

    /// Replace the list from the text of an exported file
    pub fn import_json(&mut self, text: &str) -> StoreResult<usize> {
        let value = transfer::parse_import(text)?;
        self.replace_all(&value, SanitizePolicy::Import)
    }

    /// Apply a confirmed share link
    pub fn confirm_share(&mut self, intent: ShareIntent) -> usize {
        self.replace_items(intent.items)
    }

    // ==================== Selection ====================

    /// Select an item
    pub fn select(&mut self, id: &str) -> StoreResult<()> {
        if self.get(id).is_none() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.set_selection(Some(id.to_string()));
        Ok(())
    }

    /// Currently selected item, if any
    pub fn selected(&self) -> Option<&Item> {
        self.selected.as_deref().and_then(|id| self.get(id))
    }

    pub fn clear_selection(&mut self) {
        if self.selected.is_some() {
            self.set_selection(None);
        }
    }

    fn set_selection(&mut self, id: Option<String>) {
        self.selected = id.clone();
        self.notify(StoreEvent::SelectionChanged { id });
    }

    // ==================== Observers ====================

    /// Register a callback invoked after every change
    pub fn subscribe(&mut self, observer: impl FnMut(&StoreEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove a callback; returns false if it was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    fn notify(&mut self, event: StoreEvent) {
        for (_, observer) in self.observers.iter_mut() {
            observer(&event);
        }
    }

    // ==================== Persistence ====================

    /// Whether the last write reached the backend
    pub fn is_synced(&self) -> bool {
        self.last_storage_error.is_none()
    }

    /// The error from the last rejected write, cleared by a successful one
    pub fn last_storage_error(&self) -> Option<&StorageError> {
        self.last_storage_error.as_ref()
    }

    /// Get the persistence binding
    pub fn persistence(&self) -> &ItemPersistence<S> {
        &self.persistence
    }

    /// Get mutable access to the persistence binding
    pub fn persistence_mut(&mut self) -> &mut ItemPersistence<S> {
        &mut self.persistence
    }

    /// Write the full list, keeping any failure instead of returning it
    fn persist(&mut self) {
        match self.persistence.save(&self.items) {
            Ok(()) => self.last_storage_error = None,
            Err(e) => {
                tracing::warn!("Failed to persist items, keeping changes in memory: {}", e);
                self.last_storage_error = Some(e);
            }
        }
    }
}
