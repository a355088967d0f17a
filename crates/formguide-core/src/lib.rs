//! formguide Core Library
//!
//! This crate provides the core functionality for formguide, a local-first
//! list of exercise guides (title, instructions, cautions, a reference link
//! and tags).
//!
//! # Architecture
//!
//! - **ItemStore**: in-memory source of truth, rewritten to storage after
//!   every mutation
//! - **Storage**: one JSON array under a fixed key in a key-value backend
//!
//! All queries are served directly from the in-memory list.
//!
//! # Quick Start
//!
//! ```text
//! let mut store = ItemStore::open_with_config(&Config::load()?);
//!
//! // Add an item
//! let id = store.create(&ItemDraft::new("Neck Tilt").tags("neck"))?;
//!
//! // Query items
//! let view = store.view("neck", &SortKey::UpdatedAt);
//!
//! // Share the whole list
//! let link = share::share_url("formguide://share", store.items())?;
//! ```
//!
//! # Modules
//!
//! - `store`: item store (main entry point)
//! - `models`: the item and its create/edit inputs
//! - `query`: filtering and sorting
//! - `codec`: share token encoding
//! - `share`: share links
//! - `sanitize`: lenient parsing of untrusted records
//! - `storage`: persistence
//! - `transfer`: export and import files
//! - `clipboard`: text rendering of one item
//! - `config`: application configuration

pub mod clipboard;
pub mod codec;
pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod sanitize;
pub mod share;
pub mod storage;
pub mod store;
pub mod transfer;

pub use config::Config;
pub use error::{DecodeError, StoreError, StoreResult};
pub use models::{Item, ItemDraft, ItemPatch, MAX_TITLE_CHARS};
pub use query::SortKey;
pub use sanitize::SanitizePolicy;
pub use share::{ShareError, ShareIntent, ShareOutcome};
pub use storage::{FileKeyValueStore, ItemPersistence, KeyValueStore, StorageError};
pub use store::{DeleteIntent, ItemStore, StoreEvent, SubscriptionId};
