//! Storage layer
//!
//! Handles persistence of the item list.
//!
//! ## Architecture
//!
//! - **KeyValueStore**: durable string values addressed by key
//! - **ItemPersistence**: serializes the full list under one fixed key
//!
//! Every store mutation rewrites the whole list; there is no incremental
//! diff.

pub mod error;
pub mod kv;
pub mod persistence;

pub use error::{StorageError, StorageResult};
pub use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use persistence::{ItemPersistence, STORAGE_KEY};
