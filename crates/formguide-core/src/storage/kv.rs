//! Key-value backends
//!
//! The item list lives under a single key. [`FileKeyValueStore`] keeps one
//! file per key in the data directory and writes atomically (temp file, sync,
//! rename) so a crash never leaves a torn value. [`MemoryKeyValueStore`]
//! backs tests and can be told to reject writes.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::error::{StorageError, StorageResult};

/// Durable string storage addressed by key
pub trait KeyValueStore {
    /// Read the value under `key`, `None` if absent
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Overwrite the value under `key`
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;
}

/// One file per key under a directory
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// Create a store rooted at `dir` (created lazily on first write)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Size in bytes of the value under `key`, 0 if absent
    pub fn size_of(&self, key: &str) -> u64 {
        fs::metadata(self.path_for(key))
            .map(|m| m.len())
            .unwrap_or(0)
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read { path, source }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        atomic_write(&self.path_for(key), value.as_bytes())
    }
}

/// In-memory store, optionally rejecting writes to mimic a full quota
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    values: HashMap<String, String>,
    reject_writes: Option<String>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set` fail with `reason`
    pub fn reject_writes(&mut self, reason: impl Into<String>) {
        self.reject_writes = Some(reason.into());
    }

    /// Accept writes again
    pub fn accept_writes(&mut self) {
        self.reject_writes = None;
    }

    /// Store a raw value, bypassing rejection (for seeding corrupt data)
    pub fn insert_raw(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        if let Some(ref reason) = self.reject_writes {
            return Err(StorageError::Rejected {
                key: key.to_string(),
                reason: reason.clone(),
            });
        }
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StorageError::Directory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let temp_path = path.with_extension("tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.sync_all()
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|source| StorageError::Rename {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileKeyValueStore::new(temp_dir.path());

        assert!(store.get("k").unwrap().is_none());
        store.set("k", "[1,2]").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("[1,2]"));
        assert!(store.path_for("k").exists());
        assert_eq!(store.size_of("k"), 5);

        store.set("k", "[]").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("[]"));
        // temp file is renamed away
        assert!(!store.path_for("k").with_extension("tmp").exists());
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        let mut store = FileKeyValueStore::new(&nested);

        store.set("items", "data").unwrap();

        let content = fs::read_to_string(nested.join("items.json")).unwrap();
        assert_eq!(content, "data");
    }

    #[test]
    fn test_memory_store_rejects_writes() {
        let mut store = MemoryKeyValueStore::new();
        store.set("k", "v").unwrap();

        store.reject_writes("quota exceeded");
        let err = store.set("k", "w").unwrap_err();
        assert!(matches!(err, StorageError::Rejected { .. }));
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));

        store.accept_writes();
        store.set("k", "w").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("w"));
    }
}
