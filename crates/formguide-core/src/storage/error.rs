//! Storage failures
//!
//! The item store never propagates these: it logs them, keeps the in-memory
//! list and reports the last one through `ItemStore::last_storage_error`.
//! File-level I/O errors are classified so the shell can tell the user what
//! to do next.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A read or write against the key-value backend failed
#[derive(Error, Debug)]
pub enum StorageError {
    /// The data directory could not be created
    #[error("Cannot create data directory '{path}': {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Permission denied for '{path}'")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// No room left on the device or in the user's quota
    #[error("Out of space while writing '{path}'")]
    QuotaExceeded {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The temp file was written but could not replace the target
    #[error("Cannot move '{from}' into place at '{to}': {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The backend refused the value
    #[error("Write to key '{key}' was rejected: {reason}")]
    Rejected { key: String, reason: String },

    #[error("Cannot serialize items: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StorageError {
    /// Classify a failed write to `path`
    pub fn from_io(error: io::Error, path: PathBuf) -> Self {
        if error.kind() == io::ErrorKind::PermissionDenied {
            StorageError::PermissionDenied {
                path,
                source: error,
            }
        } else if is_out_of_space(&error) {
            StorageError::QuotaExceeded {
                path,
                source: error,
            }
        } else {
            StorageError::Write {
                path,
                source: error,
            }
        }
    }

    /// True when a retry can succeed once the user frees space or fixes access
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StorageError::QuotaExceeded { .. }
                | StorageError::PermissionDenied { .. }
                | StorageError::Rejected { .. }
        )
    }

    /// What the user can do about it, if anything
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StorageError::QuotaExceeded { .. } | StorageError::Rejected { .. } => {
                Some("Free up space, then run `formguide export` so nothing is lost.")
            }
            StorageError::PermissionDenied { .. } => Some(
                "Check permissions on the data directory, or move it with `formguide config set data_dir <path>`.",
            ),
            StorageError::Directory { .. } => {
                Some("Make sure the parent of data_dir exists and is writable.")
            }
            _ => None,
        }
    }
}

fn is_out_of_space(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    ["no space left", "disk full", "quota exceeded", "not enough space"]
        .iter()
        .any(|needle| msg.contains(needle))
}

pub type StorageResult<T> = Result<T, StorageError>;
