//! JSON export and import files

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::DecodeError;
use crate::models::Item;
use crate::storage::{StorageError, StorageResult};

/// Pretty-printed JSON array of `items`
pub fn export_json(items: &[Item]) -> String {
    serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string())
}

/// Default export file name, stamped with the UTC time
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("formguide-export-{}.json", now.format("%Y%m%dT%H%M%SZ"))
}

/// Write an export file to `path`
pub fn write_export(path: &Path, items: &[Item]) -> StorageResult<()> {
    fs::write(path, export_json(items)).map_err(|e| StorageError::from_io(e, path.to_path_buf()))
}

/// Parse the text of an import file
///
/// Only checks that the text is JSON; the array check and per-record
/// sanitizing happen in `ItemStore::replace_all`.
pub fn parse_import(text: &str) -> Result<Value, DecodeError> {
    // exported files may carry a byte order mark when edited on Windows
    let text = text.trim_start_matches('\u{feff}');
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn item(id: &str, title: &str) -> Item {
        Item {
            id: id.to_string(),
            title: title.to_string(),
            content: String::new(),
            caution: "Warm up first".to_string(),
            link: String::new(),
            tags: vec!["legs".to_string()],
            created_at: 1,
            updated_at: 1,
        }
    }

    #[test]
    fn test_export_is_pretty_array() {
        let json = export_json(&[item("a", "Squat")]);
        assert!(json.starts_with("[\n"));
        assert!(json.contains("\"createdAt\": 1"));
        assert!(json.contains("\"caution\": \"Warm up first\""));
    }

    #[test]
    fn test_export_file_name() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        assert_eq!(
            export_file_name(now),
            "formguide-export-20240305T140709Z.json"
        );
    }

    #[test]
    fn test_write_export() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.json");
        let items = vec![item("a", "Squat"), item("b", "Lunge")];

        write_export(&path, &items).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let parsed: Vec<Item> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, items);
    }

    #[test]
    fn test_parse_import() {
        assert!(parse_import("[]").unwrap().is_array());
        assert!(parse_import("\u{feff}[]").unwrap().is_array());
        assert!(parse_import("{\"a\": 1}").unwrap().is_object());
        assert!(matches!(
            parse_import("nope").unwrap_err(),
            DecodeError::Json(_)
        ));
    }
}
