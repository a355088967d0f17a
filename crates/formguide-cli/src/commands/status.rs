//! Status command handler

use anyhow::Result;

use formguide_core::storage::STORAGE_KEY;
use formguide_core::{Config, FileKeyValueStore, ItemStore};

use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show(
    store: &ItemStore<FileKeyValueStore>,
    config: &Config,
    output: &Output,
) -> Result<()> {
    let size = store.persistence().backend().size_of(STORAGE_KEY);
    let tag_count = store.tags_with_counts().len();
    let items_path = config.items_path();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "items_path": items_path,
                    "synced": store.is_synced(),
                    "storage": {
                        "exists": items_path.exists(),
                        "size": size
                    },
                    "counts": {
                        "items": store.len(),
                        "tags": tag_count
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", store.len());
        }
        OutputFormat::Human => {
            println!("formguide Status");
            println!("================");
            println!();
            println!("Storage:");
            println!("  Location: {}", config.data_dir.display());
            println!("  File:     {}", items_path.display());
            println!("  Size:     {}", format_size(size));
            println!(
                "  State:    {}",
                if store.is_synced() {
                    "saved"
                } else {
                    "unsaved changes"
                }
            );
            println!();
            println!("Contents:");
            println!("  Items: {}", store.len());
            println!("  Tags:  {}", tag_count);
        }
    }

    Ok(())
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
