//! Export and import command handlers

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;

use formguide_core::transfer::{export_file_name, export_json, write_export};
use formguide_core::{ItemStore, KeyValueStore, StoreError};

use crate::output::Output;

/// Write all items to a JSON file (or stdout)
pub fn export<S: KeyValueStore>(
    store: &ItemStore<S>,
    path: Option<PathBuf>,
    stdout: bool,
    output: &Output,
) -> Result<()> {
    if stdout {
        println!("{}", export_json(store.items()));
        return Ok(());
    }

    let path = path.unwrap_or_else(|| PathBuf::from(export_file_name(Utc::now())));
    write_export(&path, store.items())
        .with_context(|| format!("Failed to write export to {}", path.display()))?;

    output.success(&format!(
        "Exported {} item(s) to {}",
        store.len(),
        path.display()
    ));
    Ok(())
}

/// Replace all items with the contents of an exported file
pub fn import<S: KeyValueStore>(
    store: &mut ItemStore<S>,
    file: PathBuf,
    output: &Output,
) -> Result<()> {
    let text = fs::read_to_string(&file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let count = match store.import_json(&text) {
        Ok(count) => count,
        Err(StoreError::Validation(reason)) => {
            anyhow::bail!(
                "{} is not a formguide export ({}). Expected a JSON array of items.",
                file.display(),
                reason
            );
        }
        Err(e) => {
            return Err(anyhow::Error::new(e).context(format!("Failed to import {}", file.display())));
        }
    };

    output.success(&format!("Imported {} item(s)", count));
    Ok(())
}
