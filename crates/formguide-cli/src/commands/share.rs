//! Share link command handlers

use anyhow::{Context, Result};

use formguide_core::share::{ingest, share_url};
use formguide_core::{Config, ItemStore, KeyValueStore, ShareOutcome};

use crate::editor::approve;
use crate::output::Output;

/// Print a link that carries the whole list
pub fn share<S: KeyValueStore>(
    store: &ItemStore<S>,
    config: &Config,
    output: &Output,
) -> Result<()> {
    let link = share_url(&config.share_base_url, store.items())
        .context("Failed to build share link")?;

    if output.is_json() {
        println!("{}", serde_json::json!({"url": link, "count": store.len()}));
    } else {
        println!("{}", link);
    }
    Ok(())
}

/// Replace the list with the one carried by a share link, after confirmation
pub fn receive<S: KeyValueStore>(
    store: &mut ItemStore<S>,
    link: String,
    yes: bool,
    output: &Output,
) -> Result<()> {
    match ingest(&link)? {
        ShareOutcome::NoShare => {
            output.message("This link does not carry a shared list.");
        }
        ShareOutcome::Unusable { error, .. } => {
            output.warn(&format!(
                "The shared list could not be read; nothing was changed ({})",
                error
            ));
        }
        ShareOutcome::Pending(intent) => {
            let prompt = format!(
                "Replace your {} item(s) with {} shared item(s)?",
                store.len(),
                intent.items.len()
            );
            if !approve(&prompt, yes, output.should_prompt())? {
                output.message("Kept your current list. Pass --yes to replace it.");
                return Ok(());
            }

            let count = store.confirm_share(intent);
            output.success(&format!("Loaded {} shared item(s)", count));
        }
    }
    Ok(())
}
