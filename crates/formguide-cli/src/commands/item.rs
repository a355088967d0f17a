//! Item command handlers

use anyhow::{bail, Context, Result};

use formguide_core::clipboard::format_for_clipboard;
use formguide_core::{
    Item, ItemDraft, ItemPatch, ItemStore, KeyValueStore, SortKey, MAX_TITLE_CHARS,
};

use crate::clipboard::copy_to_clipboard;
use crate::editor::{approve, edit_instructions, prompt_with_default};
use crate::output::{short_id, Output};

/// Field values given on the command line for add/edit
#[derive(Debug, Default)]
pub struct FieldArgs {
    pub title: Option<String>,
    pub content: Option<String>,
    pub caution: Option<String>,
    pub link: Option<String>,
    pub tags: Option<String>,
}

impl FieldArgs {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.caution.is_none()
            && self.link.is_none()
            && self.tags.is_none()
    }
}

/// Create a new item
pub fn add<S: KeyValueStore>(
    store: &mut ItemStore<S>,
    fields: FieldArgs,
    use_editor: bool,
    output: &Output,
) -> Result<()> {
    let title = fields.title.unwrap_or_default();
    check_title_length(&title)?;

    let content = match fields.content {
        Some(content) => content,
        None if use_editor => edit_instructions(&title, "")?,
        None => String::new(),
    };

    let draft = ItemDraft {
        title,
        content,
        caution: fields.caution.unwrap_or_default(),
        link: fields.link.unwrap_or_default(),
        tags: fields.tags.unwrap_or_default(),
    };

    let id = store.create(&draft).context("Failed to add item")?;

    output.success(&format!("Added item: {}", short_id(&id)));
    if let Some(item) = store.get(&id) {
        output.print_item(item);
    }
    Ok(())
}

/// List items, filtered and sorted
pub fn list<S: KeyValueStore>(
    store: &ItemStore<S>,
    query: Option<String>,
    sort: SortKey,
    tag: Option<String>,
    output: &Output,
) -> Result<()> {
    let mut items = store.view(query.as_deref().unwrap_or(""), &sort);
    if let Some(ref tag) = tag {
        items.retain(|item| item.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)));
    }

    output.print_items(&items);
    Ok(())
}

/// Show a single item
pub fn show<S: KeyValueStore>(
    store: &mut ItemStore<S>,
    id: String,
    output: &Output,
) -> Result<()> {
    let id = store.resolve_id(&id)?;
    store.select(&id)?;

    if let Some(item) = store.selected() {
        output.print_item(item);
    }
    Ok(())
}

/// Edit an item from flags, the editor, or interactive prompts
pub fn edit<S: KeyValueStore>(
    store: &mut ItemStore<S>,
    id: String,
    fields: FieldArgs,
    use_editor: bool,
    output: &Output,
) -> Result<()> {
    let id = store.resolve_id(&id)?;
    let item = store
        .get(&id)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Item not found: {}", id))?;

    let mut patch = if fields.is_empty() && !use_editor {
        prompt_patch(&item)?
    } else {
        ItemPatch {
            title: fields.title,
            content: fields.content,
            caution: fields.caution,
            link: fields.link,
            tags: fields.tags,
        }
    };

    if use_editor && patch.content.is_none() {
        patch.content = Some(edit_instructions(&item.title, &item.content)?);
    }

    if patch.is_empty() {
        output.message("Nothing changed.");
        return Ok(());
    }
    if let Some(ref title) = patch.title {
        check_title_length(title)?;
    }

    store.update(&id, &patch).context("Failed to update item")?;

    output.success("Item updated");
    if let Some(item) = store.get(&id) {
        output.print_item(item);
    }
    Ok(())
}

/// Delete an item after confirmation
pub fn delete<S: KeyValueStore>(
    store: &mut ItemStore<S>,
    id: String,
    yes: bool,
    output: &Output,
) -> Result<()> {
    let id = store.resolve_id(&id)?;
    let intent = store.request_delete(&id)?;

    let prompt = format!("Delete '{}' ({})?", intent.title, short_id(&intent.id));
    if !approve(&prompt, yes, output.should_prompt())? {
        output.message("Cancelled. Pass --yes to delete without a prompt.");
        return Ok(());
    }

    store
        .confirm_delete(intent)
        .context("Failed to delete item")?;

    output.success(&format!("Deleted item: {}", id));
    Ok(())
}

/// Copy an item's text to the clipboard
pub fn copy<S: KeyValueStore>(store: &ItemStore<S>, id: String, output: &Output) -> Result<()> {
    let id = store.resolve_id(&id)?;
    let item = store
        .get(&id)
        .ok_or_else(|| anyhow::anyhow!("Item not found: {}", id))?;
    let text = format_for_clipboard(item);

    match copy_to_clipboard(&text) {
        Ok(()) => output.success(&format!("Copied '{}' to the clipboard", item.title)),
        Err(e) => {
            output.warn(&format!(
                "Could not reach the clipboard ({}). Copy the text below instead:",
                e
            ));
            println!("{}", text);
        }
    }
    Ok(())
}

/// Open an item's reference link in the browser
pub fn open_link<S: KeyValueStore>(
    store: &ItemStore<S>,
    id: String,
    output: &Output,
) -> Result<()> {
    let id = store.resolve_id(&id)?;
    let item = store
        .get(&id)
        .ok_or_else(|| anyhow::anyhow!("Item not found: {}", id))?;

    let link = item.link.trim();
    if link.is_empty() {
        bail!("'{}' has no link", item.title);
    }

    open::that(link).with_context(|| format!("Failed to open {}", link))?;
    output.success(&format!("Opened {}", link));
    Ok(())
}

/// List all tags with usage counts
pub fn tags<S: KeyValueStore>(store: &ItemStore<S>, output: &Output) -> Result<()> {
    output.print_tags(&store.tags_with_counts());
    Ok(())
}

fn check_title_length(title: &str) -> Result<()> {
    let len = title.trim().chars().count();
    if len > MAX_TITLE_CHARS {
        bail!(
            "Title is {} characters long; keep it to {} or fewer",
            len,
            MAX_TITLE_CHARS
        );
    }
    Ok(())
}

/// Ask for each field, keeping the current value on empty input
fn prompt_patch(item: &Item) -> Result<ItemPatch> {
    println!("Editing item: {}", item.id);
    println!("Press Enter to keep current value, or type new value.\n");

    Ok(ItemPatch {
        title: prompt_with_default("Title", &item.title)?,
        content: prompt_with_default("Instructions", &item.content)?,
        caution: prompt_with_default("Caution", &item.caution)?,
        link: prompt_with_default("Link", &item.link)?,
        tags: prompt_with_default("Tags (comma-separated)", &item.tags.join(", "))?,
    })
}
