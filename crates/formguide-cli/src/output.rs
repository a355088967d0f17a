//! Output rendering
//!
//! Every command prints through [`Output`], which picks one of three modes
//! from the global flags:
//! - human-readable text (default)
//! - JSON (`--json`), one document per command
//! - quiet (`--quiet`): ids only, no chatter, never prompts

use chrono::{Local, TimeZone};
use serde::Serialize;
use serde_json::json;

use formguide_core::Item;

/// Rendering mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
    Quiet,
}

impl OutputFormat {
    /// `--quiet` wins over `--json`
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        match (json, quiet) {
            (_, true) => OutputFormat::Quiet,
            (true, false) => OutputFormat::Json,
            (false, false) => OutputFormat::Human,
        }
    }
}

/// Column widths for the one-line list view
const TITLE_WIDTH: usize = 40;
const TAGS_WIDTH: usize = 40;

pub struct Output {
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    pub fn is_quiet(&self) -> bool {
        self.format == OutputFormat::Quiet
    }

    /// Confirmation prompts only make sense for a human reader
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Full detail of one item
    pub fn print_item(&self, item: &Item) {
        match self.format {
            OutputFormat::Human => {
                for (label, value) in detail_rows(item) {
                    println!("{:<9} {}", format!("{}:", label), value);
                }
                for (heading, body) in [("Instructions", &item.content), ("Caution", &item.caution)]
                {
                    let body = body.trim();
                    if !body.is_empty() {
                        println!("\n── {} ──\n{}", heading, body);
                    }
                }
            }
            OutputFormat::Json => print_json(item),
            OutputFormat::Quiet => println!("{}", item.id),
        }
    }

    /// One line per item
    pub fn print_items(&self, items: &[Item]) {
        match self.format {
            OutputFormat::Human if items.is_empty() => println!("No items found."),
            OutputFormat::Human => {
                for item in items {
                    println!("{}", list_line(item));
                }
                println!("\n{} item(s)", items.len());
            }
            OutputFormat::Json => print_json(items),
            OutputFormat::Quiet => items.iter().for_each(|item| println!("{}", item.id)),
        }
    }

    /// Tags with how many items carry each
    pub fn print_tags(&self, tags: &[(String, usize)]) {
        match self.format {
            OutputFormat::Human if tags.is_empty() => println!("No tags found."),
            OutputFormat::Human => {
                let width = tags.iter().map(|(name, _)| name.chars().count()).max();
                for (name, count) in tags {
                    println!("#{:<width$}  {}", name, count, width = width.unwrap_or(0));
                }
                println!("\n{} tag(s)", tags.len());
            }
            OutputFormat::Json => {
                let rows: Vec<_> = tags
                    .iter()
                    .map(|(name, count)| json!({"name": name, "count": count}))
                    .collect();
                print_json(&rows);
            }
            OutputFormat::Quiet => tags.iter().for_each(|(name, _)| println!("{}", name)),
        }
    }

    /// Report a completed change
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => println!("{}", json!({"status": "success", "message": message})),
            OutputFormat::Quiet => {}
        }
    }

    /// Informational line with no change behind it
    pub fn message(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", message),
            OutputFormat::Json => println!("{}", json!({"message": message})),
            OutputFormat::Quiet => {}
        }
    }

    /// Degraded result on stderr; silent in quiet mode
    pub fn warn(&self, message: &str) {
        if !self.is_quiet() {
            eprintln!("⚠ {}", message);
        }
    }
}

fn detail_rows(item: &Item) -> Vec<(&'static str, String)> {
    let mut rows = vec![("ID", item.id.clone()), ("Title", item.title.clone())];
    if !item.tags.is_empty() {
        rows.push(("Tags", item.tags.join(", ")));
    }
    if !item.link.trim().is_empty() {
        rows.push(("Link", item.link.trim().to_string()));
    }
    rows.push(("Created", format_millis(item.created_at)));
    rows.push(("Updated", format_millis(item.updated_at)));
    rows
}

/// `id | title [⚠] | #tags`
fn list_line(item: &Item) -> String {
    let marker = if item.caution.trim().is_empty() {
        ""
    } else {
        " ⚠"
    };
    format!(
        "{} | {}{} | {}",
        short_id(&item.id),
        truncate(&item.title, TITLE_WIDTH),
        marker,
        truncate(&item.hashtags(), TAGS_WIDTH)
    )
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

/// First eight characters of an id
pub fn short_id(id: &str) -> &str {
    id.char_indices()
        .nth(8)
        .map_or(id, |(end, _)| &id[..end])
}

/// Epoch millis as local `YYYY-MM-DD HH:MM`
fn format_millis(millis: i64) -> String {
    Local
        .timestamp_millis_opt(millis)
        .single()
        .map_or_else(|| millis.to_string(), |dt| dt.format("%Y-%m-%d %H:%M").to_string())
}

/// Cut to `max` characters, ending in "..." when shortened
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}
