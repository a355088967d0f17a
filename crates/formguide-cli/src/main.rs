//! formguide CLI
//!
//! Command-line interface for formguide - a local list of exercise guides.

use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use formguide_core::{Config, ItemStore, SortKey, StorageError, StoreError};

mod clipboard;
mod commands;
mod editor;
mod output;

use commands::item::FieldArgs;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "formguide")]
#[command(about = "formguide - Local-first exercise guides")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new item
    #[command(alias = "create")]
    Add {
        /// Item title
        title: String,
        #[command(flatten)]
        fields: FieldFlags,
        /// Write the instructions in $EDITOR
        #[arg(short, long)]
        editor: bool,
    },
    /// List items (default command)
    #[command(alias = "ls")]
    List {
        /// Only show items whose text contains this query
        query: Option<String>,
        /// Sort by title, updatedAt or createdAt
        #[arg(short, long)]
        sort: Option<String>,
        /// Only show items with this tag
        #[arg(short, long)]
        tag: Option<String>,
    },
    /// Show item details
    Show {
        /// Item ID (full UUID or prefix)
        id: String,
    },
    /// Edit an item (prompts for each field when no flags are given)
    Edit {
        /// Item ID (full UUID or prefix)
        id: String,
        /// New title
        #[arg(short = 'T', long)]
        title: Option<String>,
        #[command(flatten)]
        fields: FieldFlags,
        /// Edit the instructions in $EDITOR
        #[arg(short, long)]
        editor: bool,
    },
    /// Delete an item
    #[command(alias = "rm")]
    Delete {
        /// Item ID (full UUID or prefix)
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Copy an item to the clipboard
    Copy {
        /// Item ID (full UUID or prefix)
        id: String,
    },
    /// Open an item's link in the browser
    OpenLink {
        /// Item ID (full UUID or prefix)
        id: String,
    },
    /// List all tags
    Tags,
    /// Export all items to a JSON file
    Export {
        /// Output file (defaults to a timestamped name in the current directory)
        path: Option<PathBuf>,
        /// Print the JSON instead of writing a file
        #[arg(long, conflicts_with = "path")]
        stdout: bool,
    },
    /// Replace all items with an exported JSON file
    Import {
        /// File produced by `formguide export`
        file: PathBuf,
    },
    /// Print a link that carries the whole list
    Share,
    /// Load the list carried by a share link
    Receive {
        /// Share link
        url: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show storage status
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(clap::Args)]
struct FieldFlags {
    /// Instructions
    #[arg(short, long)]
    content: Option<String>,
    /// Caution notes
    #[arg(short = 'C', long)]
    caution: Option<String>,
    /// Reference link
    #[arg(short, long)]
    link: Option<String>,
    /// Comma-separated tags
    #[arg(short, long)]
    tags: Option<String>,
}

impl FieldFlags {
    fn into_args(self, title: Option<String>) -> FieldArgs {
        FieldArgs {
            title,
            content: self.content,
            caution: self.caution,
            link: self.link,
            tags: self.tags,
        }
    }
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, default_sort, share_base_url, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Config commands work without opening the store
    if let Some(Commands::Config { command }) = &cli.command {
        return handle_config_command(command.clone(), config_path, &output);
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    init_logging(&config);

    let mut store = ItemStore::open_with_config(&config);
    info!("Opened {} item(s) from {:?}", store.len(), config.data_dir);

    let result = match cli.command {
        None => commands::item::list(&store, None, config.default_sort.clone(), None, &output),
        Some(Commands::Add {
            title,
            fields,
            editor,
        }) => commands::item::add(&mut store, fields.into_args(Some(title)), editor, &output),
        Some(Commands::List { query, sort, tag }) => {
            let sort = sort
                .map(SortKey::from)
                .unwrap_or_else(|| config.default_sort.clone());
            commands::item::list(&store, query, sort, tag, &output)
        }
        Some(Commands::Show { id }) => commands::item::show(&mut store, id, &output),
        Some(Commands::Edit {
            id,
            title,
            fields,
            editor,
        }) => commands::item::edit(&mut store, id, fields.into_args(title), editor, &output),
        Some(Commands::Delete { id, yes }) => commands::item::delete(&mut store, id, yes, &output),
        Some(Commands::Copy { id }) => commands::item::copy(&store, id, &output),
        Some(Commands::OpenLink { id }) => commands::item::open_link(&store, id, &output),
        Some(Commands::Tags) => commands::item::tags(&store, &output),
        Some(Commands::Export { path, stdout }) => {
            commands::transfer::export(&store, path, stdout, &output)
        }
        Some(Commands::Import { file }) => commands::transfer::import(&mut store, file, &output),
        Some(Commands::Share) => commands::share::share(&store, &config, &output),
        Some(Commands::Receive { url, yes }) => {
            commands::share::receive(&mut store, url, yes, &output)
        }
        Some(Commands::Status) => commands::status::show(&store, &config, &output),
        Some(Commands::Config { .. }) => unreachable!(), // Handled above
    };

    // The in-memory change stands even when the write failed
    if let Some(err) = store.last_storage_error() {
        for line in storage_warnings(err) {
            output.warn(&line);
        }
    }

    if let Err(e) = &result {
        if let Some(err) = user_error(e) {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    }
    result
}

/// Bad input or an unknown id: reported without the context chain
fn user_error(error: &anyhow::Error) -> Option<&StoreError> {
    error
        .downcast_ref::<StoreError>()
        .filter(|err| err.is_user_error())
}

fn storage_warnings(err: &StorageError) -> Vec<String> {
    let mut lines = vec![format!("Changes were not saved: {}", err)];
    lines.extend(err.recovery_suggestion().map(String::from));
    if err.is_recoverable() {
        lines.push("Then run the command again.".to_string());
    } else {
        lines.push("Set FORMGUIDE_LOG=debug and retry for details.".to_string());
    }
    lines
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Initialize file logging when FORMGUIDE_LOG is set
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("FORMGUIDE_LOG") else {
        return;
    };

    let log_path = config.log_path();

    let log_file = match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!(
        "formguide_core={},formguide_cli={}",
        log_level, log_level
    ));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("Logging initialized to {:?}", log_path);
}
