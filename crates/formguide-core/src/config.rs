//! Application configuration
//!
//! Sources, lowest to highest precedence:
//! 1. Built-in defaults
//! 2. TOML file (`~/.config/formguide/config.toml`, `FORMGUIDE_CONFIG`, or
//!    an explicit path from the command line)
//! 3. `FORMGUIDE_*` environment variables
//!
//! ```toml
//! data_dir = "/home/me/.local/share/formguide"
//! default_sort = "title"
//! share_base_url = "https://guides.example/app"
//! log_file = "/tmp/formguide.log"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::query::SortKey;
use crate::storage::STORAGE_KEY;

const ENV_PREFIX: &str = "FORMGUIDE";

/// Base URL share links are built on when none is configured
pub const DEFAULT_SHARE_BASE_URL: &str = "formguide://share";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Where the item list is stored
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Sort order used by `list` when none is given
    #[serde(default)]
    pub default_sort: SortKey,

    /// URL that share links are appended to
    #[serde(default = "default_share_base_url")]
    pub share_base_url: String,

    /// Debug log destination; `<data_dir>/debug.log` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            default_sort: SortKey::default(),
            share_base_url: default_share_base_url(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load from the default config file plus environment overrides
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load from `path` when given, otherwise from the default location
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load from `path`, falling back to defaults when the file is missing
    ///
    /// Environment overrides are applied and the data directory is created.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = Self::read_file(path)?;
        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Read `path` as written, without environment overrides
    ///
    /// This is the base to edit and save back, so that a `FORMGUIDE_*`
    /// variable set for one run never lands in the file.
    pub fn read_file(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content)
                .with_context(|| format!("Invalid config file: {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => {
                Err(e).with_context(|| format!("Cannot read config file: {}", path.display()))
            }
        }
    }

    fn parse(toml_content: &str) -> Result<Self> {
        toml::from_str(toml_content).context("Failed to parse config TOML")
    }

    fn apply_env_overrides(&mut self) {
        if let Some(dir) = env_override("DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }

        if let Some(sort) = env_override("DEFAULT_SORT") {
            if !sort.trim().is_empty() {
                self.default_sort = SortKey::from(sort);
            }
        }

        // an empty value resets to the built-in default
        if let Some(base) = env_override("SHARE_BASE_URL") {
            self.share_base_url = if base.is_empty() {
                default_share_base_url()
            } else {
                base
            };
        }

        if let Some(file) = env_override("LOG_FILE") {
            self.log_file = (!file.is_empty()).then(|| PathBuf::from(file));
        }
    }

    /// Create the data directory if it does not exist yet
    pub fn ensure_data_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir).with_context(|| {
            format!(
                "Failed to create data directory: {}",
                self.data_dir.display()
            )
        })
    }

    /// Write to `config_path`, creating parent directories
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))
    }

    /// Default config file, or `FORMGUIDE_CONFIG` when set
    pub fn config_file_path() -> PathBuf {
        if let Some(path) = env_override("CONFIG").filter(|p| !p.is_empty()) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("formguide")
            .join("config.toml")
    }

    /// File holding the persisted item list
    pub fn items_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.json", STORAGE_KEY))
    }

    /// Where debug logs go
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("debug.log"))
    }
}

/// Value of `FORMGUIDE_<name>`, if set
fn env_override(name: &str) -> Option<String> {
    std::env::var(format!("{}_{}", ENV_PREFIX, name)).ok()
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("formguide")
}

fn default_share_base_url() -> String {
    DEFAULT_SHARE_BASE_URL.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;
    use tempfile::TempDir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ENV_VARS: &[&str] = &[
        "FORMGUIDE_DATA_DIR",
        "FORMGUIDE_DEFAULT_SORT",
        "FORMGUIDE_SHARE_BASE_URL",
        "FORMGUIDE_LOG_FILE",
        "FORMGUIDE_CONFIG",
    ];

    /// Run `f` with the given FORMGUIDE_* variables set and all others cleared
    ///
    /// Holds a lock so env-touching tests never interleave; previous values are
    /// restored afterwards.
    fn with_env<T>(vars: &[(&str, &str)], f: impl FnOnce() -> T) -> T {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let saved: Vec<_> = ENV_VARS
            .iter()
            .map(|&name| (name, env::var(name).ok()))
            .collect();

        for name in ENV_VARS {
            env::remove_var(name);
        }
        for (name, value) in vars {
            env::set_var(name, value);
        }

        let result = f();

        for (name, value) in saved {
            match value {
                Some(v) => env::set_var(name, v),
                None => env::remove_var(name),
            }
        }
        result
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.default_sort, SortKey::UpdatedAt);
        assert_eq!(config.share_base_url, DEFAULT_SHARE_BASE_URL);
        assert!(config.log_file.is_none());
        assert!(config.data_dir.ends_with("formguide"));
    }

    #[test]
    fn test_file_paths() {
        let config = Config {
            data_dir: PathBuf::from("/data/formguide"),
            ..Config::default()
        };

        assert_eq!(
            config.items_path(),
            PathBuf::from("/data/formguide/exercise-guides.json")
        );
        assert_eq!(config.log_path(), PathBuf::from("/data/formguide/debug.log"));
    }

    #[test]
    fn test_env_override_data_dir() {
        let config = with_env(&[("FORMGUIDE_DATA_DIR", "/tmp/formguide-test")], || {
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        });

        assert_eq!(config.data_dir, PathBuf::from("/tmp/formguide-test"));
    }

    #[test]
    fn test_env_override_default_sort() {
        let sort = with_env(&[("FORMGUIDE_DEFAULT_SORT", "title")], || {
            let mut config = Config::default();
            config.apply_env_overrides();
            config.default_sort
        });
        assert_eq!(sort, SortKey::Title);

        let sort = with_env(&[("FORMGUIDE_DEFAULT_SORT", " ")], || {
            let mut config = Config::default();
            config.apply_env_overrides();
            config.default_sort
        });
        assert_eq!(sort, SortKey::UpdatedAt);
    }

    #[test]
    fn test_env_override_share_base_url_and_log_file() {
        let config = with_env(
            &[
                ("FORMGUIDE_SHARE_BASE_URL", "https://guides.example/"),
                ("FORMGUIDE_LOG_FILE", "/tmp/fg.log"),
            ],
            || {
                let mut config = Config::default();
                config.apply_env_overrides();
                config
            },
        );
        assert_eq!(config.share_base_url, "https://guides.example/");
        assert_eq!(config.log_path(), PathBuf::from("/tmp/fg.log"));

        let config = with_env(
            &[("FORMGUIDE_SHARE_BASE_URL", ""), ("FORMGUIDE_LOG_FILE", "")],
            || {
                let mut config = config.clone();
                config.apply_env_overrides();
                config
            },
        );
        assert_eq!(config.share_base_url, DEFAULT_SHARE_BASE_URL);
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_config_file_path_override() {
        let path = with_env(&[("FORMGUIDE_CONFIG", "/etc/fg.toml")], Config::config_file_path);
        assert_eq!(path, PathBuf::from("/etc/fg.toml"));

        let path = with_env(&[], Config::config_file_path);
        assert!(path.ends_with("formguide/config.toml"));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = Config {
            data_dir: PathBuf::from("/data/formguide"),
            default_sort: SortKey::CreatedAt,
            share_base_url: "https://guides.example/".to_string(),
            log_file: None,
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("default_sort = \"createdAt\""));
        assert!(!toml_str.contains("log_file"));

        let parsed = Config::parse(&toml_str).unwrap();
        assert_eq!(parsed.data_dir, config.data_dir);
        assert_eq!(parsed.default_sort, config.default_sort);
        assert_eq!(parsed.share_base_url, config.share_base_url);
    }

    #[test]
    fn test_parse_fills_defaults() {
        let config = Config::parse(
            r#"
            data_dir = "/custom/data"
            default_sort = "title"
            "#,
        )
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert_eq!(config.default_sort, SortKey::Title);
        assert_eq!(config.share_base_url, DEFAULT_SHARE_BASE_URL);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Config::parse("data_dir = [").is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("data");
        let data_dir_str = data_dir.to_string_lossy().to_string();

        let config = with_env(&[("FORMGUIDE_DATA_DIR", data_dir_str.as_str())], || {
            Config::load_from_path(Path::new("/nonexistent/config.toml")).unwrap()
        });

        assert_eq!(config.default_sort, SortKey::UpdatedAt);
        assert_eq!(config.data_dir, data_dir);
        assert!(data_dir.exists());
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = Config {
            data_dir: temp_dir.path().join("data"),
            default_sort: SortKey::Title,
            ..Config::default()
        };
        config.save_to_path(&path).unwrap();

        let loaded = with_env(&[], || Config::load_from_path(&path).unwrap());
        assert_eq!(loaded.default_sort, SortKey::Title);
        assert_eq!(loaded.data_dir, config.data_dir);
    }

    #[test]
    fn test_read_file_ignores_env_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let config = Config {
            data_dir: temp_dir.path().join("data"),
            share_base_url: "https://guides.example/file".to_string(),
            ..Config::default()
        };
        config.save_to_path(&path).unwrap();

        let vars = [
            ("FORMGUIDE_SHARE_BASE_URL", "https://guides.example/env"),
            ("FORMGUIDE_DEFAULT_SORT", "title"),
        ];
        let (raw, effective) = with_env(&vars, || {
            (
                Config::read_file(&path).unwrap(),
                Config::load_from_path(&path).unwrap(),
            )
        });

        assert_eq!(raw.share_base_url, "https://guides.example/file");
        assert_eq!(raw.default_sort, SortKey::UpdatedAt);
        assert_eq!(effective.share_base_url, "https://guides.example/env");
        assert_eq!(effective.default_sort, SortKey::Title);
    }
}
