//! CLI subcommands.

pub mod client;
pub mod config;
pub mod invoice;
pub mod settings;

use std::path::{Path, PathBuf};

use tracing::debug;

use papertrail_core::models::config::PapertrailConfig;
use papertrail_core::{ColorTheme, FileStore, Repository};

/// Locations shared by all commands.
pub struct Context {
    config_path: Option<PathBuf>,
    store_path: Option<PathBuf>,
}

impl Context {
    pub fn new(config_path: Option<PathBuf>, store_path: Option<PathBuf>) -> Self {
        Self {
            config_path,
            store_path,
        }
    }

    /// Config file in use: `--config`, or the platform default.
    pub fn config_path(&self) -> PathBuf {
        self.config_path.clone().unwrap_or_else(default_config_path)
    }

    /// Configuration from the config file, or defaults when there is none.
    pub fn load_config(&self) -> anyhow::Result<PapertrailConfig> {
        let path = self.config_path();
        if path.exists() {
            Ok(PapertrailConfig::from_file(&path)?)
        } else {
            Ok(PapertrailConfig::default())
        }
    }

    /// Store file in use: `--store`, or the configured location.
    pub fn store_path(&self) -> anyhow::Result<PathBuf> {
        if let Some(path) = &self.store_path {
            return Ok(path.clone());
        }
        Ok(self.load_config()?.store_path(&default_data_dir()))
    }

    pub fn open_repository(&self) -> anyhow::Result<Repository<FileStore>> {
        let path = self.store_path()?;
        debug!("Using store {}", path.display());
        Ok(Repository::new(FileStore::open(path)?))
    }
}

/// Look up a color theme preset by name.
pub fn parse_theme(name: &str) -> anyhow::Result<ColorTheme> {
    ColorTheme::from_name(name).ok_or_else(|| {
        let names: Vec<&str> = ColorTheme::ALL.iter().map(|t| t.name()).collect();
        anyhow::anyhow!("Unknown theme: {} (available: {})", name, names.join(", "))
    })
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("papertrail")
        .join("config.json")
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("papertrail")
}

/// Look up a dotted key (e.g. `branding.primaryColor`) in a JSON document.
pub fn json_get<'a>(json: &'a serde_json::Value, key: &str) -> anyhow::Result<&'a serde_json::Value> {
    let mut current = json;
    for part in key.split('.') {
        current = current
            .get(part)
            .ok_or_else(|| anyhow::anyhow!("Key not found: {}", key))?;
    }
    Ok(current)
}

/// Set a dotted key in a JSON document. Parent objects must exist.
pub fn json_set(json: &mut serde_json::Value, key: &str, value: serde_json::Value) -> anyhow::Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    let mut current = json;

    for (i, part) in parts.iter().enumerate() {
        if i == parts.len() - 1 {
            // Last part - set the value
            match current.as_object_mut() {
                Some(obj) => {
                    obj.insert((*part).to_string(), value);
                    return Ok(());
                }
                None => anyhow::bail!("Cannot set value at non-object path"),
            }
        }

        // Navigate deeper
        current = current
            .get_mut(*part)
            .ok_or_else(|| anyhow::anyhow!("Path not found: {}", key))?;
    }

    Ok(())
}

/// Parse a command-line value for the dotted `key` of `json`.
///
/// String fields take the raw text as-is, so `2024` stays a string. Other
/// fields parse the text as JSON, falling back to a plain string.
pub fn parse_value(json: &serde_json::Value, key: &str, value: &str) -> serde_json::Value {
    match json_get(json, key) {
        Ok(serde_json::Value::String(_)) => serde_json::Value::String(value.to_string()),
        _ => serde_json::from_str(value)
            .unwrap_or_else(|_| serde_json::Value::String(value.to_string())),
    }
}

/// Create the parent directory of `path` if needed.
pub fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}
