//! Configuration for hosts that keep the store on disk.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PapertrailError, Result};
use crate::session::DEFAULT_AUTOSAVE_DELAY_MS;

/// Main configuration for papertrail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PapertrailConfig {
    /// Store location.
    pub storage: StorageConfig,

    /// Auto-save behavior of editing sessions.
    pub autosave: AutosaveConfig,

    /// Output preferences.
    pub output: OutputConfig,
}

/// Where the key-value store file lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory of the store file. Hosts pick a platform data directory when unset.
    pub data_dir: Option<PathBuf>,

    /// Store file name.
    pub file_name: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            file_name: "papertrail.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutosaveConfig {
    /// Quiet period after the last edit before an invoice is saved.
    pub delay_ms: i64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_AUTOSAVE_DELAY_MS,
        }
    }
}

impl AutosaveConfig {
    pub fn delay(&self) -> TimeDelta {
        TimeDelta::milliseconds(self.delay_ms.max(0))
    }
}

/// How amounts and listings are printed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Currency used for cross-invoice sums such as the outstanding total.
    pub summary_currency: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            summary_currency: "USD".to_string(),
        }
    }
}

impl PapertrailConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| PapertrailError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Full path of the store file, resolving an unset data directory to `fallback_dir`.
    pub fn store_path(&self, fallback_dir: &Path) -> PathBuf {
        self.storage
            .data_dir
            .as_deref()
            .unwrap_or(fallback_dir)
            .join(&self.storage.file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"storage": {"data_dir": "/srv/papertrail"}}"#).unwrap();

        let config = PapertrailConfig::from_file(&path).unwrap();

        assert_eq!(config.storage.file_name, "papertrail.json");
        assert_eq!(config.output.summary_currency, "USD");
        assert_eq!(config.autosave.delay(), TimeDelta::seconds(5));
        assert_eq!(
            config.store_path(Path::new("/fallback")),
            PathBuf::from("/srv/papertrail/papertrail.json")
        );
    }

    #[test]
    fn test_invalid_file_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"autosave": {"delay_ms": "soon"}}"#).unwrap();

        let err = PapertrailConfig::from_file(&path).unwrap_err();

        assert!(matches!(err, PapertrailError::Config(_)));
        assert!(err.to_string().contains("config.json"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let mut config = PapertrailConfig::default();
        config.output.summary_currency = "EUR".to_string();
        config.autosave.delay_ms = 1_500;

        config.save(&path).unwrap();

        assert_eq!(PapertrailConfig::from_file(&path).unwrap(), config);
        assert_eq!(
            config.store_path(Path::new("/data")),
            PathBuf::from("/data/papertrail.json")
        );
    }
}
