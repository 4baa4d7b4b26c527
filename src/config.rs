use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, Result},
    session::history::MAX_ENTRIES,
};

/// Main configuration for Memoir
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rasterization and delivery settings
    pub export: ExportConfig,

    /// Undo/redo history settings
    pub history: HistoryConfig,

    /// Placeholder image used when nothing is loaded
    pub placeholder: PlaceholderConfig,

    /// Transient notification settings
    pub notify: NotifyConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.export.validate()?;
        self.history.validate()?;
        self.placeholder.validate()?;
        Ok(())
    }
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// File name prefix; the unix-ms timestamp and `.png` are appended
    pub filename_prefix: String,

    /// Directory that receives downloaded prints
    pub download_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            filename_prefix: "memoir-export".to_string(),
            download_dir: PathBuf::from("."),
        }
    }
}

impl ExportConfig {
    fn validate(&self) -> Result<()> {
        if self.filename_prefix.is_empty() || self.filename_prefix.contains(['/', '\\']) {
            return Err(ConfigError::InvalidValue {
                key: "export.filename_prefix".to_string(),
                value: self.filename_prefix.clone()
            }.into());
        }

        Ok(())
    }
}

/// History configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of snapshots kept
    pub capacity: usize,

    /// Idle time after the last mutation before a snapshot is taken
    pub debounce_ms: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: 20,
            debounce_ms: 500,
        }
    }
}

impl HistoryConfig {
    fn validate(&self) -> Result<()> {
        // undo needs a "current" and a "previous" entry
        if !(2..=MAX_ENTRIES).contains(&self.capacity) {
            return Err(ConfigError::InvalidValue {
                key: "history.capacity".to_string(),
                value: self.capacity.to_string()
            }.into());
        }
        Ok(())
    }
}

/// Placeholder image configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceholderConfig {
    /// URL template; `{width}`, `{height}` and `{seed}` are substituted
    pub url_template: String,
    pub width: u32,
    pub height: u32,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            url_template: "https://picsum.photos/{width}/{height}?random={seed}".to_string(),
            width: 800,
            height: 1000,
        }
    }
}

impl PlaceholderConfig {
    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidValue {
                key: "placeholder.size".to_string(),
                value: format!("{}x{}", self.width, self.height)
            }.into());
        }
        Ok(())
    }

    /// Expand the template for a given random seed
    pub fn url(&self, seed: u32) -> String {
        self.url_template
            .replace("{width}", &self.width.to_string())
            .replace("{height}", &self.height.to_string())
            .replace("{seed}", &seed.to_string())
    }
}

/// Notification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// How long a notification stays visible
    pub duration_ms: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self { duration_ms: 3000 }
    }
}
