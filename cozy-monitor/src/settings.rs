//! Monitor settings

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cozy_detect::PortSelection;
use cozy_hal::BoardConfig;
use serde::{Deserialize, Serialize};

fn default_chambers() -> usize {
    6
}

/// Persisted monitor settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Number of chambers the firmware reports
    #[serde(default = "default_chambers")]
    pub chambers: usize,
    /// Which port to use
    #[serde(default)]
    pub port: PortSelection,
    /// Link, polling and simulation parameters
    #[serde(default)]
    pub board: BoardConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chambers: default_chambers(),
            port: PortSelection::Auto,
            board: BoardConfig::default(),
        }
    }
}

impl Settings {
    /// Get the XDG config directory for fishcozy
    /// Uses $XDG_CONFIG_HOME/fishcozy, falls back to ~/.config/fishcozy
    fn config_dir() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_config);
            if path.is_absolute() {
                return Some(path.join("fishcozy"));
            }
        }

        dirs::home_dir().map(|h| h.join(".config").join("fishcozy"))
    }

    /// Default settings file path
    pub fn default_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.json"))
    }

    /// Load settings from an explicit file, or from the default location
    ///
    /// A missing default file yields defaults; a missing explicit file is an
    /// error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    fn load_from(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse settings in {}", path.display()))
    }

    /// Save settings, to `path` or the default location
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path().context("Could not determine settings path")?,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write settings to {}", path.display()))?;

        Ok(path)
    }
}
