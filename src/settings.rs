//! # Persisted Settings
//!
//! The one piece of state that survives across sessions: the network
//! printer's interface address, stored as JSON under the platform config
//! directory. Print jobs themselves are never persisted.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("no config directory available on this platform")]
    NoConfigDir,

    #[error("failed to read settings: {0}")]
    Read(#[from] std::io::Error),

    #[error("settings file is malformed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Printing settings, currently just the printer interface address.
///
/// The field name matches the backend probe request so the same string
/// round-trips untouched between the settings file and the probe body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "printerInterface", default)]
    pub printer_interface: Option<String>,
}

impl Settings {
    /// Load from the platform config directory. A missing file is a
    /// default, not an error; a malformed file is reported.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(&settings_path()?)
    }

    /// Persist to the platform config directory, creating it if needed.
    pub fn save(&self) -> Result<(), SettingsError> {
        self.save_to(&settings_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        debug!(path = %path.display(), "settings saved");
        Ok(())
    }
}

fn settings_path() -> Result<PathBuf, SettingsError> {
    let dirs = ProjectDirs::from("", "", "recibo").ok_or(SettingsError::NoConfigDir)?;
    Ok(dirs.config_dir().join(SETTINGS_FILE))
}
