//! Local key-value storage backed by a single JSON object file.
//!
//! Dashboard settings live under [`SETTINGS_KEY`]. Other keys in the file
//! belong to other features and are written back untouched.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::settings::DashboardSettings;

/// Storage key for dashboard settings.
pub const SETTINGS_KEY: &str = "manufacturing-dashboard-settings";

/// Environment variable overriding the storage file location.
pub const SETTINGS_PATH_ENV: &str = "DASHBOARD_SETTINGS_PATH";

const DEFAULT_FILE_NAME: &str = "dashboard-storage.json";

#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `DASHBOARD_SETTINGS_PATH`, or `dashboard-storage.json` in the
    /// working directory.
    pub fn from_env() -> Self {
        let path = std::env::var(SETTINGS_PATH_ENV)
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_FILE_NAME), PathBuf::from);
        Self::new(path)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings, falling back to defaults when nothing usable is stored.
    ///
    /// A missing file, a missing key or an unreadable payload all yield the
    /// defaults. Unreadable payloads are logged.
    pub fn load_settings(&self) -> DashboardSettings {
        match self.try_load_settings() {
            Ok(Some(settings)) => settings,
            Ok(None) => {
                debug!(path = %self.path.display(), "No stored settings, using defaults");
                DashboardSettings::default()
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring unreadable settings");
                DashboardSettings::default()
            }
        }
    }

    /// Strict variant of [`load_settings`](Self::load_settings).
    pub fn try_load_settings(&self) -> Result<Option<DashboardSettings>, ConfigError> {
        let mut entries = self.read_entries()?;
        let Some(value) = entries.remove(SETTINGS_KEY) else {
            return Ok(None);
        };
        let settings: DashboardSettings = serde_json::from_value(value)?;
        settings.validate()?;
        Ok(Some(settings))
    }

    /// Validate and persist settings, keeping every other stored key.
    pub fn save_settings(&self, settings: &DashboardSettings) -> Result<(), ConfigError> {
        settings.validate()?;
        let mut entries = self.read_entries()?;
        entries.insert(SETTINGS_KEY.to_string(), serde_json::to_value(settings)?);
        self.write_entries(&entries)?;
        debug!(path = %self.path.display(), "Saved dashboard settings");
        Ok(())
    }

    fn read_entries(&self) -> Result<Map<String, Value>, ConfigError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = std::fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str(&content)? {
            Value::Object(map) => Ok(map),
            _ => Err(ConfigError::NotAnObject),
        }
    }

    fn write_entries(&self, entries: &Map<String, Value>) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, content).map_err(io_err)
    }
}
