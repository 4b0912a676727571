//! Persisted dashboard settings.
//!
//! Settings are stored as one JSON value under a fixed key inside a small
//! JSON object file, the way a browser dashboard keeps them in local
//! storage.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod settings;
pub mod storage;

pub use error::ConfigError;
pub use settings::DashboardSettings;
pub use storage::{SettingsStore, SETTINGS_KEY, SETTINGS_PATH_ENV};
