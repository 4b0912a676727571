//! Dashboard display settings.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Seconds between dashboard refreshes when nothing is stored.
pub const DEFAULT_REFRESH_SECS: u64 = 30;
/// Percent change between sample windows that counts as a trend.
pub const DEFAULT_TREND_THRESHOLD: f64 = 5.0;
/// Samples per trend window.
pub const DEFAULT_TREND_WINDOW: usize = 10;

/// User-adjustable dashboard settings.
///
/// Missing keys in stored JSON fall back to their defaults, so older
/// payloads keep loading after new settings are added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardSettings {
    pub auto_refresh_interval_secs: u64,
    pub trend_threshold: f64,
    pub trend_window: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            auto_refresh_interval_secs: DEFAULT_REFRESH_SECS,
            trend_threshold: DEFAULT_TREND_THRESHOLD,
            trend_window: DEFAULT_TREND_WINDOW,
        }
    }
}

impl DashboardSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auto_refresh_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "autoRefreshIntervalSecs",
                reason: "must be at least 1 second".to_string(),
            });
        }
        if !self.trend_threshold.is_finite() || self.trend_threshold < 0.0 {
            return Err(ConfigError::Invalid {
                field: "trendThreshold",
                reason: format!("{} is not a non-negative percentage", self.trend_threshold),
            });
        }
        if self.trend_window < 2 {
            return Err(ConfigError::Invalid {
                field: "trendWindow",
                reason: "needs at least 2 samples".to_string(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn refresh_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.auto_refresh_interval_secs)
    }
}
