//! Production-line monitor.
//!
//! Drives the alert rule engine against mock production data: products are
//! regenerated on every refresh, per-product and aggregated rules run on each
//! cycle, time-based rules run on their own timers, and line sensors are
//! watched for sustained rising or falling trends.

pub mod mock;
pub mod rules;
pub mod runner;
pub mod sensors;

pub use mock::{MockFeed, MockGenerator};
pub use rules::{install_rules, load_products, load_rules, validate_rules, RuleReport};
pub use runner::{CycleSummary, Monitor};
pub use sensors::{detect_trend, SensorBank, SensorSeries, Trend};
