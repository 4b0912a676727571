//! Loading alert rules and product batches from JSON files.

use std::path::Path;

use alerts::{AlertConfigStore, AlertConfiguration, Product};
use anyhow::{Context, Result};
use tracing::{info, warn};

/// Read a JSON array of alert configurations.
pub fn load_rules(path: &Path) -> Result<Vec<AlertConfiguration>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read rules file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse rules file {}", path.display()))
}

/// Read a JSON array of products.
pub fn load_products(path: &Path) -> Result<Vec<Product>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read products file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse products file {}", path.display()))
}

/// Outcome of validating one rule.
#[derive(Debug, Clone)]
pub struct RuleReport {
    pub id: String,
    pub name: String,
    pub condition: String,
    pub mode: &'static str,
    pub error: Option<String>,
}

impl RuleReport {
    pub fn accepted(&self) -> bool {
        self.error.is_none()
    }
}

pub fn validate_rules(rules: &[AlertConfiguration]) -> Vec<RuleReport> {
    rules
        .iter()
        .map(|rule| RuleReport {
            id: rule.id.clone(),
            name: rule.name.clone(),
            condition: rule.describe_condition(),
            mode: rule.mode.as_str(),
            error: rule.validate().err().map(|e| e.to_string()),
        })
        .collect()
}

/// Save every valid rule into the store. Invalid rules are logged and skipped.
///
/// Returns how many rules were stored.
pub fn install_rules(store: &mut AlertConfigStore, rules: Vec<AlertConfiguration>) -> usize {
    let mut installed = 0;
    for rule in rules {
        let name = rule.name.clone();
        match store.save(rule) {
            Ok(saved) => {
                info!(config_id = %saved.id, name = %saved.name, mode = saved.mode.as_str(), "Installed alert rule");
                installed += 1;
            }
            Err(e) => warn!(name = %name, error = %e, "Skipping invalid alert rule"),
        }
    }
    installed
}
