//! Alert configuration model and creation-time validation.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::condition::Operator;
use crate::error::ValidationError;
use crate::filter::ScopeFilter;
use crate::product::{format_number, MonitoredField};

/// Longest accepted time-based interval: 30 days.
pub const MAX_INTERVAL_MINUTES: u64 = 30 * 24 * 60;

/// Reduction applied across a filtered product set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AggregationType {
    /// Number of matching products.
    Count,
    /// Matching products as a share of the filtered set, 0-100.
    Percentage,
    /// Mean of the numeric field over matching products.
    Average,
    Min,
    Max,
}

impl AggregationType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Percentage => "percentage",
            Self::Average => "average",
            Self::Min => "min",
            Self::Max => "max",
        }
    }
}

impl fmt::Display for AggregationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a configuration decides to fire. Exactly one mode is active, and
/// only that mode's parameters exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "evaluationMode",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum EvaluationMode {
    /// One alert per matching product.
    PerProduct,
    /// One alert when the aggregate over the filtered set reaches the threshold.
    Aggregated {
        aggregation_type: AggregationType,
        aggregation_threshold: f64,
    },
    /// Aggregated evaluation re-run on its own timer instead of on each pass.
    TimeBased {
        /// Minutes between checks.
        time_interval: u64,
        aggregation_type: AggregationType,
        aggregation_threshold: f64,
    },
}

impl EvaluationMode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PerProduct => "perProduct",
            Self::Aggregated { .. } => "aggregated",
            Self::TimeBased { .. } => "timeBased",
        }
    }

    #[must_use]
    pub const fn is_time_based(&self) -> bool {
        matches!(self, Self::TimeBased { .. })
    }

    /// Aggregation type and threshold, for the modes that have them.
    #[must_use]
    pub const fn aggregation(&self) -> Option<(AggregationType, f64)> {
        match self {
            Self::PerProduct => None,
            Self::Aggregated {
                aggregation_type,
                aggregation_threshold,
            }
            | Self::TimeBased {
                aggregation_type,
                aggregation_threshold,
                ..
            } => Some((*aggregation_type, *aggregation_threshold)),
        }
    }
}

/// A user-defined rule: what to watch, where, and whom to tell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertConfiguration {
    #[serde(default = "generate_id")]
    pub id: String,
    pub name: String,
    /// Monitored product attribute.
    #[serde(rename = "type")]
    pub field: MonitoredField,
    pub operator: Operator,
    #[serde(deserialize_with = "operand::required")]
    pub value: String,
    #[serde(
        default,
        deserialize_with = "operand::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub second_value: Option<String>,
    #[serde(flatten)]
    pub scope: ScopeFilter,
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub muted: bool,
    #[serde(flatten)]
    pub mode: EvaluationMode,
    #[serde(default)]
    pub trigger_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_checked: Option<DateTime<Utc>>,
}

fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

const fn enabled_by_default() -> bool {
    true
}

impl AlertConfiguration {
    /// Enabled, unmuted, per-product configuration with no scope and no recipients.
    pub fn new(
        name: impl Into<String>,
        field: MonitoredField,
        operator: Operator,
        value: impl Into<String>,
    ) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            field,
            operator,
            value: value.into(),
            second_value: None,
            scope: ScopeFilter::default(),
            emails: Vec::new(),
            enabled: true,
            muted: false,
            mode: EvaluationMode::PerProduct,
            trigger_count: 0,
            last_checked: None,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    #[must_use]
    pub fn with_second_value(mut self, value: impl Into<String>) -> Self {
        self.second_value = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_scope(mut self, scope: ScopeFilter) -> Self {
        self.scope = scope;
        self
    }

    #[must_use]
    pub fn with_emails<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.emails = emails.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_muted(mut self, muted: bool) -> Self {
        self.muted = muted;
        self
    }

    /// Timer period for time-based configurations.
    #[must_use]
    pub fn interval(&self) -> Option<Duration> {
        match self.mode {
            EvaluationMode::TimeBased { time_interval, .. } => {
                Some(Duration::from_secs(time_interval.saturating_mul(60)))
            }
            _ => None,
        }
    }

    /// Human-readable condition, e.g. `temperature > 90`.
    #[must_use]
    pub fn describe_condition(&self) -> String {
        match (&self.second_value, self.operator.requires_second_value()) {
            (Some(second), true) => format!(
                "{} {} {} and {}",
                self.field, self.operator, self.value, second
            ),
            _ => format!("{} {} {}", self.field, self.operator, self.value),
        }
    }

    /// Check user input before the configuration is stored.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }
        if self.operator == Operator::Unknown {
            return Err(ValidationError::UnknownOperator);
        }
        if self.value.trim().is_empty() {
            return Err(ValidationError::MissingValue);
        }
        if self.operator.requires_second_value()
            && self
                .second_value
                .as_deref()
                .map_or(true, |v| v.trim().is_empty())
        {
            return Err(ValidationError::MissingSecondValue(self.operator));
        }
        if self.emails.is_empty() {
            return Err(ValidationError::MissingRecipients);
        }
        if let Some(bad) = self.emails.iter().find(|e| !is_valid_email(e)) {
            return Err(ValidationError::InvalidEmail(bad.clone()));
        }
        if let Some((_, threshold)) = self.mode.aggregation() {
            if !threshold.is_finite() || threshold < 0.0 {
                return Err(ValidationError::InvalidThreshold(threshold));
            }
        }
        if let EvaluationMode::TimeBased { time_interval, .. } = self.mode {
            if time_interval == 0 {
                return Err(ValidationError::InvalidInterval);
            }
            if time_interval > MAX_INTERVAL_MINUTES {
                return Err(ValidationError::IntervalTooLong(time_interval));
            }
        }
        Ok(())
    }
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.trim().split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.trim().contains(char::is_whitespace)
}

/// Comparison operands accept either JSON strings or numbers.
mod operand {
    use super::{format_number, Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(f64),
    }

    impl From<Raw> for String {
        fn from(raw: Raw) -> Self {
            match raw {
                Raw::Text(s) => s,
                Raw::Number(n) => format_number(n),
            }
        }
    }

    pub fn required<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Raw::deserialize(deserializer).map(String::from)
    }

    pub fn optional<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<Raw>::deserialize(deserializer).map(|raw| raw.map(String::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> AlertConfiguration {
        AlertConfiguration::new("Overheat", MonitoredField::Temperature, Operator::Greater, "90")
            .with_emails(["ops@example.com"])
    }

    #[test]
    fn test_valid_configuration_passes() {
        assert_eq!(valid().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_missing_name_and_value() {
        let mut c = valid();
        c.name = "  ".to_string();
        assert_eq!(c.validate(), Err(ValidationError::MissingName));

        let mut c = valid();
        c.value = String::new();
        assert_eq!(c.validate(), Err(ValidationError::MissingValue));
    }

    #[test]
    fn test_range_operator_needs_second_value() {
        let mut c = valid();
        c.operator = Operator::Between;
        assert_eq!(
            c.validate(),
            Err(ValidationError::MissingSecondValue(Operator::Between))
        );
        assert_eq!(c.with_second_value("100").validate(), Ok(()));
    }

    #[test]
    fn test_rejects_bad_recipients() {
        let c = valid().with_emails(Vec::<String>::new());
        assert_eq!(c.validate(), Err(ValidationError::MissingRecipients));

        let c = valid().with_emails(["ops@example.com", "not-an-email"]);
        assert_eq!(
            c.validate(),
            Err(ValidationError::InvalidEmail("not-an-email".to_string()))
        );
    }

    #[test]
    fn test_rejects_bad_mode_parameters() {
        let c = valid().with_mode(EvaluationMode::Aggregated {
            aggregation_type: AggregationType::Count,
            aggregation_threshold: -1.0,
        });
        assert_eq!(c.validate(), Err(ValidationError::InvalidThreshold(-1.0)));

        let c = valid().with_mode(EvaluationMode::TimeBased {
            time_interval: 0,
            aggregation_type: AggregationType::Count,
            aggregation_threshold: 1.0,
        });
        assert_eq!(c.validate(), Err(ValidationError::InvalidInterval));
    }

    #[test]
    fn test_rejects_interval_beyond_cap() {
        let scheduled = |minutes| {
            valid().with_mode(EvaluationMode::TimeBased {
                time_interval: minutes,
                aggregation_type: AggregationType::Count,
                aggregation_threshold: 1.0,
            })
        };

        assert_eq!(scheduled(MAX_INTERVAL_MINUTES).validate(), Ok(()));
        assert_eq!(
            scheduled(u64::MAX / 60).validate(),
            Err(ValidationError::IntervalTooLong(u64::MAX / 60))
        );
    }

    #[test]
    fn test_interval_only_for_time_based() {
        assert_eq!(valid().interval(), None);
        let c = valid().with_mode(EvaluationMode::TimeBased {
            time_interval: 5,
            aggregation_type: AggregationType::Count,
            aggregation_threshold: 1.0,
        });
        assert_eq!(c.interval(), Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_deserializes_flat_json() {
        let json = r#"{
            "id": "cfg-1",
            "name": "Warnings on line 1",
            "type": "controllerStatus",
            "operator": "equal",
            "value": "Warning",
            "lineId": "LINE-1",
            "emails": ["ops@example.com"],
            "evaluationMode": "aggregated",
            "aggregationType": "count",
            "aggregationThreshold": 2
        }"#;
        let c: AlertConfiguration = serde_json::from_str(json).unwrap();

        assert_eq!(c.id, "cfg-1");
        assert_eq!(c.field, MonitoredField::ControllerStatus);
        assert_eq!(c.scope.line_id.as_deref(), Some("LINE-1"));
        assert!(c.enabled);
        assert!(!c.muted);
        assert_eq!(
            c.mode,
            EvaluationMode::Aggregated {
                aggregation_type: AggregationType::Count,
                aggregation_threshold: 2.0,
            }
        );
    }

    #[test]
    fn test_numeric_operands_become_text() {
        let json = r#"{
            "name": "Pressure window",
            "type": "pressure",
            "operator": "notBetween",
            "value": 2,
            "secondValue": 8.5,
            "emails": ["ops@example.com"],
            "evaluationMode": "timeBased",
            "timeInterval": 5,
            "aggregationType": "max",
            "aggregationThreshold": 9
        }"#;
        let c: AlertConfiguration = serde_json::from_str(json).unwrap();

        assert_eq!(c.value, "2");
        assert_eq!(c.second_value.as_deref(), Some("8.5"));
        assert!(!c.id.is_empty());
        assert!(c.mode.is_time_based());
    }

    #[test]
    fn test_describe_condition() {
        assert_eq!(valid().describe_condition(), "temperature > 90");
        let c = AlertConfiguration::new("w", MonitoredField::Pressure, Operator::Between, "2")
            .with_second_value("8");
        assert_eq!(c.describe_condition(), "pressure between 2 and 8");
    }
}
