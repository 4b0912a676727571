//! Alert records and the email messages derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Severity-like classification shown on the alert banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    /// Informational - normal operations
    Info,
    /// Warning - something needs attention
    Warning,
    /// Error - a monitored condition crossed its limit
    Error,
    /// Success - a recovery or completed action
    Success,
}

impl AlertType {
    /// Get display name for this alert type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::Warning => "Warning",
            Self::Error => "Error",
            Self::Success => "Success",
        }
    }
}

/// Optional display fields attached to an alert raised by a configuration.
///
/// None of these influence delivery; they only feed the banner and the
/// simulated email body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_interval_minutes: Option<u64>,
}

/// A fired alert, as shown to the operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, flatten)]
    pub details: AlertDetails,
}

impl Alert {
    /// Create an alert with a fresh id, stamped with the current time.
    pub fn new(alert_type: AlertType, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            message: message.into(),
            alert_type,
            timestamp: Utc::now(),
            details: AlertDetails::default(),
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: AlertDetails) -> Self {
        self.details = details;
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Simulated email sent for a fired alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub alert_id: String,
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
}

impl EmailMessage {
    /// Build the email for an alert addressed to `recipients`.
    #[must_use]
    pub fn for_alert(alert: &Alert, recipients: &[String]) -> Self {
        let mut body = format!(
            "{}\n\nType: {}\nRaised at: {}",
            alert.message,
            alert.alert_type.as_str(),
            alert.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        );

        let d = &alert.details;
        let lines = [
            ("Configuration", d.config_name.clone()),
            ("Field", d.field.clone()),
            ("Mode", d.evaluation_mode.clone()),
            ("Operator", d.operator.clone()),
            ("Threshold", d.threshold.clone()),
            ("Actual value", d.actual_value.clone()),
            ("Product", d.product_id.clone()),
            ("Aggregation", d.aggregation_type.clone()),
            (
                "Interval (min)",
                d.time_interval_minutes.map(|m| m.to_string()),
            ),
        ];
        for (label, value) in lines {
            if let Some(value) = value {
                body.push_str(&format!("\n{label}: {value}"));
            }
        }

        Self {
            alert_id: alert.id.clone(),
            recipients: recipients.to_vec(),
            subject: format!("[{}] {}", alert.alert_type.as_str(), alert.title),
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_type_serializes_lowercase() {
        let json = serde_json::to_string(&AlertType::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
    }

    #[test]
    fn test_alert_serializes_type_and_flattened_details() {
        let alert = Alert::new(AlertType::Error, "Hot", "Too hot").with_details(AlertDetails {
            product_id: Some("P-1".to_string()),
            ..AlertDetails::default()
        });
        let value = serde_json::to_value(&alert).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["productId"], "P-1");
        assert!(value.get("operator").is_none());
    }

    #[test]
    fn test_email_includes_populated_details_only() {
        let alert = Alert::new(AlertType::Warning, "Overheat", "Temperature above 90").with_details(
            AlertDetails {
                config_name: Some("Overheat".to_string()),
                actual_value: Some("95".to_string()),
                ..AlertDetails::default()
            },
        );
        let email = EmailMessage::for_alert(&alert, &["ops@example.com".to_string()]);

        assert_eq!(email.subject, "[Warning] Overheat");
        assert!(email.body.contains("Actual value: 95"));
        assert!(email.body.contains("Configuration: Overheat"));
        assert!(!email.body.contains("Operator:"));
        assert!(email
            .body
            .ends_with("\nConfiguration: Overheat\nActual value: 95"));
        assert_eq!(email.recipients, vec!["ops@example.com"]);
    }
}
