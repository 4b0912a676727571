//! Production records and typed field lookup.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One produced part as reported by a station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub serial_number: String,
    pub timestamp: DateTime<Utc>,
    pub plant_id: String,
    pub line_id: String,
    pub station_id: String,
    pub program_id: String,
    pub part_id: String,
    pub controller_status: String,
    pub ai_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
}

/// Product attribute a configuration can monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MonitoredField {
    ControllerStatus,
    AiStatus,
    Temperature,
    Pressure,
    SerialNumber,
    PartNumber,
}

impl MonitoredField {
    /// Wire name, as used in configuration files.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ControllerStatus => "controllerStatus",
            Self::AiStatus => "aiStatus",
            Self::Temperature => "temperature",
            Self::Pressure => "pressure",
            Self::SerialNumber => "serialNumber",
            Self::PartNumber => "partNumber",
        }
    }

    /// Whether average/min/max aggregations produce anything for this field.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Temperature | Self::Pressure)
    }
}

impl fmt::Display for MonitoredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value read from a product for comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Missing,
}

impl FieldValue {
    /// String form used by equality, substring and regex operators.
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => format_number(*n),
            Self::Missing => String::new(),
        }
    }

    /// Numeric form used by ordering and range operators.
    ///
    /// Text is trimmed and parsed; blank text reads as zero and anything
    /// unparsable reads as NaN, so every comparison against it is false.
    #[must_use]
    pub fn as_number(&self) -> f64 {
        match self {
            Self::Number(n) => *n,
            Self::Text(s) => coerce_number(s),
            Self::Missing => f64::NAN,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

/// Parse a user-entered operand the same way field text is coerced.
#[must_use]
pub fn coerce_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Render a number without a trailing `.0` for whole values.
#[must_use]
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

impl Product {
    /// Read the monitored attribute.
    #[must_use]
    pub fn field(&self, field: MonitoredField) -> FieldValue {
        match field {
            MonitoredField::ControllerStatus => FieldValue::Text(self.controller_status.clone()),
            MonitoredField::AiStatus => FieldValue::Text(self.ai_status.clone()),
            MonitoredField::SerialNumber => FieldValue::Text(self.serial_number.clone()),
            MonitoredField::PartNumber => FieldValue::Text(self.part_id.clone()),
            MonitoredField::Temperature => {
                self.temperature.map_or(FieldValue::Missing, FieldValue::Number)
            }
            MonitoredField::Pressure => self.pressure.map_or(FieldValue::Missing, FieldValue::Number),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_field_lookup_covers_every_field() {
        let p = Product {
            pressure: Some(4.5),
            ..with_temperature("1", 80.0)
        };
        assert_eq!(p.field(MonitoredField::ControllerStatus), FieldValue::Text("OK".into()));
        assert_eq!(p.field(MonitoredField::AiStatus), FieldValue::Text("Normal".into()));
        assert_eq!(p.field(MonitoredField::SerialNumber), FieldValue::Text("SN-1".into()));
        assert_eq!(p.field(MonitoredField::PartNumber), FieldValue::Text("PART-1".into()));
        assert_eq!(p.field(MonitoredField::Temperature), FieldValue::Number(80.0));
        assert_eq!(p.field(MonitoredField::Pressure), FieldValue::Number(4.5));
    }

    #[test]
    fn test_missing_sensor_reads_as_missing() {
        let p = product("1");
        assert_eq!(p.field(MonitoredField::Temperature), FieldValue::Missing);
        assert!(FieldValue::Missing.as_number().is_nan());
        assert_eq!(FieldValue::Missing.as_text(), "");
    }

    #[test]
    fn test_text_coercion() {
        assert!((FieldValue::Text(" 12.5 ".into()).as_number() - 12.5).abs() < f64::EPSILON);
        assert!(FieldValue::Text("Warning".into()).as_number().is_nan());
        assert!(FieldValue::Text(String::new()).as_number().abs() < f64::EPSILON);
    }

    #[test]
    fn test_number_text_drops_trailing_zero() {
        assert_eq!(FieldValue::Number(95.0).as_text(), "95");
        assert_eq!(FieldValue::Number(95.5).as_text(), "95.5");
    }

    #[test]
    fn test_product_deserializes_camel_case() {
        let json = r#"{
            "id": "p1", "serialNumber": "SN1", "timestamp": "2024-01-01T00:00:00Z",
            "plantId": "P", "lineId": "L", "stationId": "S", "programId": "G",
            "partId": "X", "controllerStatus": "OK", "aiStatus": "Normal",
            "temperature": 71.5
        }"#;
        let p: Product = serde_json::from_str(json).unwrap();
        assert_eq!(p.temperature, Some(71.5));
        assert_eq!(p.pressure, None);
    }
}
