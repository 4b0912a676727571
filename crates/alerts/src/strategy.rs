//! Evaluation strategies, one per [`EvaluationMode`].
//!
//! Every strategy bumps `trigger_count` on each firing, muted or not. Muted
//! configurations produce no [`Alert`].

use chrono::{DateTime, Utc};
use notify::{Alert, AlertDetails, AlertType};
use tracing::debug;

use crate::condition::Condition;
use crate::configuration::{AggregationType, AlertConfiguration, EvaluationMode};
use crate::filter::filter_products;
use crate::product::{format_number, MonitoredField, Product};

/// The products that satisfy the configuration's condition.
///
/// The condition is compiled once for the whole slice.
#[must_use]
pub fn matching<'p>(config: &AlertConfiguration, products: &[&'p Product]) -> Vec<&'p Product> {
    let condition = Condition::new(
        config.operator,
        &config.value,
        config.second_value.as_deref(),
    );
    products
        .iter()
        .copied()
        .filter(|p| condition.matches(&p.field(config.field)))
        .collect()
}

/// Reduce the filtered set to one number.
///
/// `matching` must be the subset of `filtered` that satisfies the condition.
/// Average, min and max only look at numeric fields; for any other field
/// they yield 0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn aggregate(
    aggregation: AggregationType,
    field: MonitoredField,
    filtered: &[&Product],
    matching: &[&Product],
) -> f64 {
    match aggregation {
        AggregationType::Count => matching.len() as f64,
        AggregationType::Percentage => {
            if filtered.is_empty() {
                0.0
            } else {
                (matching.len() as f64 / filtered.len() as f64) * 100.0
            }
        }
        AggregationType::Average | AggregationType::Min | AggregationType::Max => {
            if !field.is_numeric() {
                return 0.0;
            }
            let values: Vec<f64> = matching
                .iter()
                .map(|p| p.field(field).as_number())
                .filter(|v| !v.is_nan())
                .collect();
            if values.is_empty() {
                return 0.0;
            }
            match aggregation {
                AggregationType::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
                AggregationType::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                _ => values.iter().sum::<f64>() / values.len() as f64,
            }
        }
    }
}

fn base_details(config: &AlertConfiguration) -> AlertDetails {
    AlertDetails {
        config_name: Some(config.name.clone()),
        field: Some(config.field.as_str().to_string()),
        evaluation_mode: Some(config.mode.as_str().to_string()),
        operator: Some(config.operator.symbol().to_string()),
        threshold: Some(config.value.clone()),
        ..AlertDetails::default()
    }
}

fn rounded(value: f64) -> String {
    format_number((value * 100.0).round() / 100.0)
}

/// Fire once per matching product.
pub fn run_per_product(
    config: &mut AlertConfiguration,
    products: &[&Product],
    now: DateTime<Utc>,
) -> Vec<Alert> {
    let matched = matching(config, products);
    let mut alerts = Vec::new();

    for product in matched {
        config.trigger_count += 1;
        if config.muted {
            debug!(config_id = %config.id, product_id = %product.id, "Muted configuration matched");
            continue;
        }

        let actual = product.field(config.field).as_text();
        let message = format!(
            "Product {} (serial {}) matched {}; actual value {}",
            product.id,
            product.serial_number,
            config.describe_condition(),
            actual
        );
        let details = AlertDetails {
            actual_value: Some(actual),
            product_id: Some(product.id.clone()),
            ..base_details(config)
        };
        alerts.push(
            Alert::new(AlertType::Warning, config.name.clone(), message)
                .with_details(details)
                .with_timestamp(now),
        );
    }

    alerts
}

/// Fire once when the aggregate over `products` reaches the threshold.
///
/// Used for both aggregated and time-based configurations; per-product
/// configurations never fire here.
pub fn run_aggregated(
    config: &mut AlertConfiguration,
    products: &[&Product],
    now: DateTime<Utc>,
) -> Option<Alert> {
    let (aggregation, threshold) = config.mode.aggregation()?;

    let matched = matching(config, products);
    let value = aggregate(aggregation, config.field, products, &matched);

    if value < threshold {
        return None;
    }

    config.trigger_count += 1;
    if config.muted {
        debug!(config_id = %config.id, value, "Muted configuration reached threshold");
        return None;
    }

    let suffix = if aggregation == AggregationType::Percentage {
        "%"
    } else {
        ""
    };
    let mut message = format!(
        "{} of products matching {} is {}{} (threshold {}{}, {} of {} products matched)",
        aggregation,
        config.describe_condition(),
        rounded(value),
        suffix,
        rounded(threshold),
        suffix,
        matched.len(),
        products.len()
    );

    let mut details = AlertDetails {
        threshold: Some(rounded(threshold)),
        actual_value: Some(rounded(value)),
        aggregation_type: Some(aggregation.as_str().to_string()),
        ..base_details(config)
    };

    let alert_type = if let EvaluationMode::TimeBased { time_interval, .. } = config.mode {
        details.time_interval_minutes = Some(time_interval);
        message = format!("Scheduled check (every {time_interval} min): {message}");
        AlertType::Warning
    } else {
        AlertType::Error
    };

    Some(
        Alert::new(alert_type, config.name.clone(), message)
            .with_details(details)
            .with_timestamp(now),
    )
}

/// Filter `products` by the configuration's scope and run its strategy.
///
/// An empty filtered set skips the configuration entirely: no aggregation,
/// no trigger, and `last_checked` is left alone.
pub fn evaluate_configuration(
    config: &mut AlertConfiguration,
    products: &[Product],
    now: DateTime<Utc>,
) -> Vec<Alert> {
    let filtered = filter_products(products, &config.scope);
    if filtered.is_empty() {
        debug!(config_id = %config.id, "No products in scope, skipping");
        return Vec::new();
    }

    config.last_checked = Some(now);
    match config.mode {
        EvaluationMode::PerProduct => run_per_product(config, &filtered, now),
        EvaluationMode::Aggregated { .. } | EvaluationMode::TimeBased { .. } => {
            run_aggregated(config, &filtered, now).into_iter().collect()
        }
    }
}
