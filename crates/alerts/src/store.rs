//! In-memory registry of alert configurations.
//!
//! The store owns the timer of every enabled time-based configuration and
//! keeps it in step with the record: saving re-arms it with the current
//! interval, disabling or deleting cancels it. Records are memory-only.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use notify::{Alert, AlertSink};
use tracing::{debug, info};

use crate::configuration::AlertConfiguration;
use crate::error::StoreError;
use crate::product::Product;
use crate::scheduler::Scheduler;
use crate::source::ProductSource;
use crate::strategy::evaluate_configuration;

type Registry = Mutex<Vec<AlertConfiguration>>;

fn lock(registry: &Registry) -> MutexGuard<'_, Vec<AlertConfiguration>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Evaluate `configs` that pass `select` and hand fired alerts to `sink`.
///
/// The registry lock is released before anything reaches the sink.
fn evaluate_and_emit<P>(
    registry: &Registry,
    sink: &AlertSink,
    products: &[Product],
    select: P,
) -> Vec<Alert>
where
    P: Fn(&AlertConfiguration) -> bool,
{
    let now = Utc::now();
    let mut fired: Vec<(Alert, Vec<String>)> = Vec::new();

    {
        let mut configs = lock(registry);
        for config in configs.iter_mut().filter(|c| select(c)) {
            for alert in evaluate_configuration(config, products, now) {
                fired.push((alert, config.emails.clone()));
            }
        }
    }

    fired
        .into_iter()
        .map(|(alert, recipients)| {
            sink.emit(alert.clone(), &recipients);
            alert
        })
        .collect()
}

/// Alert configuration registry and timer owner.
pub struct AlertConfigStore {
    configs: Arc<Registry>,
    scheduler: Scheduler,
    sink: Arc<AlertSink>,
    source: Arc<dyn ProductSource>,
}

impl AlertConfigStore {
    /// Create an empty store delivering to `sink`; time-based checks read
    /// their products from `source`.
    pub fn new(sink: Arc<AlertSink>, source: Arc<dyn ProductSource>) -> Self {
        Self {
            configs: Arc::new(Mutex::new(Vec::new())),
            scheduler: Scheduler::new(),
            sink,
            source,
        }
    }

    /// Validate and upsert by id, then bring the timer in line with the record.
    pub fn save(&mut self, config: AlertConfiguration) -> Result<AlertConfiguration, StoreError> {
        config.validate()?;

        {
            let mut configs = lock(&self.configs);
            match configs.iter_mut().find(|c| c.id == config.id) {
                Some(existing) => *existing = config.clone(),
                None => configs.push(config.clone()),
            }
        }

        info!(config_id = %config.id, name = %config.name, mode = config.mode.as_str(), "Alert configuration saved");
        self.sync_timer(&config);
        Ok(config)
    }

    /// Cancel the configuration's timer, then remove it.
    pub fn delete(&mut self, id: &str) -> Result<AlertConfiguration, StoreError> {
        self.scheduler.cancel(id);

        let mut configs = lock(&self.configs);
        let index = configs
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let removed = configs.remove(index);
        info!(config_id = %id, "Alert configuration deleted");
        Ok(removed)
    }

    /// All configurations, in insertion order.
    #[must_use]
    pub fn list(&self) -> Vec<AlertConfiguration> {
        lock(&self.configs).clone()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<AlertConfiguration> {
        lock(&self.configs).iter().find(|c| c.id == id).cloned()
    }

    fn update<T>(
        &self,
        id: &str,
        apply: impl FnOnce(&mut AlertConfiguration) -> T,
    ) -> Result<(T, AlertConfiguration), StoreError> {
        let mut configs = lock(&self.configs);
        let config = configs
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let out = apply(config);
        Ok((out, config.clone()))
    }

    /// Flip `enabled`; returns the new value.
    pub fn toggle_enabled(&mut self, id: &str) -> Result<bool, StoreError> {
        let (enabled, config) = self.update(id, |c| {
            c.enabled = !c.enabled;
            c.enabled
        })?;
        self.sync_timer(&config);
        Ok(enabled)
    }

    /// Flip `muted`; returns the new value. Timers are unaffected.
    pub fn toggle_mute(&self, id: &str) -> Result<bool, StoreError> {
        let (muted, _) = self.update(id, |c| {
            c.muted = !c.muted;
            c.muted
        })?;
        Ok(muted)
    }

    /// Zero the trigger count.
    pub fn reset_count(&self, id: &str) -> Result<(), StoreError> {
        self.update(id, |c| c.trigger_count = 0)?;
        Ok(())
    }

    /// Run one evaluation pass over `products`.
    ///
    /// Covers every enabled per-product and aggregated configuration;
    /// time-based ones only run from their timers. Returns the alerts that
    /// were handed to the sink.
    pub fn check_alerts(&self, products: &[Product]) -> Vec<Alert> {
        let alerts = evaluate_and_emit(&self.configs, &self.sink, products, |c| {
            c.enabled && !c.mode.is_time_based()
        });
        debug!(
            product_count = products.len(),
            alert_count = alerts.len(),
            "Evaluation pass complete"
        );
        alerts
    }

    /// Run a time-based configuration's check immediately, as its timer would.
    pub fn run_scheduled_check(&self, id: &str) -> Vec<Alert> {
        let products = self.source.snapshot();
        evaluate_and_emit(&self.configs, &self.sink, &products, |c| {
            c.id == id && c.enabled && c.mode.is_time_based()
        })
    }

    #[must_use]
    pub fn has_timer(&self, id: &str) -> bool {
        self.scheduler.is_armed(id)
    }

    #[must_use]
    pub fn active_timers(&self) -> usize {
        self.scheduler.active_count()
    }

    /// Cancel every timer. Records are kept.
    pub fn shutdown(&mut self) {
        let count = self.scheduler.active_count();
        self.scheduler.cancel_all();
        info!(cancelled = count, "Alert timers stopped");
    }

    fn sync_timer(&mut self, config: &AlertConfiguration) {
        let period = match config.interval() {
            Some(period) if config.enabled => period,
            _ => {
                self.scheduler.cancel(&config.id);
                return;
            }
        };

        let registry = Arc::clone(&self.configs);
        let sink = Arc::clone(&self.sink);
        let source = Arc::clone(&self.source);
        let id = config.id.clone();

        self.scheduler.arm(&config.id, period, move || {
            let products = source.snapshot();
            let alerts = evaluate_and_emit(&registry, &sink, &products, |c| {
                c.id == id && c.enabled && c.mode.is_time_based()
            });
            debug!(config_id = %id, alert_count = alerts.len(), "Scheduled check complete");
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Operator;
    use crate::configuration::{AggregationType, EvaluationMode};
    use crate::product::fixtures::with_temperature;
    use crate::product::MonitoredField;
    use crate::source::StaticSnapshot;

    fn store() -> AlertConfigStore {
        AlertConfigStore::new(
            Arc::new(AlertSink::default()),
            Arc::new(StaticSnapshot::default()),
        )
    }

    fn overheat(id: &str) -> AlertConfiguration {
        AlertConfiguration::new("Overheat", MonitoredField::Temperature, Operator::Greater, "90")
            .with_id(id)
            .with_emails(["ops@example.com"])
    }

    fn time_based(id: &str, minutes: u64) -> AlertConfiguration {
        overheat(id).with_mode(EvaluationMode::TimeBased {
            time_interval: minutes,
            aggregation_type: AggregationType::Count,
            aggregation_threshold: 1.0,
        })
    }

    #[test]
    fn test_save_upserts_by_id() {
        let mut store = store();
        store.save(overheat("a")).unwrap();
        store.save(overheat("b")).unwrap();

        let mut renamed = overheat("a");
        renamed.name = "Renamed".to_string();
        store.save(renamed).unwrap();

        let list = store.list();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].name, "Renamed");
        assert_eq!(list[1].id, "b");
    }

    #[test]
    fn test_save_rejects_invalid_input() {
        let mut store = store();
        let err = store.save(overheat("a").with_emails(Vec::<String>::new()));

        assert!(matches!(err, Err(StoreError::Invalid(_))));
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let mut store = store();
        assert!(matches!(store.delete("x"), Err(StoreError::NotFound(_))));
        assert!(matches!(store.toggle_enabled("x"), Err(StoreError::NotFound(_))));
        assert!(matches!(store.toggle_mute("x"), Err(StoreError::NotFound(_))));
        assert!(matches!(store.reset_count("x"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_toggles_and_reset() {
        let mut store = store();
        store.save(overheat("a")).unwrap();

        assert!(!store.toggle_enabled("a").unwrap());
        assert!(store.toggle_mute("a").unwrap());

        let products = vec![with_temperature("p", 95.0)];
        assert!(store.check_alerts(&products).is_empty());
        assert_eq!(store.get("a").unwrap().trigger_count, 0);

        store.toggle_enabled("a").unwrap();
        assert!(store.check_alerts(&products).is_empty());
        assert_eq!(store.get("a").unwrap().trigger_count, 1);

        store.reset_count("a").unwrap();
        assert_eq!(store.get("a").unwrap().trigger_count, 0);
    }

    #[test]
    fn test_check_alerts_skips_time_based() {
        let mut store = store();
        store.save(time_based("t", 5)).unwrap();

        let products = vec![with_temperature("p", 95.0)];
        assert!(store.check_alerts(&products).is_empty());
        assert_eq!(store.get("t").unwrap().trigger_count, 0);
    }

    #[tokio::test]
    async fn test_timer_lifecycle() {
        let mut store = store();

        store.save(time_based("t", 5)).unwrap();
        store.save(time_based("t", 10)).unwrap();
        assert_eq!(store.active_timers(), 1);
        assert!(store.has_timer("t"));

        store.toggle_enabled("t").unwrap();
        assert_eq!(store.active_timers(), 0);

        store.toggle_enabled("t").unwrap();
        assert!(store.has_timer("t"));

        store.toggle_mute("t").unwrap();
        assert!(store.has_timer("t"));

        store.save(overheat("t")).unwrap();
        assert!(!store.has_timer("t"));

        store.save(time_based("t", 5)).unwrap();
        store.delete("t").unwrap();
        assert_eq!(store.active_timers(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_cancels_every_timer() {
        let mut store = store();
        store.save(time_based("a", 1)).unwrap();
        store.save(time_based("b", 2)).unwrap();

        store.shutdown();

        assert_eq!(store.active_timers(), 0);
        assert_eq!(store.list().len(), 2);
    }
}
