//! Polling loop: regenerate products, run alert checks, report sensor trends.

use std::future::Future;
use std::sync::Arc;

use alerts::AlertingContext;
use config::DashboardSettings;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::mock::MockFeed;
use crate::sensors::{SensorBank, Trend};

/// What one polling cycle produced.
#[derive(Debug, Clone)]
pub struct CycleSummary {
    pub cycle: u64,
    pub products: usize,
    pub fired: usize,
    pub unread: usize,
    pub trends: Vec<(String, Trend)>,
}

pub struct Monitor {
    ctx: AlertingContext,
    feed: Arc<MockFeed>,
    sensors: SensorBank,
    settings: DashboardSettings,
    cycles_run: u64,
}

impl Monitor {
    pub fn new(
        ctx: AlertingContext,
        feed: Arc<MockFeed>,
        sensors: SensorBank,
        settings: DashboardSettings,
    ) -> Self {
        Self {
            ctx,
            feed,
            sensors,
            settings,
            cycles_run: 0,
        }
    }

    pub fn context(&self) -> &AlertingContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut AlertingContext {
        &mut self.ctx
    }

    /// Run one refresh: fresh products through every non-scheduled rule,
    /// then one reading per sensor.
    pub fn cycle(&mut self) -> CycleSummary {
        self.cycles_run += 1;
        let products = self.feed.next_batch();
        let fired = self.ctx.run_checks(&products);

        self.sensors.tick();
        let trends: Vec<(String, Trend)> = self
            .sensors
            .series()
            .filter_map(|series| {
                series
                    .trend(self.settings.trend_window, self.settings.trend_threshold)
                    .map(|trend| (series.name.clone(), trend))
            })
            .collect();

        for alert in &fired {
            info!(alert_id = %alert.id, title = %alert.title, "{}", alert.message);
        }
        for (sensor, trend) in &trends {
            warn!(sensor = %sensor, trend = %trend, "Sensor trend detected");
        }

        let summary = CycleSummary {
            cycle: self.cycles_run,
            products: products.len(),
            fired: fired.len(),
            unread: self.ctx.sink().unread_count(),
            trends,
        };
        debug!(
            cycle = summary.cycle,
            products = summary.products,
            fired = summary.fired,
            unread = summary.unread,
            "Polling cycle complete"
        );
        summary
    }

    /// Poll every `auto_refresh_interval_secs` until `max_cycles` is reached
    /// or `shutdown` resolves. The first cycle runs immediately.
    ///
    /// Every scheduled rule timer is stopped before returning.
    pub async fn run(
        mut self,
        max_cycles: Option<u64>,
        shutdown: impl Future<Output = ()>,
    ) -> Vec<CycleSummary> {
        let mut ticker = interval(self.settings.refresh_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut summaries = Vec::new();
        info!(
            interval_secs = self.settings.auto_refresh_interval_secs,
            timers = self.ctx.store().active_timers(),
            "Monitor started"
        );

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                _ = ticker.tick() => {
                    summaries.push(self.cycle());
                    if max_cycles.is_some_and(|max| self.cycles_run >= max) {
                        info!(cycles = self.cycles_run, "Cycle limit reached");
                        break;
                    }
                }
            }
        }

        self.ctx.shutdown();
        let emails = self.ctx.flush().await;
        info!(
            cycles = self.cycles_run,
            alerts = self.ctx.sink().alerts().len(),
            emails,
            "Monitor stopped"
        );
        summaries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use alerts::{AlertConfiguration, MonitoredField, Operator};
    use async_trait::async_trait;
    use notify::{AlertSink, ChannelError, EmailMessage, Notifier, NotifyChannel};

    #[derive(Default)]
    struct CountingChannel {
        sent: AtomicUsize,
    }

    #[async_trait]
    impl NotifyChannel for CountingChannel {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn enabled(&self) -> bool {
            true
        }

        async fn send(&self, _message: &EmailMessage) -> Result<(), ChannelError> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn catch_all() -> AlertConfiguration {
        AlertConfiguration::new("Any", MonitoredField::Temperature, Operator::GreaterOrEqual, "0")
            .with_emails(["ops@example.com"])
    }

    fn monitor(refresh_secs: u64) -> Monitor {
        monitor_with(AlertSink::default(), refresh_secs)
    }

    fn monitor_with(sink: AlertSink, refresh_secs: u64) -> Monitor {
        let feed = Arc::new(MockFeed::new(Some(42), 20));
        let ctx = AlertingContext::new(sink, feed.clone());
        let settings = DashboardSettings {
            auto_refresh_interval_secs: refresh_secs,
            ..DashboardSettings::default()
        };
        Monitor::new(ctx, feed, SensorBank::mock(Some(42), 32), settings)
    }

    #[test]
    fn test_cycle_runs_checks() {
        let mut monitor = monitor(30);
        monitor.context_mut().store_mut().save(catch_all()).unwrap();

        let summary = monitor.cycle();

        assert_eq!(summary.cycle, 1);
        assert_eq!(summary.products, 20);
        assert_eq!(summary.fired, 20);
        assert_eq!(summary.unread, 20);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_at_cycle_limit() {
        let summaries = monitor(30).run(Some(3), std::future::pending()).await;
        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[2].cycle, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_shutdown_signal() {
        let shutdown = tokio::time::sleep(std::time::Duration::from_secs(65));
        let summaries = monitor(30).run(None, shutdown).await;
        // Ticks at 0s, 30s and 60s.
        assert_eq!(summaries.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_delivers_every_email_before_returning() {
        let channel = Arc::new(CountingChannel::default());
        let shared: Arc<dyn NotifyChannel> = channel.clone();
        let mut monitor = monitor_with(AlertSink::new(Notifier::with_channels(vec![shared])), 30);
        monitor.context_mut().store_mut().save(catch_all()).unwrap();

        monitor.run(Some(1), std::future::pending()).await;

        assert_eq!(channel.sent.load(Ordering::SeqCst), 20);
    }
}
