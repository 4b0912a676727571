//! Recurring checks keyed by configuration id.
//!
//! At most one task exists per id: arming an id aborts whatever was armed
//! under it before spawning the replacement. Dropping the scheduler aborts
//! every task.

use std::collections::HashMap;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// Owns the periodic tasks of time-based configurations.
#[derive(Default)]
pub struct Scheduler {
    tasks: HashMap<String, JoinHandle<()>>,
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `tick` every `period`, first one `period` from now.
    ///
    /// Returns `false`, arming nothing, for a zero period, a period too long
    /// to schedule, or when called outside a Tokio runtime. Any previous task
    /// under `id` is cancelled either way.
    pub fn arm<F>(&mut self, id: &str, period: Duration, mut tick: F) -> bool
    where
        F: FnMut() + Send + 'static,
    {
        self.cancel(id);

        if period.is_zero() {
            warn!(config_id = %id, "Refusing to schedule a zero-length interval");
            return false;
        }

        let Some(first) = Instant::now().checked_add(period) else {
            warn!(config_id = %id, period_secs = period.as_secs(), "Interval out of range, timer not armed");
            return false;
        };

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(config_id = %id, "No async runtime available, timer not armed");
            return false;
        };

        let handle = runtime.spawn(async move {
            let mut interval = interval_at(first, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                tick();
            }
        });

        debug!(config_id = %id, period_secs = period.as_secs(), "Timer armed");
        self.tasks.insert(id.to_string(), handle);
        true
    }

    /// Abort the task armed under `id`, if any.
    pub fn cancel(&mut self, id: &str) -> bool {
        match self.tasks.remove(id) {
            Some(handle) => {
                handle.abort();
                debug!(config_id = %id, "Timer cancelled");
                true
            }
            None => false,
        }
    }

    /// Abort every task.
    pub fn cancel_all(&mut self) {
        for (id, handle) in self.tasks.drain() {
            handle.abort();
            debug!(config_id = %id, "Timer cancelled");
        }
    }

    #[must_use]
    pub fn is_armed(&self, id: &str) -> bool {
        self.tasks.contains_key(id)
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.tasks.len()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        for handle in self.tasks.values() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::time::sleep;

    fn counter() -> (Arc<AtomicUsize>, impl FnMut() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&count);
        (count, move || {
            inner.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_after_one_period() {
        let mut scheduler = Scheduler::new();
        let (count, tick) = counter();

        assert!(scheduler.arm("cfg", Duration::from_secs(60), tick));

        sleep(Duration::from_secs(59)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        sleep(Duration::from_secs(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        sleep(Duration::from_secs(120)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_replaces_previous_task() {
        let mut scheduler = Scheduler::new();
        let (old_count, old_tick) = counter();
        let (new_count, new_tick) = counter();

        scheduler.arm("cfg", Duration::from_secs(60), old_tick);
        scheduler.arm("cfg", Duration::from_secs(300), new_tick);
        assert_eq!(scheduler.active_count(), 1);

        sleep(Duration::from_secs(301)).await;
        assert_eq!(old_count.load(Ordering::SeqCst), 0);
        assert_eq!(new_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_ticks() {
        let mut scheduler = Scheduler::new();
        let (count, tick) = counter();
        scheduler.arm("cfg", Duration::from_secs(60), tick);

        sleep(Duration::from_secs(61)).await;
        assert!(scheduler.cancel("cfg"));
        assert!(!scheduler.cancel("cfg"));
        sleep(Duration::from_secs(600)).await;

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!scheduler.is_armed("cfg"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all_and_drop() {
        let mut scheduler = Scheduler::new();
        let (a, tick_a) = counter();
        let (b, tick_b) = counter();
        scheduler.arm("a", Duration::from_secs(60), tick_a);
        scheduler.arm("b", Duration::from_secs(60), tick_b);

        scheduler.cancel_all();
        assert_eq!(scheduler.active_count(), 0);

        let (c, tick_c) = counter();
        scheduler.arm("c", Duration::from_secs(60), tick_c);
        drop(scheduler);

        sleep(Duration::from_secs(600)).await;
        assert_eq!(a.load(Ordering::SeqCst), 0);
        assert_eq!(b.load(Ordering::SeqCst), 0);
        assert_eq!(c.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_arm_outside_runtime_is_rejected() {
        let mut scheduler = Scheduler::new();
        let (_count, tick) = counter();
        assert!(!scheduler.arm("cfg", Duration::from_secs(60), tick));
        assert!(!scheduler.is_armed("cfg"));
    }

    #[tokio::test]
    async fn test_zero_period_is_rejected() {
        let mut scheduler = Scheduler::new();
        let (_count, tick) = counter();
        assert!(!scheduler.arm("cfg", Duration::ZERO, tick));
        assert_eq!(scheduler.active_count(), 0);
    }

    #[tokio::test]
    async fn test_unschedulable_period_is_rejected() {
        let mut scheduler = Scheduler::new();
        let (_count, tick) = counter();
        assert!(!scheduler.arm("cfg", Duration::MAX, tick));
        assert!(!scheduler.is_armed("cfg"));
    }
}
