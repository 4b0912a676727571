//! Process-wide alert inbox.
//!
//! The sink owns the list shown on the alert banner and the unread counter
//! shown on the notification badge. Every emitted alert also goes out as a
//! simulated email through the [`Notifier`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::events::{Alert, EmailMessage};
use crate::Notifier;

/// Callback that takes over delivery of fired alerts.
pub type AlertListener = Arc<dyn Fn(Alert) + Send + Sync>;

/// Receives fired alerts.
pub struct AlertSink {
    alerts: Mutex<Vec<Alert>>,
    unread: AtomicUsize,
    notifier: Notifier,
    listener: Option<AlertListener>,
}

impl AlertSink {
    /// Create a sink that stores alerts and dispatches emails via `notifier`.
    #[must_use]
    pub fn new(notifier: Notifier) -> Self {
        Self {
            alerts: Mutex::new(Vec::new()),
            unread: AtomicUsize::new(0),
            notifier,
            listener: None,
        }
    }

    /// Route alerts to `listener` instead of the shared list.
    ///
    /// With a listener installed the list and the unread counter are left
    /// untouched; email dispatch still happens.
    #[must_use]
    pub fn with_listener(mut self, listener: AlertListener) -> Self {
        self.listener = Some(listener);
        self
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Alert>> {
        self.alerts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deliver a fired alert and simulate the email to `recipients`.
    pub fn emit(&self, alert: Alert, recipients: &[String]) {
        self.notifier
            .dispatch(EmailMessage::for_alert(&alert, recipients));

        if let Some(listener) = &self.listener {
            listener(alert);
            return;
        }

        debug!(alert_id = %alert.id, title = %alert.title, "Alert recorded");
        self.lock().push(alert);
        self.unread.fetch_add(1, Ordering::SeqCst);
    }

    /// Remove one alert by id. The unread counter is not affected.
    pub fn dismiss(&self, id: &str) -> bool {
        let mut alerts = self.lock();
        let before = alerts.len();
        alerts.retain(|a| a.id != id);
        alerts.len() != before
    }

    /// Zero the unread counter (the inbox was viewed).
    pub fn reset_notification_count(&self) {
        self.unread.store(0, Ordering::SeqCst);
    }

    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.unread.load(Ordering::SeqCst)
    }

    /// Snapshot of the current alert list, oldest first.
    #[must_use]
    pub fn alerts(&self) -> Vec<Alert> {
        self.lock().clone()
    }

    /// Wait until every email dispatched so far has been handed to its
    /// channels. Returns how many deliveries were awaited.
    pub async fn flush(&self) -> usize {
        self.notifier.flush().await
    }
}

impl Default for AlertSink {
    fn default() -> Self {
        Self::new(Notifier::disabled())
    }
}
