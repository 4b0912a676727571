//! Fan-out of alert emails to delivery channels.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::channels::email_log::EmailLogChannel;
use crate::channels::NotifyChannel;
use crate::error::ChannelError;
use crate::events::EmailMessage;

/// Set to `true` or `1` to turn off email simulation entirely.
pub const NOTIFY_DISABLED_ENV: &str = "NOTIFY_DISABLED";

/// Hands each alert email to every enabled channel.
///
/// [`dispatch`](Self::dispatch) never blocks the caller: each channel gets
/// its own task and failures only reach the log. Tasks still running are
/// awaited by [`flush`](Self::flush) and aborted when the notifier drops.
pub struct Notifier {
    channels: Vec<Arc<dyn NotifyChannel>>,
    muted: bool,
    pending: Mutex<JoinSet<()>>,
}

impl Notifier {
    /// Email log channel, unless `NOTIFY_DISABLED` is set.
    #[must_use]
    pub fn from_env() -> Self {
        let off = std::env::var(NOTIFY_DISABLED_ENV)
            .is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
        if off {
            info!("Alert emails disabled by {NOTIFY_DISABLED_ENV}");
            return Self::disabled();
        }

        let email: Arc<dyn NotifyChannel> = Arc::new(EmailLogChannel::from_env());
        let notifier = Self::with_channels(vec![email]);
        info!(
            channels = notifier.active_channels(),
            "Alert email delivery ready"
        );
        notifier
    }

    #[must_use]
    pub fn with_channels(channels: Vec<Arc<dyn NotifyChannel>>) -> Self {
        Self {
            channels,
            muted: false,
            pending: Mutex::new(JoinSet::new()),
        }
    }

    /// Notifier that drops every message.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            channels: Vec::new(),
            muted: true,
            pending: Mutex::new(JoinSet::new()),
        }
    }

    fn pending(&self) -> MutexGuard<'_, JoinSet<()>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.muted && !self.channels.is_empty()
    }

    #[must_use]
    pub fn active_channels(&self) -> usize {
        if self.muted {
            0
        } else {
            self.channels.len()
        }
    }

    /// Queue `message` on every channel and return immediately.
    ///
    /// Outside a Tokio runtime the message is logged and dropped.
    pub fn dispatch(&self, message: EmailMessage) {
        if !self.is_active() {
            debug!(alert_id = %message.alert_id, "Email delivery off, skipping");
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(
                alert_id = %message.alert_id,
                "No async runtime for email delivery, message dropped"
            );
            return;
        };

        let message = Arc::new(message);
        let mut pending = self.pending();
        while pending.try_join_next().is_some() {}

        for channel in self.channels.iter().filter(|c| c.enabled()) {
            let channel = Arc::clone(channel);
            let message = Arc::clone(&message);
            let delivery = async move {
                if let Err(e) = channel.send(&message).await {
                    error!(
                        channel = channel.name(),
                        alert_id = %message.alert_id,
                        error = %e,
                        "Alert email delivery failed"
                    );
                } else {
                    debug!(channel = channel.name(), alert_id = %message.alert_id, "Alert email delivered");
                }
            };
            pending.spawn_on(delivery, &runtime);
        }
    }

    /// Wait for every dispatched email to finish.
    ///
    /// Returns how many deliveries were awaited.
    pub async fn flush(&self) -> usize {
        let mut pending = std::mem::take(&mut *self.pending());
        let mut finished = 0;
        while let Some(joined) = pending.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Alert email task did not complete");
            }
            finished += 1;
        }
        if finished > 0 {
            debug!(deliveries = finished, "Alert email queue flushed");
        }
        finished
    }

    /// Send `message` on each enabled channel in turn and report per-channel
    /// outcomes.
    pub async fn deliver(
        &self,
        message: &EmailMessage,
    ) -> Vec<(&'static str, Result<(), ChannelError>)> {
        let mut outcomes = Vec::new();
        if !self.is_active() {
            return outcomes;
        }
        for channel in self.channels.iter().filter(|c| c.enabled()) {
            outcomes.push((channel.name(), channel.send(message).await));
        }
        outcomes
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::from_env()
    }
}
