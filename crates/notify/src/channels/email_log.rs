//! Simulated email channel.
//!
//! No transport is involved: each message is written to the log with its
//! recipients and body, which is all the dashboard needs.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::ChannelError;
use crate::events::EmailMessage;
use crate::NotifyChannel;

/// Environment variable for the sender address shown in the log.
const ENV_EMAIL_FROM: &str = "NOTIFY_EMAIL_FROM";

const DEFAULT_FROM: &str = "alerts@dashboard.local";

/// Logs alert emails instead of sending them.
pub struct EmailLogChannel {
    from: String,
}

impl EmailLogChannel {
    /// Create an email log channel with the default sender.
    #[must_use]
    pub fn new() -> Self {
        Self {
            from: DEFAULT_FROM.to_string(),
        }
    }

    /// Create an email log channel, taking the sender from `NOTIFY_EMAIL_FROM`.
    #[must_use]
    pub fn from_env() -> Self {
        let from = std::env::var(ENV_EMAIL_FROM)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FROM.to_string());
        debug!(from = %from, "Email log channel configured");
        Self { from }
    }

    /// Sender address used in the log.
    #[must_use]
    pub fn from_address(&self) -> &str {
        &self.from
    }
}

impl Default for EmailLogChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotifyChannel for EmailLogChannel {
    fn name(&self) -> &'static str {
        "email"
    }

    fn enabled(&self) -> bool {
        true
    }

    async fn send(&self, message: &EmailMessage) -> Result<(), ChannelError> {
        if message.recipients.is_empty() {
            return Err(ChannelError::NotConfigured(format!(
                "no recipients for alert {}",
                message.alert_id
            )));
        }

        info!(
            from = %self.from,
            to = %message.recipients.join(", "),
            subject = %message.subject,
            body = %message.body,
            "Simulated email dispatch"
        );
        Ok(())
    }
}
