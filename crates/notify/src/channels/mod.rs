//! Places an alert email can be delivered to.

pub mod email_log;

use async_trait::async_trait;

use crate::error::ChannelError;
use crate::events::EmailMessage;

#[async_trait]
pub trait NotifyChannel: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    /// Disabled channels are skipped without an error.
    fn enabled(&self) -> bool;

    async fn send(&self, message: &EmailMessage) -> Result<(), ChannelError>;
}
