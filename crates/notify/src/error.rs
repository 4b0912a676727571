//! Delivery failures.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChannelError {
    /// The channel cannot deliver this message as addressed.
    #[error("cannot deliver alert email: {0}")]
    NotConfigured(String),
}
