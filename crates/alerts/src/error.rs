//! Error types for configuration management.

use thiserror::Error;

use crate::condition::Operator;

/// Rejected configuration input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("configuration name is required")]
    MissingName,

    #[error("a comparison value is required")]
    MissingValue,

    #[error("operator '{0}' requires a second value")]
    MissingSecondValue(Operator),

    #[error("unknown operator")]
    UnknownOperator,

    #[error("at least one notification email is required")]
    MissingRecipients,

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("aggregation threshold must be a non-negative number, got {0}")]
    InvalidThreshold(f64),

    #[error("time interval must be at least one minute")]
    InvalidInterval,

    #[error("time interval of {0} minutes exceeds the 30 day maximum")]
    IntervalTooLong(u64),
}

/// Errors returned by the configuration store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("alert configuration not found: {0}")]
    NotFound(String),

    #[error("invalid alert configuration: {0}")]
    Invalid(#[from] ValidationError),
}
