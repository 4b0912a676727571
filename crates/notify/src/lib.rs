//! Alert delivery for the production-line dashboard.
//!
//! Fired alerts land in an [`AlertSink`], which keeps the dashboard's alert
//! list and unread badge, and forwards an email per alert to the
//! [`Notifier`]. Emails are simulated: the only built-in channel,
//! [`EmailLogChannel`], writes them to the log.
//!
//! ```no_run
//! use notify::{Alert, AlertSink, AlertType, Notifier};
//!
//! let sink = AlertSink::new(Notifier::from_env());
//! sink.emit(
//!     Alert::new(AlertType::Warning, "Overheat", "Station S-3 above 90"),
//!     &["ops@example.com".to_string()],
//! );
//! assert_eq!(sink.unread_count(), 1);
//! ```
//!
//! Environment:
//!
//! - `NOTIFY_DISABLED`: `true` or `1` turns email simulation off
//! - `NOTIFY_EMAIL_FROM`: sender address on simulated emails

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod channels;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod sink;

pub use channels::email_log::EmailLogChannel;
pub use channels::NotifyChannel;
pub use dispatch::Notifier;
pub use error::ChannelError;
pub use events::{Alert, AlertDetails, AlertType, EmailMessage};
pub use sink::{AlertListener, AlertSink};
