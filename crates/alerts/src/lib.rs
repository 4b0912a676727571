//! Alert rule engine for production-line monitoring.
//!
//! Users define [`AlertConfiguration`]s that watch one product attribute,
//! optionally scoped to a plant, line, station, program or part. Each
//! configuration runs in one of three modes:
//!
//! - per product: one alert per matching product
//! - aggregated: one alert when count, percentage, average, min or max over
//!   the scoped products reaches a threshold
//! - time based: the aggregated check, re-run on its own timer
//!
//! Fired alerts go to a [`notify::AlertSink`]. Muted configurations still
//! count triggers but never reach the sink.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use alerts::{AlertConfiguration, AlertingContext, MonitoredField, Operator, StaticSnapshot};
//!
//! # async fn run(products: Vec<alerts::Product>) -> Result<(), alerts::StoreError> {
//! let mut ctx = AlertingContext::from_env(Arc::new(StaticSnapshot::default()));
//! ctx.store_mut().save(
//!     AlertConfiguration::new("Overheat", MonitoredField::Temperature, Operator::Greater, "90")
//!         .with_emails(["ops@example.com"]),
//! )?;
//!
//! let fired = ctx.run_checks(&products);
//! println!("{} alerts", fired.len());
//! ctx.shutdown();
//! # Ok(())
//! # }
//! ```

pub mod condition;
pub mod configuration;
pub mod context;
pub mod error;
pub mod filter;
pub mod product;
pub mod scheduler;
pub mod source;
pub mod store;
pub mod strategy;

pub use condition::{evaluate, Condition, Operator};
pub use configuration::{AggregationType, AlertConfiguration, EvaluationMode};
pub use context::AlertingContext;
pub use error::{StoreError, ValidationError};
pub use filter::{filter_products, ScopeFilter};
pub use product::{FieldValue, MonitoredField, Product};
pub use scheduler::Scheduler;
pub use source::{ProductSource, StaticSnapshot};
pub use store::AlertConfigStore;
