//! Application-owned alerting state.
//!
//! Build one [`AlertingContext`] at startup and shut it down when the
//! dashboard stops; dropping it also stops every timer.

use std::sync::Arc;

use notify::{Alert, AlertSink, Notifier};

use crate::product::Product;
use crate::source::ProductSource;
use crate::store::AlertConfigStore;

/// Configuration store plus the sink it delivers to.
pub struct AlertingContext {
    sink: Arc<AlertSink>,
    store: AlertConfigStore,
}

impl AlertingContext {
    pub fn new(sink: AlertSink, source: Arc<dyn ProductSource>) -> Self {
        let sink = Arc::new(sink);
        let store = AlertConfigStore::new(Arc::clone(&sink), source);
        Self { sink, store }
    }

    /// Context whose emails go through channels configured in the environment.
    pub fn from_env(source: Arc<dyn ProductSource>) -> Self {
        Self::new(AlertSink::new(Notifier::from_env()), source)
    }

    #[must_use]
    pub fn sink(&self) -> &AlertSink {
        &self.sink
    }

    #[must_use]
    pub fn store(&self) -> &AlertConfigStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut AlertConfigStore {
        &mut self.store
    }

    /// One evaluation pass over a fresh product list.
    pub fn run_checks(&self, products: &[Product]) -> Vec<Alert> {
        self.store.check_alerts(products)
    }

    /// Stop every timer. Stored alerts and configurations remain readable.
    pub fn shutdown(&mut self) {
        self.store.shutdown();
    }

    /// Wait for simulated emails of alerts fired so far.
    pub async fn flush(&self) -> usize {
        self.sink.flush().await
    }
}
