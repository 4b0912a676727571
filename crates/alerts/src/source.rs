//! Product snapshots for timer-driven checks.

use std::sync::{Mutex, PoisonError};

use crate::product::Product;

/// Supplies the products a time-based check evaluates at tick time.
pub trait ProductSource: Send + Sync {
    fn snapshot(&self) -> Vec<Product>;
}

/// A fixed snapshot that can be replaced between ticks.
#[derive(Default)]
pub struct StaticSnapshot {
    products: Mutex<Vec<Product>>,
}

impl StaticSnapshot {
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products: Mutex::new(products),
        }
    }

    /// Swap in a new snapshot for subsequent ticks.
    pub fn replace(&self, products: Vec<Product>) {
        *self.products.lock().unwrap_or_else(PoisonError::into_inner) = products;
    }
}

impl ProductSource for StaticSnapshot {
    fn snapshot(&self) -> Vec<Product> {
        self.products
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<F> ProductSource for F
where
    F: Fn() -> Vec<Product> + Send + Sync,
{
    fn snapshot(&self) -> Vec<Product> {
        self()
    }
}
