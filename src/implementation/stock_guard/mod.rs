//! Advisory stock guard
//!
//! Fetches a live stock figure immediately before a quantity-increasing cart
//! mutation. The check is best-effort and racy by design: it exists to stop
//! obviously futile cart growth, not to guarantee availability — the backend
//! is the final arbiter at order time. A failed fetch therefore reads as
//! "unknown" (never zero), and unknown lets the mutation proceed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::traits::ProductCatalog;
use crate::types::product::ProductId;

/// A stock figure with the moment it was fetched.
#[derive(Debug, Clone, Copy)]
pub struct StockLevel {
    /// Last-known available quantity.
    pub quantity:   i64,
    /// When the figure was fetched.
    pub fetched_at: Instant,
}

/// Weakly-consistent cache of last-known stock per product.
///
/// Carries no durability guarantee and is safe to discard at any time;
/// entries older than the freshness window are dropped on read.
#[derive(Debug)]
pub struct StockSnapshot {
    levels:    Mutex<HashMap<ProductId, StockLevel>>,
    freshness: Duration,
}

impl StockSnapshot {
    /// Creates an empty snapshot with the given freshness window.
    #[must_use]
    pub fn new(freshness: Duration) -> Self {
        Self { levels: Mutex::new(HashMap::new()), freshness }
    }

    /// Records a freshly fetched figure.
    pub fn record(&self, product_id: &ProductId, quantity: i64) {
        if let Ok(mut levels) = self.levels.lock() {
            levels.insert(
                product_id.clone(),
                StockLevel { quantity, fetched_at: Instant::now() },
            );
        }
    }

    /// Drops the entry for a product.
    pub fn forget(&self, product_id: &ProductId) {
        if let Ok(mut levels) = self.levels.lock() {
            levels.remove(product_id);
        }
    }

    /// Last-known figure for a product, if still within the freshness
    /// window. Stale entries are evicted.
    #[must_use]
    pub fn last_known(&self, product_id: &ProductId) -> Option<i64> {
        let mut levels = self.levels.lock().ok()?;
        match levels.get(product_id) {
            Some(level) if level.fetched_at.elapsed() < self.freshness => Some(level.quantity),
            Some(_) => {
                levels.remove(product_id);
                None
            },
            None => None,
        }
    }

    /// Discards every cached figure.
    pub fn clear(&self) {
        if let Ok(mut levels) = self.levels.lock() {
            levels.clear();
        }
    }
}

/// Pre-mutation stock check against the backend catalog.
pub struct StockGuard {
    catalog:  Arc<dyn ProductCatalog>,
    snapshot: StockSnapshot,
}

impl std::fmt::Debug for StockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StockGuard")
            .field("snapshot", &self.snapshot)
            .finish_non_exhaustive()
    }
}

impl StockGuard {
    /// Creates a guard over a catalog.
    #[must_use]
    pub fn new(catalog: Arc<dyn ProductCatalog>, freshness: Duration) -> Self {
        Self { catalog, snapshot: StockSnapshot::new(freshness) }
    }

    /// Live stock for a product, `None` when unknown.
    ///
    /// A successful fetch refreshes the snapshot. On failure a still-fresh
    /// snapshot entry serves as last-known; otherwise the result is unknown
    /// and the caller proceeds optimistically.
    pub async fn live_stock(&self, product_id: &ProductId) -> Option<i64> {
        match self.catalog.fetch_stock(product_id).await {
            Ok(Some(quantity)) => {
                debug!(product_id = %product_id, quantity, "live stock fetched");
                self.snapshot.record(product_id, quantity);
                Some(quantity)
            },
            Ok(None) => {
                // backend stopped managing stock; an old figure would mislead
                self.snapshot.forget(product_id);
                None
            },
            Err(e) => {
                let cached = self.snapshot.last_known(product_id);
                warn!(
                    product_id = %product_id,
                    error = %e,
                    cached = ?cached,
                    "stock fetch failed; treating as unknown"
                );
                cached
            },
        }
    }

    /// Read-only view of the snapshot cache.
    #[must_use]
    pub fn snapshot(&self) -> &StockSnapshot {
        &self.snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CartError;
    use async_trait::async_trait;

    struct StubCatalog {
        response: Result<Option<i64>, CartError>,
    }

    #[async_trait]
    impl ProductCatalog for StubCatalog {
        async fn fetch_stock(&self, _product_id: &ProductId) -> Result<Option<i64>, CartError> {
            self.response.clone()
        }
    }

    fn guard(response: Result<Option<i64>, CartError>) -> StockGuard {
        StockGuard::new(
            Arc::new(StubCatalog { response }),
            Duration::from_secs(60),
        )
    }

    #[tokio::test]
    async fn test_successful_fetch_records_snapshot() {
        let guard = guard(Ok(Some(5)));
        let id = ProductId::new("1");

        assert_eq!(guard.live_stock(&id).await, Some(5));
        assert_eq!(guard.snapshot().last_known(&id), Some(5));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_unknown_not_zero() {
        let guard = guard(Err(CartError::Catalog("connection refused".to_string())));
        let id = ProductId::new("1");

        assert_eq!(guard.live_stock(&id).await, None);
    }

    #[tokio::test]
    async fn test_fetch_failure_falls_back_to_fresh_snapshot() {
        let guard = guard(Err(CartError::Catalog("timeout".to_string())));
        let id = ProductId::new("1");

        guard.snapshot().record(&id, 3);
        assert_eq!(guard.live_stock(&id).await, Some(3));
    }

    #[tokio::test]
    async fn test_unmanaged_stock_clears_snapshot() {
        let guard = guard(Ok(None));
        let id = ProductId::new("1");

        guard.snapshot().record(&id, 3);
        assert_eq!(guard.live_stock(&id).await, None);
        assert_eq!(guard.snapshot().last_known(&id), None);
    }

    #[test]
    fn test_stale_snapshot_entries_evict() {
        let snapshot = StockSnapshot::new(Duration::ZERO);
        let id = ProductId::new("1");

        snapshot.record(&id, 9);
        // zero freshness: anything recorded is already stale
        assert_eq!(snapshot.last_known(&id), None);
    }

    #[test]
    fn test_clear_discards_everything() {
        let snapshot = StockSnapshot::new(Duration::from_secs(60));
        snapshot.record(&ProductId::new("1"), 2);
        snapshot.record(&ProductId::new("2"), 4);

        snapshot.clear();
        assert_eq!(snapshot.last_known(&ProductId::new("1")), None);
    }
}
