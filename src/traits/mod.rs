//! External collaborator seams
//!
//! The cart store has exactly two outward dependencies: the backend product
//! catalog (one HTTP read used by the stock guard) and the durable local
//! key-value store the cart is written through to. Both are traits so tests
//! and alternative frontends can substitute their own.

use async_trait::async_trait;

use crate::errors::CartError;
use crate::types::product::ProductId;

/// Read access to the backend product catalog.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Fetches the live stock quantity for a product.
    ///
    /// `Ok(None)` means the backend does not manage stock for this product.
    /// Transport and decode failures are errors; the stock guard downgrades
    /// them to "unknown" rather than treating them as zero.
    async fn fetch_stock(&self, product_id: &ProductId) -> Result<Option<i64>, CartError>;
}

/// Durable local key-value store (the localStorage analog).
///
/// Methods take `&self`; implementations use interior mutability for
/// thread-safe access. An absent key reads as `Ok(None)` and removing an
/// absent key succeeds.
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value for a key.
    fn get(&self, key: &str) -> Result<Option<String>, CartError>;

    /// Inserts or replaces a value.
    fn set(&self, key: &str, value: &str) -> Result<(), CartError>;

    /// Removes a key.
    fn remove(&self, key: &str) -> Result<(), CartError>;
}
