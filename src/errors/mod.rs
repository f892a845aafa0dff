//! Error types for the storefront cart

use thiserror::Error;

/// Errors surfaced by cart, storage and catalog operations.
///
/// Stock rejections are advisory outcomes for the UI to display; none of the
/// variants leave the cart in a partially mutated state.
#[derive(Debug, Clone, Error)]
pub enum CartError {
    /// Live stock figure is known and zero or below.
    #[error("product {product_id} is out of stock")]
    StockUnavailable {
        /// Product ID.
        product_id: String,
    },
    /// Requested resulting quantity exceeds the known stock figure.
    #[error("insufficient stock for {product_id}: available {available}, requested {requested}")]
    StockInsufficient {
        /// Product ID.
        product_id: String,
        /// Last-known available quantity.
        available:  i64,
        /// Quantity the cart would have held.
        requested:  u32,
    },
    /// Zero quantity passed to an add.
    #[error("invalid quantity")]
    InvalidQuantity,
    /// Quantity update addressed to a product that is not in the cart.
    #[error("item not in cart: {0}")]
    ItemNotInCart(String),
    /// Cart state lock failed.
    #[error("failed to acquire cart lock")]
    LockError,
    /// Durable local store read or write failed.
    #[error("persistence error: {0}")]
    Persistence(String),
    /// Catalog request or response decode failed.
    #[error("catalog error: {0}")]
    Catalog(String),
    /// Cart blob could not be serialized or parsed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for cart operations.
pub type CartResult<T> = Result<T, CartError>;
