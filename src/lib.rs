//! # Storefront Cart
//!
//! Client-side cart and session state for a storefront backed by a hosted
//! commerce REST API. The backend owns inventory, pricing and order
//! processing; this crate owns the local view of "what the user intends to
//! buy": the cart mapping, its write-through persistence to a durable local
//! key-value store, derived totals, and the advisory stock guard that
//! cross-checks quantity-increasing mutations against live backend stock.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::uninlined_format_args)]

pub mod errors;
pub mod implementation;
pub mod traits;
pub mod types;

// Re-exports for public API
pub use implementation::cart_store::{Cart, CartLine, CartStore, CartTotals, CartView};
pub use implementation::catalog::HttpProductCatalog;
pub use implementation::stock_guard::{StockGuard, StockSnapshot};
pub use implementation::storage::{FileStore, MemoryStore};
pub use types::config::CartConfig;
pub use types::product::{Currency, Price, ProductId, ProductSnapshot};
pub use types::session::AuthSession;
