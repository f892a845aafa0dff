//! Cart store service
//!
//! The one owner of cart state. UI event handlers call the mutation methods
//! here; nothing else writes to the cart or to its persisted copy. Every
//! successful mutation writes the whole cart through to the local store
//! before returning; rejected mutations write nothing.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::errors::CartError;
use crate::implementation::stock_guard::StockGuard;
use crate::traits::{KeyValueStore, ProductCatalog};
use crate::types::config::CartConfig;
use crate::types::product::{Price, ProductId, ProductSnapshot};

use super::cart::{Cart, CartTotals};
use super::line::CartLine;

/// UI-facing view of the cart, returned from every mutation.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CartView {
    /// Current lines; order carries no meaning.
    pub lines:         Vec<CartLine>,
    /// Derived totals.
    pub totals:        CartTotals,
    /// Total formatted with the storefront currency symbol, e.g. `"$25.50"`.
    pub display_total: String,
}

/// Client-side cart store with write-through persistence and an advisory
/// stock guard on quantity-increasing mutations.
pub struct CartStore {
    cart:    Mutex<Cart>,
    storage: Arc<dyn KeyValueStore>,
    guard:   StockGuard,
    config:  CartConfig,
}

impl CartStore {
    /// Opens the store, hydrating from the local store when a cart was
    /// persisted there, else starting empty.
    ///
    /// A corrupt or unreadable stored blob is discarded with a warning; the
    /// session starts with an empty cart rather than failing.
    #[must_use]
    pub fn open(
        storage: Arc<dyn KeyValueStore>, catalog: Arc<dyn ProductCatalog>, config: CartConfig,
    ) -> Self {
        let cart = match storage.get(&config.storage_key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(cart) => cart,
                Err(e) => {
                    warn!(error = %e, "stored cart is corrupt; starting empty");
                    Cart::new()
                },
            },
            Ok(None) => Cart::new(),
            Err(e) => {
                warn!(error = %e, "stored cart could not be read; starting empty");
                Cart::new()
            },
        };

        let guard = StockGuard::new(catalog, config.stock_freshness);

        Self { cart: Mutex::new(cart), storage, guard, config }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Cart>, CartError> {
        self.cart.lock().map_err(|_| CartError::LockError)
    }

    /// Serializes and writes the whole cart through to the local store.
    ///
    /// A failed write is a warning, not an error: the in-memory mutation has
    /// already happened and rolling it back would silently undo a visible
    /// UI change. Durability resumes on the next successful write.
    fn persist(&self, cart: &Cart) {
        let json = match serde_json::to_string(cart) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "cart serialization failed; skipping persistence write");
                return;
            },
        };

        if let Err(e) = self.storage.set(&self.config.storage_key, &json) {
            warn!(error = %e, "cart write-through failed; in-memory state kept");
        }
    }

    fn view_of(&self, cart: &Cart) -> CartView {
        let totals = CartTotals::calculate(cart, self.config.currency.clone());
        let display_total = format!(
            "{}{}",
            self.config.currency_symbol,
            totals.subtotal_price().format()
        );

        CartView { lines: cart.lines().cloned().collect(), totals, display_total }
    }

    /// Adds a product to the cart, merging into an existing line.
    ///
    /// Consults the stock guard first: known-zero stock refuses the add, a
    /// merge past the known figure is rejected with the available quantity,
    /// and unknown stock proceeds optimistically. The resulting quantity is
    /// computed against the cart as of apply time, after the fetch resolves,
    /// so interleaved mutations are never lost.
    pub async fn add_to_cart(
        &self, snapshot: &ProductSnapshot, quantity: u32,
    ) -> Result<CartView, CartError> {
        debug!(product_id = %snapshot.id, quantity, "add_to_cart");

        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        let stock = self.guard.live_stock(&snapshot.id).await;

        let mut cart = self.lock()?;
        cart.add(snapshot, quantity, stock)?;
        self.persist(&cart);
        Ok(self.view_of(&cart))
    }

    /// Sets a line's quantity exactly; 0 removes the line.
    ///
    /// The stock guard is consulted only when the target looks like an
    /// increase. The figure is re-applied against the cart at apply time, so
    /// a quantity that stopped being an increase while the fetch was in
    /// flight is still handled correctly.
    pub async fn update_quantity(
        &self, product_id: &ProductId, quantity: u32,
    ) -> Result<CartView, CartError> {
        debug!(product_id = %product_id, quantity, "update_quantity");

        if quantity == 0 {
            return self.remove_from_cart(product_id);
        }

        let may_increase = {
            let cart = self.lock()?;
            cart.get(product_id).map(|line| quantity > line.quantity).unwrap_or(false)
        };

        let stock = if may_increase {
            self.guard.live_stock(product_id).await
        } else {
            None
        };

        let mut cart = self.lock()?;
        cart.set_quantity(product_id, quantity, stock)?;
        self.persist(&cart);
        Ok(self.view_of(&cart))
    }

    /// Removes a line. Idempotent: removing an absent product is a no-op.
    pub fn remove_from_cart(&self, product_id: &ProductId) -> Result<CartView, CartError> {
        debug!(product_id = %product_id, "remove_from_cart");

        let mut cart = self.lock()?;
        if cart.remove(product_id) {
            self.persist(&cart);
        }
        Ok(self.view_of(&cart))
    }

    /// Empties the cart and drops the persisted copy.
    pub fn clear_cart(&self) -> Result<CartView, CartError> {
        debug!("clear_cart");

        let mut cart = self.lock()?;
        cart.clear();
        if let Err(e) = self.storage.remove(&self.config.storage_key) {
            warn!(error = %e, "failed to drop persisted cart");
        }
        Ok(self.view_of(&cart))
    }

    /// Sum of all line quantities.
    pub fn cart_count(&self) -> Result<u32, CartError> {
        Ok(self.lock()?.total_quantity())
    }

    /// Sum of `unit_price * quantity` over all lines, in minor units.
    pub fn cart_amount(&self) -> Result<Price, CartError> {
        let cart = self.lock()?;
        Ok(CartTotals::calculate(&cart, self.config.currency.clone()).subtotal_price())
    }

    /// Current line for a product.
    pub fn line(&self, product_id: &ProductId) -> Result<Option<CartLine>, CartError> {
        Ok(self.lock()?.get(product_id).cloned())
    }

    /// Current UI view of the cart.
    pub fn view(&self) -> Result<CartView, CartError> {
        let cart = self.lock()?;
        Ok(self.view_of(&cart))
    }

    /// The stock guard, for callers that want to warm or inspect the
    /// snapshot cache.
    #[must_use]
    pub fn stock_guard(&self) -> &StockGuard {
        &self.guard
    }
}

impl fmt::Debug for CartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
