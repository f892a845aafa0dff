//! Shopping cart mapping and totals

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::CartError;
use crate::types::product::{Currency, Price, ProductId, ProductSnapshot};

use super::line::CartLine;

/// Cart price totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CartTotals {
    /// Sum of line totals in minor currency units.
    pub subtotal:   u64,
    /// Total quantity across all lines.
    pub item_count: u32,
    /// Currency.
    pub currency:   Currency,
}

impl CartTotals {
    /// Calculates totals for a cart.
    #[must_use]
    pub fn calculate(cart: &Cart, currency: Currency) -> Self {
        let subtotal = cart
            .lines()
            .fold(0u64, |acc, line| acc.saturating_add(line.subtotal()));

        Self { subtotal, item_count: cart.total_quantity(), currency }
    }

    /// Subtotal as a price value.
    #[must_use]
    pub fn subtotal_price(&self) -> Price {
        Price::new(self.subtotal, self.currency.clone(), 2)
    }
}

/// Shopping cart: canonical product id mapped to its line.
///
/// Serializes as a flat JSON object keyed by product id, the same shape the
/// browser frontend kept under its single localStorage key. Iteration order
/// carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: HashMap<ProductId, CartLine>,
}

impl Cart {
    /// Creates an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn unique_line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total quantity across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.lines.values().map(|line| line.quantity).sum()
    }

    /// Line for a product, if present.
    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.get(product_id)
    }

    /// Iterates over all lines.
    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.values()
    }

    /// Adds a product, merging into an existing line.
    ///
    /// `known_stock` is the guard's last-known figure; `None` means unknown
    /// and the add proceeds optimistically. A known figure of zero refuses
    /// the add outright; a merge that would exceed a known figure is
    /// rejected with the available quantity and leaves the cart unchanged.
    pub fn add(
        &mut self, snapshot: &ProductSnapshot, quantity: u32, known_stock: Option<i64>,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        if let Some(stock) = known_stock {
            if stock <= 0 {
                return Err(CartError::StockUnavailable {
                    product_id: snapshot.id.to_string(),
                });
            }
        }

        let current = self.lines.get(&snapshot.id).map(|line| line.quantity).unwrap_or(0);
        let new_quantity = current.saturating_add(quantity);

        if let Some(stock) = known_stock {
            if i64::from(new_quantity) > stock {
                return Err(CartError::StockInsufficient {
                    product_id: snapshot.id.to_string(),
                    available:  stock,
                    requested:  new_quantity,
                });
            }
        }

        match self.lines.get_mut(&snapshot.id) {
            Some(line) => line.set_quantity(new_quantity),
            None => {
                self.lines
                    .insert(snapshot.id.clone(), CartLine::from_snapshot(snapshot, quantity));
            },
        }

        Ok(())
    }

    /// Sets a line's quantity exactly (not additive).
    ///
    /// Quantity 0 removes the line. Only an increase is checked against
    /// `known_stock`; decreases always apply, even past a known figure.
    pub fn set_quantity(
        &mut self, product_id: &ProductId, quantity: u32, known_stock: Option<i64>,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            self.remove(product_id);
            return Ok(());
        }

        let line = self
            .lines
            .get_mut(product_id)
            .ok_or_else(|| CartError::ItemNotInCart(product_id.to_string()))?;

        if quantity > line.quantity {
            if let Some(stock) = known_stock {
                if i64::from(quantity) > stock {
                    return Err(CartError::StockInsufficient {
                        product_id: product_id.to_string(),
                        available:  stock,
                        requested:  quantity,
                    });
                }
            }
        }

        line.set_quantity(quantity);
        Ok(())
    }

    /// Removes a line. Returns whether anything was removed.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        self.lines.remove(product_id).is_some()
    }

    /// Removes every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
