//! Cart line type definition

use serde::{Deserialize, Serialize};

use crate::types::product::{Price, ProductId, ProductSnapshot};

/// One product's entry in the shopping cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product data as of first add.
    pub snapshot:   ProductSnapshot,
    /// Quantity; always at least 1 while the line exists.
    pub quantity:   u32,
    /// Unit price at time of adding; totals use this, not the live price.
    pub unit_price: Price,
    /// When the line was added (unix seconds).
    pub added_at:   u64,
    /// When the line was last updated (unix seconds).
    pub updated_at: u64,
}

impl CartLine {
    /// Creates a line from a product snapshot, freezing its price.
    #[must_use]
    pub fn from_snapshot(snapshot: &ProductSnapshot, quantity: u32) -> Self {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self {
            snapshot:   snapshot.clone(),
            quantity,
            unit_price: snapshot.price.clone(),
            added_at:   now,
            updated_at: now,
        }
    }

    /// Product this line holds.
    #[must_use]
    pub fn product_id(&self) -> &ProductId {
        &self.snapshot.id
    }

    /// Line total in minor currency units.
    #[must_use]
    pub fn subtotal(&self) -> u64 {
        self.unit_price.amount.saturating_mul(u64::from(self.quantity))
    }

    /// Updates the quantity.
    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
        self.updated_at = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
    }
}
