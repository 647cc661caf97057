//! Cart and line item types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use suds_core::{CartId, CartStatus, Money, ProductId, ShopperId};

/// A cart: the shopper's open selection, or a completed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cart {
    pub id: CartId,
    /// Owner; `None` once the owning account has been deleted.
    pub shopper_id: Option<ShopperId>,
    pub status: CartStatus,
    pub created_at: DateTime<Utc>,
    /// Set exactly once, by order completion.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Cart {
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.status.is_open()
    }

    /// Whether `shopper` owns this cart.
    #[must_use]
    pub fn is_owned_by(&self, shopper: ShopperId) -> bool {
        self.shopper_id == Some(shopper)
    }
}

/// A line item joined with its product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    /// Always at least 1.
    pub quantity: u32,
}

impl CartLine {
    /// `unit_price * quantity` at full precision.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}
