//! Order completion and order history.
//!
//! A cart becomes an order exactly once, through [`OrderService::complete_order`].
//! Lookups answer "not found" alike for carts that do not exist, belong to
//! another shopper, or are still open.

use tracing::instrument;

use suds_core::{CartId, ShopperId};

use crate::db::{CartStore, CompleteOutcome};
use crate::models::Cart;
use crate::services::cart::{CartError, CartTotals};

/// Order operations for one request.
pub struct OrderService<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> OrderService<'a, S>
where
    S: CartStore + ?Sized,
{
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Turn the shopper's open, non-empty cart into a completed order.
    ///
    /// # Errors
    ///
    /// Returns `CartError::CartNotFound` if the cart does not exist, is not
    /// the shopper's, or was already completed. Returns `CartError::EmptyCart`
    /// if it has no line items; the cart stays open.
    #[instrument(skip(self, cart, shopper), fields(cart_id = %cart, shopper_id = %shopper))]
    pub async fn complete_order(&self, cart: CartId, shopper: ShopperId) -> Result<Cart, CartError> {
        match self.store.complete_cart(cart, shopper).await? {
            CompleteOutcome::Completed(order) => {
                tracing::info!("Order completed");
                Ok(order)
            }
            CompleteOutcome::Empty => Err(CartError::EmptyCart),
            CompleteOutcome::NotFound | CompleteOutcome::NotOpen => Err(CartError::CartNotFound),
        }
    }

    /// The shopper's completed orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the orders cannot be read.
    pub async fn past_orders(&self, shopper: ShopperId) -> Result<Vec<Cart>, CartError> {
        Ok(self.store.completed_carts(shopper).await?)
    }

    /// One completed order with its priced line items.
    ///
    /// # Errors
    ///
    /// Returns `CartError::CartNotFound` unless the cart exists, belongs to
    /// the shopper and is completed.
    #[instrument(skip(self, cart, shopper), fields(cart_id = %cart, shopper_id = %shopper))]
    pub async fn past_order(
        &self,
        cart: CartId,
        shopper: ShopperId,
    ) -> Result<(Cart, CartTotals), CartError> {
        let order = self
            .store
            .cart_for_shopper(cart, shopper)
            .await?
            .filter(|order| !order.is_open())
            .ok_or(CartError::CartNotFound)?;

        let lines = self.store.cart_lines(order.id).await?;
        Ok((order, CartTotals::from_lines(lines)))
    }
}
