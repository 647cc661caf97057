//! Cart service.
//!
//! Resolves the shopper's single open cart and changes line-item quantities
//! one unit at a time. Every change is delegated to one atomic store call;
//! nothing here reads a quantity and writes it back.

mod error;
mod totals;

pub use error::CartError;
pub use totals::{CartTotals, TotalLine};

use tracing::instrument;

use suds_core::{ProductId, ShopperId};

use crate::db::{CartStore, CatalogStore, LineOutcome, RepositoryError};
use crate::models::Cart;

/// How many times a cart mutation is attempted when the open cart is
/// completed underneath it.
const OPEN_CART_ATTEMPTS: usize = 2;

/// Cart operations for one request.
pub struct CartService<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> CartService<'a, S>
where
    S: CartStore + CatalogStore + ?Sized,
{
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// The shopper's open cart, created on first use.
    ///
    /// # Errors
    ///
    /// Returns `CartError::CartNotFound` if the shopper no longer exists.
    #[instrument(skip(self, shopper), fields(shopper_id = %shopper))]
    pub async fn open_cart(&self, shopper: ShopperId) -> Result<Cart, CartError> {
        self.store
            .get_or_create_open_cart(shopper)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CartError::CartNotFound,
                other => CartError::Storage(other),
            })
    }

    /// Add one unit of `product` to `cart`. Returns the new quantity.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ProductNotFound` before touching the cart if the
    /// product does not exist, and `CartError::CartClosed` if the cart has
    /// been completed.
    #[instrument(skip(self, cart, product), fields(cart_id = %cart.id, product_id = %product))]
    pub async fn add_item(&self, cart: &Cart, product: ProductId) -> Result<u32, CartError> {
        if !cart.is_open() {
            return Err(CartError::CartClosed);
        }
        if self.store.product(product).await?.is_none() {
            return Err(CartError::ProductNotFound);
        }

        match self.store.increment_line(cart.id, product).await? {
            LineOutcome::Quantity(quantity) => {
                tracing::debug!(quantity, "Line item incremented");
                Ok(quantity)
            }
            LineOutcome::ProductMissing => Err(CartError::ProductNotFound),
            LineOutcome::CartClosed => Err(CartError::CartClosed),
            LineOutcome::CartMissing => Err(CartError::CartNotFound),
            other @ (LineOutcome::Removed | LineOutcome::LineMissing) => {
                Err(CartError::unexpected(other))
            }
        }
    }

    /// Remove one unit of `product` from `cart`.
    ///
    /// Returns the remaining quantity, or `None` when the line item was
    /// removed because it reached zero.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LineItemNotFound` if the cart has no such line
    /// item, and `CartError::CartClosed` if the cart has been completed.
    #[instrument(skip(self, cart, product), fields(cart_id = %cart.id, product_id = %product))]
    pub async fn decrease_item(
        &self,
        cart: &Cart,
        product: ProductId,
    ) -> Result<Option<u32>, CartError> {
        if !cart.is_open() {
            return Err(CartError::CartClosed);
        }

        match self.store.decrement_line(cart.id, product).await? {
            LineOutcome::Quantity(quantity) => Ok(Some(quantity)),
            LineOutcome::Removed => {
                tracing::debug!("Line item removed");
                Ok(None)
            }
            LineOutcome::LineMissing => Err(CartError::LineItemNotFound),
            LineOutcome::CartClosed => Err(CartError::CartClosed),
            LineOutcome::CartMissing => Err(CartError::CartNotFound),
            other @ LineOutcome::ProductMissing => Err(CartError::unexpected(other)),
        }
    }

    /// Price every line item of `cart`.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the line items cannot be read.
    pub async fn compute_totals(&self, cart: &Cart) -> Result<CartTotals, CartError> {
        let lines = self.store.cart_lines(cart.id).await?;
        Ok(CartTotals::from_lines(lines))
    }

    /// Add one unit of `product` to the shopper's open cart.
    ///
    /// If the open cart is completed between resolving it and changing it,
    /// the add is retried once against the shopper's new open cart.
    ///
    /// # Errors
    ///
    /// See [`Self::open_cart`] and [`Self::add_item`].
    pub async fn add_to_open_cart(
        &self,
        shopper: ShopperId,
        product: ProductId,
    ) -> Result<(Cart, u32), CartError> {
        let mut attempt = 1;
        loop {
            let cart = self.open_cart(shopper).await?;
            match self.add_item(&cart, product).await {
                Ok(quantity) => return Ok((cart, quantity)),
                Err(CartError::CartClosed) if attempt < OPEN_CART_ATTEMPTS => {
                    tracing::warn!(cart_id = %cart.id, "Open cart completed mid-request, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Remove one unit of `product` from the shopper's open cart.
    ///
    /// # Errors
    ///
    /// See [`Self::open_cart`] and [`Self::decrease_item`].
    pub async fn decrease_in_open_cart(
        &self,
        shopper: ShopperId,
        product: ProductId,
    ) -> Result<(Cart, Option<u32>), CartError> {
        let cart = self.open_cart(shopper).await?;
        let remaining = self.decrease_item(&cart, product).await?;
        Ok((cart, remaining))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use suds_core::{CartStatus, Email, Money};

    use super::*;
    use crate::db::{MemoryStore, ShopperStore};
    use crate::models::{NewShopper, Product};

    async fn store_with_catalog() -> (MemoryStore, ShopperId) {
        let store = MemoryStore::new();
        for (id, cents) in [(7, 350), (8, 1_000)] {
            store
                .upsert_product(&Product {
                    id: ProductId::new(id),
                    name: format!("Soap {id}"),
                    price: Money::from_cents(cents),
                    product_type: "Bar".into(),
                    description: String::new(),
                    picture: None,
                    featured: false,
                })
                .await
                .unwrap();
        }
        let shopper = store
            .create_shopper(&NewShopper {
                first_name: "Ada".into(),
                last_name: "Lather".into(),
                email: Email::parse("ada@example.com").unwrap(),
                credential_digest: "digest".into(),
            })
            .await
            .unwrap();
        (store, shopper.id)
    }

    #[tokio::test]
    async fn test_two_adds_merge_into_one_line() {
        let (store, shopper) = store_with_catalog().await;
        let service = CartService::new(&store);

        service.add_to_open_cart(shopper, ProductId::new(7)).await.unwrap();
        let (cart, quantity) = service
            .add_to_open_cart(shopper, ProductId::new(7))
            .await
            .unwrap();
        assert_eq!(quantity, 2);

        let totals = service.compute_totals(&cart).await.unwrap();
        assert_eq!(totals.lines.len(), 1);
        assert_eq!(totals.lines[0].quantity, 2);
        assert_eq!(totals.total_price.display(), "7.00");
    }

    #[tokio::test]
    async fn test_n_adds_total_exactly() {
        let (store, shopper) = store_with_catalog().await;
        let service = CartService::new(&store);
        let cart = service.open_cart(shopper).await.unwrap();

        for _ in 0..37 {
            service.add_item(&cart, ProductId::new(7)).await.unwrap();
        }
        let totals = service.compute_totals(&cart).await.unwrap();
        assert_eq!(totals.lines[0].quantity, 37);
        assert_eq!(totals.lines[0].line_total.amount(), Decimal::new(12_950, 2));
        assert_eq!(totals.total_price, Money::from_cents(350).times(37));
    }

    #[tokio::test]
    async fn test_add_then_decrease_restores_cart() {
        let (store, shopper) = store_with_catalog().await;
        let service = CartService::new(&store);
        let cart = service.open_cart(shopper).await.unwrap();
        service.add_item(&cart, ProductId::new(8)).await.unwrap();
        let before = service.compute_totals(&cart).await.unwrap();

        service.add_item(&cart, ProductId::new(7)).await.unwrap();
        assert_eq!(service.decrease_item(&cart, ProductId::new(7)).await.unwrap(), None);

        assert_eq!(service.compute_totals(&cart).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_decrease_last_unit_then_again_is_not_found() {
        let (store, shopper) = store_with_catalog().await;
        let service = CartService::new(&store);
        let cart = service.open_cart(shopper).await.unwrap();
        service.add_item(&cart, ProductId::new(7)).await.unwrap();
        service.add_item(&cart, ProductId::new(7)).await.unwrap();

        assert_eq!(
            service.decrease_item(&cart, ProductId::new(7)).await.unwrap(),
            Some(1)
        );
        assert_eq!(service.decrease_item(&cart, ProductId::new(7)).await.unwrap(), None);
        assert!(matches!(
            service.decrease_item(&cart, ProductId::new(7)).await,
            Err(CartError::LineItemNotFound)
        ));
    }

    #[tokio::test]
    async fn test_unknown_product_is_rejected_without_mutation() {
        let (store, shopper) = store_with_catalog().await;
        let service = CartService::new(&store);
        let cart = service.open_cart(shopper).await.unwrap();

        let err = service.add_item(&cart, ProductId::new(99)).await.unwrap_err();
        assert!(matches!(err, CartError::ProductNotFound));
        assert!(err.is_not_found());
        assert!(service.compute_totals(&cart).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_closed_cart_rejects_mutation() {
        let (store, shopper) = store_with_catalog().await;
        let service = CartService::new(&store);
        let mut cart = service.open_cart(shopper).await.unwrap();
        cart.status = CartStatus::Completed;

        assert!(matches!(
            service.add_item(&cart, ProductId::new(7)).await,
            Err(CartError::CartClosed)
        ));
        assert!(matches!(
            service.decrease_item(&cart, ProductId::new(7)).await,
            Err(CartError::CartClosed)
        ));
    }

    #[tokio::test]
    async fn test_stale_open_cart_is_closed_in_storage() {
        let (store, shopper) = store_with_catalog().await;
        let service = CartService::new(&store);
        let cart = service.open_cart(shopper).await.unwrap();
        service.add_item(&cart, ProductId::new(7)).await.unwrap();
        store.complete_cart(cart.id, shopper).await.unwrap();

        // `cart` still says open; the store knows better.
        assert!(matches!(
            service.add_item(&cart, ProductId::new(7)).await,
            Err(CartError::CartClosed)
        ));
        let (fresh, quantity) = service
            .add_to_open_cart(shopper, ProductId::new(7))
            .await
            .unwrap();
        assert_ne!(fresh.id, cart.id);
        assert_eq!(quantity, 1);
    }

    #[tokio::test]
    async fn test_storage_failure_surfaces() {
        let (store, shopper) = store_with_catalog().await;
        let service = CartService::new(&store);
        let cart = service.open_cart(shopper).await.unwrap();

        store.set_fail_writes(true);
        let err = service.add_item(&cart, ProductId::new(7)).await.unwrap_err();
        assert!(matches!(err, CartError::Storage(RepositoryError::Database(_))));
        store.set_fail_writes(false);

        assert!(service.compute_totals(&cart).await.unwrap().is_empty());
    }
}
