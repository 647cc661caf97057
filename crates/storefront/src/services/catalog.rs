//! Catalog search for anonymous and signed-in shoppers.

use std::collections::HashMap;

use serde::Serialize;
use tracing::instrument;

use suds_core::{ProductId, ShopperId};

use crate::db::{CartStore, CatalogStore, RepositoryError};
use crate::models::Product;
use crate::search::SearchQuery;

/// A search result with the shopper's open-cart quantity for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub product: Product,
    /// Units of this product in the shopper's open cart; 0 when anonymous.
    pub in_cart: u32,
}

/// Catalog operations for one request.
pub struct CatalogService<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> CatalogService<'a, S>
where
    S: CatalogStore + CartStore + ?Sized,
{
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Run `query`, annotating each hit with the shopper's open-cart quantity.
    ///
    /// Read-only: a shopper without an open cart does not get one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the catalog or cart cannot be read.
    #[instrument(skip(self, shopper), fields(term = %query.term, sort = query.sort.as_str()))]
    pub async fn search(
        &self,
        query: &SearchQuery,
        shopper: Option<ShopperId>,
    ) -> Result<Vec<SearchHit>, RepositoryError> {
        let products = self.store.search_products(query).await?;
        let in_cart = match shopper {
            Some(shopper) => self.in_cart_quantities(shopper).await?,
            None => HashMap::new(),
        };

        tracing::debug!(hits = products.len(), "Catalog search");
        Ok(products
            .into_iter()
            .map(|product| SearchHit {
                in_cart: in_cart.get(&product.id).copied().unwrap_or(0),
                product,
            })
            .collect())
    }

    async fn in_cart_quantities(
        &self,
        shopper: ShopperId,
    ) -> Result<HashMap<ProductId, u32>, RepositoryError> {
        let Some(cart) = self.store.find_open_cart(shopper).await? else {
            return Ok(HashMap::new());
        };
        let lines = self.store.cart_lines(cart.id).await?;
        Ok(lines
            .into_iter()
            .map(|line| (line.product_id, line.quantity))
            .collect())
    }
}
