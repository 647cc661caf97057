//! Cart and order error types.

use thiserror::Error;

use crate::db::{LineOutcome, RepositoryError};

/// Errors from cart and order operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The referenced product does not exist.
    #[error("product not found")]
    ProductNotFound,

    /// The cart has no line item for the product.
    #[error("line item not found")]
    LineItemNotFound,

    /// The cart does not exist or belongs to someone else.
    #[error("cart not found")]
    CartNotFound,

    /// Completion was attempted on a cart with no line items.
    #[error("cart is empty")]
    EmptyCart,

    /// A mutation reached a completed cart.
    #[error("cart is closed")]
    CartClosed,

    /// Repository/database error.
    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

impl CartError {
    /// Whether the caller should see a plain "not found".
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ProductNotFound
                | Self::LineItemNotFound
                | Self::CartNotFound
                | Self::Storage(RepositoryError::NotFound)
        )
    }

    /// A storage outcome that the calling operation cannot produce.
    pub(crate) fn unexpected(outcome: LineOutcome) -> Self {
        Self::Storage(RepositoryError::DataCorruption(format!(
            "unexpected line item outcome: {outcome:?}"
        )))
    }
}
