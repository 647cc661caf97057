//! Storage for the storefront.
//!
//! # Database: `suds`
//!
//! ## Tables (schema `storefront`)
//!
//! - `shopper` - Registered shoppers and their credential digests
//! - `product` - Catalog entries
//! - `cart` - Open carts and completed orders; at most one open cart per shopper
//! - `line_item` - `(cart_id, product_id) -> quantity`, quantity always >= 1
//! - `contact_request` - Append-only support submissions
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p suds-cli -- migrate
//! ```
//!
//! # Stores
//!
//! Handlers and services only see the [`Store`] traits. [`PgStore`] is the
//! production implementation; `MemoryStore` (tests and the `memory-store`
//! feature) keeps everything behind one lock.

mod carts;
mod catalog;
mod contact;
#[cfg(any(test, feature = "memory-store"))]
mod memory;
mod shoppers;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use suds_core::{CartId, Email, ProductId, ShopperId};

use crate::models::{Cart, CartLine, ContactRequest, NewContactRequest, NewShopper, Product, Shopper};
use crate::search::SearchQuery;

#[cfg(any(test, feature = "memory-store"))]
pub use memory::MemoryStore;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Result of a single line-item mutation.
///
/// The storage layer reports why a mutation did not happen instead of
/// failing, so the caller can map each case to its own error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// The line item now has this quantity.
    Quantity(u32),
    /// The last unit was removed, so the line item is gone.
    Removed,
    /// No such cart.
    CartMissing,
    /// The cart is no longer open.
    CartClosed,
    /// No such product.
    ProductMissing,
    /// The cart has no line item for that product.
    LineMissing,
}

/// Result of an attempted `open -> completed` transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompleteOutcome {
    /// The cart is now a completed order.
    Completed(Cart),
    /// No such cart for this shopper.
    NotFound,
    /// The cart exists but was already completed.
    NotOpen,
    /// The cart is open but has no line items.
    Empty,
}

/// Shopper accounts.
#[async_trait]
pub trait ShopperStore: Send + Sync {
    /// Insert a shopper. Fails with [`RepositoryError::Conflict`] when the
    /// email is already registered.
    async fn create_shopper(&self, shopper: &NewShopper) -> Result<Shopper, RepositoryError>;

    async fn shopper_by_id(&self, id: ShopperId) -> Result<Option<Shopper>, RepositoryError>;

    /// Look up a shopper and their stored credential digest.
    async fn credentials_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(Shopper, String)>, RepositoryError>;

    /// Delete a shopper in one atomic step: their open cart and its line
    /// items go, completed carts are kept with the owner cleared.
    ///
    /// Fails with [`RepositoryError::NotFound`] if the shopper does not exist.
    async fn delete_shopper(&self, id: ShopperId) -> Result<(), RepositoryError>;
}

/// Read access to the catalog, plus upsert for seeding.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Products matching `query`, in the query's sort order.
    async fn search_products(&self, query: &SearchQuery) -> Result<Vec<Product>, RepositoryError>;

    async fn upsert_product(&self, product: &Product) -> Result<(), RepositoryError>;
}

/// Carts and line items.
///
/// Every method is one atomic unit against storage.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// The shopper's open cart, created if there is none.
    ///
    /// Concurrent callers for the same shopper all receive the same cart.
    /// Fails with [`RepositoryError::NotFound`] if the shopper does not exist.
    async fn get_or_create_open_cart(&self, shopper: ShopperId) -> Result<Cart, RepositoryError>;

    /// The shopper's open cart, if any. Never creates one.
    async fn find_open_cart(&self, shopper: ShopperId) -> Result<Option<Cart>, RepositoryError>;

    /// A cart, but only if `shopper` owns it.
    async fn cart_for_shopper(
        &self,
        cart: CartId,
        shopper: ShopperId,
    ) -> Result<Option<Cart>, RepositoryError>;

    /// Add one unit of `product`, inserting the line item at quantity 1 if
    /// absent. Only acts on open carts.
    async fn increment_line(
        &self,
        cart: CartId,
        product: ProductId,
    ) -> Result<LineOutcome, RepositoryError>;

    /// Remove one unit of `product`, deleting the line item when it reaches
    /// zero. Only acts on open carts.
    async fn decrement_line(
        &self,
        cart: CartId,
        product: ProductId,
    ) -> Result<LineOutcome, RepositoryError>;

    /// Line items joined with their products, ordered by product ID.
    async fn cart_lines(&self, cart: CartId) -> Result<Vec<CartLine>, RepositoryError>;

    /// Flip an owned, open, non-empty cart to completed. The status is
    /// re-checked in the same atomic step that changes it.
    async fn complete_cart(
        &self,
        cart: CartId,
        shopper: ShopperId,
    ) -> Result<CompleteOutcome, RepositoryError>;

    /// The shopper's completed carts, newest first.
    async fn completed_carts(&self, shopper: ShopperId) -> Result<Vec<Cart>, RepositoryError>;
}

/// Support submissions.
#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn insert_contact_request(
        &self,
        request: &NewContactRequest,
    ) -> Result<ContactRequest, RepositoryError>;
}

/// Everything the storefront needs from storage.
#[async_trait]
pub trait Store: ShopperStore + CatalogStore + CartStore + ContactStore {
    /// Readiness probe.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// `PostgreSQL`-backed store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Map unique violations to [`RepositoryError::Conflict`] and foreign-key
/// violations to [`RepositoryError::NotFound`].
fn map_constraint(e: sqlx::Error, conflict: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(conflict.to_owned());
        }
        if db_err.is_foreign_key_violation() {
            return RepositoryError::NotFound;
        }
    }
    RepositoryError::Database(e)
}

/// Convert a stored quantity, rejecting values the schema forbids.
fn quantity_from_db(quantity: i32) -> Result<u32, RepositoryError> {
    u32::try_from(quantity)
        .ok()
        .filter(|q| *q >= 1)
        .ok_or_else(|| RepositoryError::DataCorruption(format!("invalid quantity {quantity}")))
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
