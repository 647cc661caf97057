//! In-memory store for tests and local demos.
//!
//! All state sits behind one `tokio::sync::Mutex`, so each trait method runs
//! as a single atomic step, matching the transactions in [`PgStore`].
//!
//! [`PgStore`]: super::PgStore

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use suds_core::{CartId, CartStatus, ContactRequestId, Email, ProductId, ShopperId};

use super::{
    CartStore, CatalogStore, CompleteOutcome, ContactStore, LineOutcome, RepositoryError,
    ShopperStore, Store,
};
use crate::models::{
    Cart, CartLine, ContactRequest, NewContactRequest, NewShopper, Product, Shopper,
};
use crate::search::SearchQuery;

#[derive(Default)]
struct State {
    shoppers: BTreeMap<ShopperId, (Shopper, String)>,
    products: BTreeMap<ProductId, Product>,
    carts: BTreeMap<CartId, Cart>,
    lines: BTreeMap<(CartId, ProductId), u32>,
    contact_requests: Vec<ContactRequest>,
    next_shopper: i32,
    next_cart: i32,
    next_contact: i32,
}

impl State {
    fn open_cart_of(&self, shopper: ShopperId) -> Option<&Cart> {
        self.carts
            .values()
            .find(|cart| cart.is_open() && cart.is_owned_by(shopper))
    }

    fn status_of(&self, cart: CartId) -> Option<CartStatus> {
        self.carts.get(&cart).map(|c| c.status)
    }
}

/// In-memory implementation of every storage trait.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with a storage error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of open carts owned by `shopper`.
    pub async fn open_cart_count(&self, shopper: ShopperId) -> usize {
        self.state
            .lock()
            .await
            .carts
            .values()
            .filter(|cart| cart.is_open() && cart.is_owned_by(shopper))
            .count()
    }

    /// Every stored contact request, oldest first.
    pub async fn contact_requests(&self) -> Vec<ContactRequest> {
        self.state.lock().await.contact_requests.clone()
    }

    fn check_writable(&self) -> Result<(), RepositoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl ShopperStore for MemoryStore {
    async fn create_shopper(&self, shopper: &NewShopper) -> Result<Shopper, RepositoryError> {
        self.check_writable()?;
        let mut state = self.state.lock().await;

        if state
            .shoppers
            .values()
            .any(|(existing, _)| existing.email == shopper.email)
        {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        state.next_shopper += 1;
        let created = Shopper {
            id: ShopperId::new(state.next_shopper),
            first_name: shopper.first_name.clone(),
            last_name: shopper.last_name.clone(),
            email: shopper.email.clone(),
            created_at: Utc::now(),
        };
        state.shoppers.insert(
            created.id,
            (created.clone(), shopper.credential_digest.clone()),
        );
        Ok(created)
    }

    async fn shopper_by_id(&self, id: ShopperId) -> Result<Option<Shopper>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state.shoppers.get(&id).map(|(shopper, _)| shopper.clone()))
    }

    async fn credentials_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(Shopper, String)>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .shoppers
            .values()
            .find(|(shopper, _)| shopper.email == *email)
            .cloned())
    }

    async fn delete_shopper(&self, id: ShopperId) -> Result<(), RepositoryError> {
        self.check_writable()?;
        let mut state = self.state.lock().await;

        if state.shoppers.remove(&id).is_none() {
            return Err(RepositoryError::NotFound);
        }

        let open: Vec<CartId> = state
            .carts
            .values()
            .filter(|cart| cart.is_open() && cart.is_owned_by(id))
            .map(|cart| cart.id)
            .collect();
        for cart in open {
            state.carts.remove(&cart);
            state.lines.retain(|(line_cart, _), _| *line_cart != cart);
        }
        for cart in state.carts.values_mut() {
            if cart.is_owned_by(id) {
                cart.shopper_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.state.lock().await.products.get(&id).cloned())
    }

    async fn search_products(&self, query: &SearchQuery) -> Result<Vec<Product>, RepositoryError> {
        let state = self.state.lock().await;
        let mut hits: Vec<Product> = state
            .products
            .values()
            .filter(|product| query.matches(product))
            .cloned()
            .collect();
        hits.sort_by(|a, b| query.compare(a, b));
        Ok(hits)
    }

    async fn upsert_product(&self, product: &Product) -> Result<(), RepositoryError> {
        self.check_writable()?;
        self.state
            .lock()
            .await
            .products
            .insert(product.id, product.clone());
        Ok(())
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn get_or_create_open_cart(&self, shopper: ShopperId) -> Result<Cart, RepositoryError> {
        let mut state = self.state.lock().await;

        if let Some(cart) = state.open_cart_of(shopper) {
            return Ok(cart.clone());
        }
        self.check_writable()?;
        if !state.shoppers.contains_key(&shopper) {
            return Err(RepositoryError::NotFound);
        }

        state.next_cart += 1;
        let cart = Cart {
            id: CartId::new(state.next_cart),
            shopper_id: Some(shopper),
            status: CartStatus::Open,
            created_at: Utc::now(),
            completed_at: None,
        };
        state.carts.insert(cart.id, cart.clone());
        Ok(cart)
    }

    async fn find_open_cart(&self, shopper: ShopperId) -> Result<Option<Cart>, RepositoryError> {
        Ok(self.state.lock().await.open_cart_of(shopper).cloned())
    }

    async fn cart_for_shopper(
        &self,
        cart: CartId,
        shopper: ShopperId,
    ) -> Result<Option<Cart>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .carts
            .get(&cart)
            .filter(|c| c.is_owned_by(shopper))
            .cloned())
    }

    async fn increment_line(
        &self,
        cart: CartId,
        product: ProductId,
    ) -> Result<LineOutcome, RepositoryError> {
        let mut state = self.state.lock().await;

        match state.status_of(cart) {
            None => return Ok(LineOutcome::CartMissing),
            Some(status) if !status.is_open() => return Ok(LineOutcome::CartClosed),
            Some(_) => {}
        }
        if !state.products.contains_key(&product) {
            return Ok(LineOutcome::ProductMissing);
        }
        self.check_writable()?;

        let quantity = state.lines.entry((cart, product)).or_insert(0);
        *quantity += 1;
        Ok(LineOutcome::Quantity(*quantity))
    }

    async fn decrement_line(
        &self,
        cart: CartId,
        product: ProductId,
    ) -> Result<LineOutcome, RepositoryError> {
        let mut state = self.state.lock().await;

        match state.status_of(cart) {
            None => return Ok(LineOutcome::CartMissing),
            Some(status) if !status.is_open() => return Ok(LineOutcome::CartClosed),
            Some(_) => {}
        }
        let Some(&current) = state.lines.get(&(cart, product)) else {
            return Ok(LineOutcome::LineMissing);
        };
        self.check_writable()?;

        if current > 1 {
            state.lines.insert((cart, product), current - 1);
            Ok(LineOutcome::Quantity(current - 1))
        } else {
            state.lines.remove(&(cart, product));
            Ok(LineOutcome::Removed)
        }
    }

    async fn cart_lines(&self, cart: CartId) -> Result<Vec<CartLine>, RepositoryError> {
        let state = self.state.lock().await;
        state
            .lines
            .iter()
            .filter(|((line_cart, _), _)| *line_cart == cart)
            .map(|(&(_, product_id), &quantity)| -> Result<CartLine, RepositoryError> {
                let product = state.products.get(&product_id).ok_or_else(|| {
                    RepositoryError::DataCorruption(format!(
                        "line item references missing product {product_id}"
                    ))
                })?;
                Ok(CartLine {
                    product_id,
                    name: product.name.clone(),
                    unit_price: product.price,
                    quantity,
                })
            })
            .collect()
    }

    async fn complete_cart(
        &self,
        cart: CartId,
        shopper: ShopperId,
    ) -> Result<CompleteOutcome, RepositoryError> {
        let mut state = self.state.lock().await;

        let Some(existing) = state.carts.get(&cart).filter(|c| c.is_owned_by(shopper)) else {
            return Ok(CompleteOutcome::NotFound);
        };
        if !existing.status.can_transition_to(CartStatus::Completed) {
            return Ok(CompleteOutcome::NotOpen);
        }
        if !state.lines.keys().any(|(line_cart, _)| *line_cart == cart) {
            return Ok(CompleteOutcome::Empty);
        }
        self.check_writable()?;

        let Some(target) = state.carts.get_mut(&cart) else {
            return Ok(CompleteOutcome::NotFound);
        };
        target.status = CartStatus::Completed;
        target.completed_at = Some(Utc::now());
        Ok(CompleteOutcome::Completed(target.clone()))
    }

    async fn completed_carts(&self, shopper: ShopperId) -> Result<Vec<Cart>, RepositoryError> {
        let state = self.state.lock().await;
        let mut carts: Vec<Cart> = state
            .carts
            .values()
            .filter(|cart| !cart.is_open() && cart.is_owned_by(shopper))
            .cloned()
            .collect();
        carts.sort_by(|a, b| {
            b.completed_at
                .cmp(&a.completed_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(carts)
    }
}

#[async_trait]
impl ContactStore for MemoryStore {
    async fn insert_contact_request(
        &self,
        request: &NewContactRequest,
    ) -> Result<ContactRequest, RepositoryError> {
        self.check_writable()?;
        let mut state = self.state.lock().await;

        state.next_contact += 1;
        let stored = ContactRequest {
            id: ContactRequestId::new(state.next_contact),
            name: request.name.clone(),
            email: request.email.clone(),
            subject: request.subject.clone(),
            message: request.message.clone(),
            created_at: Utc::now(),
        };
        state.contact_requests.push(stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use suds_core::Money;

    use super::*;

    async fn seeded() -> (MemoryStore, ShopperId) {
        let store = MemoryStore::new();
        let shopper = store
            .create_shopper(&NewShopper {
                first_name: "Ada".into(),
                last_name: "Lather".into(),
                email: Email::parse("ada@example.com").unwrap(),
                credential_digest: "digest".into(),
            })
            .await
            .unwrap();
        store
            .upsert_product(&Product {
                id: ProductId::new(7),
                name: "Oat Bar".into(),
                price: Money::from_cents(350),
                product_type: "Bar".into(),
                description: "Oatmeal soap".into(),
                picture: None,
                featured: false,
            })
            .await
            .unwrap();
        (store, shopper.id)
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let (store, _) = seeded().await;
        let err = store
            .create_shopper(&NewShopper {
                first_name: "Ada".into(),
                last_name: "Again".into(),
                email: Email::parse("ADA@example.com").unwrap(),
                credential_digest: "digest".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_concurrent_first_touch_creates_one_cart() {
        let (store, shopper) = seeded().await;
        let store = Arc::new(store);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.get_or_create_open_cart(shopper).await })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap().id);
        }
        ids.dedup();
        assert_eq!(ids.len(), 1);
        assert_eq!(store.open_cart_count(shopper).await, 1);
    }

    #[tokio::test]
    async fn test_unknown_shopper_cannot_get_cart() {
        let store = MemoryStore::new();
        let err = store
            .get_or_create_open_cart(ShopperId::new(404))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_line_untouched() {
        let (store, shopper) = seeded().await;
        let cart = store.get_or_create_open_cart(shopper).await.unwrap();
        store.increment_line(cart.id, ProductId::new(7)).await.unwrap();

        store.set_fail_writes(true);
        assert!(store.increment_line(cart.id, ProductId::new(7)).await.is_err());
        assert!(store.decrement_line(cart.id, ProductId::new(7)).await.is_err());
        store.set_fail_writes(false);

        let lines = store.cart_lines(cart.id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 1);
    }

    #[tokio::test]
    async fn test_delete_shopper_drops_open_cart_and_anonymises_orders() {
        let (store, shopper) = seeded().await;
        let first = store.get_or_create_open_cart(shopper).await.unwrap();
        store.increment_line(first.id, ProductId::new(7)).await.unwrap();
        store.complete_cart(first.id, shopper).await.unwrap();

        let open = store.get_or_create_open_cart(shopper).await.unwrap();
        store.increment_line(open.id, ProductId::new(7)).await.unwrap();

        store.delete_shopper(shopper).await.unwrap();

        assert!(store.cart_lines(open.id).await.unwrap().is_empty());
        assert_eq!(store.open_cart_count(shopper).await, 0);
        let state = store.state.lock().await;
        assert_eq!(state.carts.get(&first.id).unwrap().shopper_id, None);
        assert!(!state.carts.contains_key(&open.id));
        drop(state);

        assert!(matches!(
            store.delete_shopper(shopper).await,
            Err(RepositoryError::NotFound)
        ));
    }
}
