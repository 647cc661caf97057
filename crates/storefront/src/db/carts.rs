//! Carts and line items on `PostgreSQL`.
//!
//! One open cart per shopper is enforced by the partial unique index
//! `cart_one_open_per_shopper`. Line-item changes lock the cart row first, so
//! they serialize against order completion.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use suds_core::{CartId, CartStatus, Money, ProductId, ShopperId};

use super::{
    CartStore, CompleteOutcome, LineOutcome, PgStore, RepositoryError, map_constraint,
    quantity_from_db,
};
use crate::models::{Cart, CartLine};

/// Insert-or-select rounds before giving up on a racing shopper.
const OPEN_CART_ATTEMPTS: usize = 3;

const CART_COLUMNS: &str = "id, shopper_id, status, created_at, completed_at";

#[derive(sqlx::FromRow)]
struct CartRow {
    id: CartId,
    shopper_id: Option<ShopperId>,
    status: CartStatus,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl From<CartRow> for Cart {
    fn from(row: CartRow) -> Self {
        Self {
            id: row.id,
            shopper_id: row.shopper_id,
            status: row.status,
            created_at: row.created_at,
            completed_at: row.completed_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct LineRow {
    product_id: ProductId,
    name: String,
    unit_price: Money,
    quantity: i32,
}

/// Lock a cart row for the rest of the transaction and report its status.
async fn lock_cart(
    conn: &mut sqlx::PgConnection,
    cart: CartId,
) -> Result<Option<CartStatus>, RepositoryError> {
    let status = sqlx::query_scalar::<_, CartStatus>(
        "SELECT status FROM storefront.cart WHERE id = $1 FOR UPDATE",
    )
    .bind(cart)
    .fetch_optional(conn)
    .await?;
    Ok(status)
}

#[async_trait]
impl CartStore for PgStore {
    async fn get_or_create_open_cart(&self, shopper: ShopperId) -> Result<Cart, RepositoryError> {
        let insert = format!(
            "INSERT INTO storefront.cart (shopper_id) VALUES ($1) \
             ON CONFLICT (shopper_id) WHERE status = 'open' DO NOTHING \
             RETURNING {CART_COLUMNS}"
        );

        // The open cart can be completed between a losing insert and the
        // follow-up select, so retry a bounded number of times.
        for _ in 0..OPEN_CART_ATTEMPTS {
            let created = sqlx::query_as::<_, CartRow>(&insert)
                .bind(shopper)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| map_constraint(e, "open cart already exists"))?;

            if let Some(row) = created {
                tracing::debug!(shopper_id = %shopper, cart_id = %row.id, "Created open cart");
                return Ok(row.into());
            }

            if let Some(cart) = self.find_open_cart(shopper).await? {
                return Ok(cart);
            }
        }

        Err(RepositoryError::Conflict(format!(
            "could not resolve open cart for shopper {shopper}"
        )))
    }

    async fn find_open_cart(&self, shopper: ShopperId) -> Result<Option<Cart>, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(&format!(
            "SELECT {CART_COLUMNS} FROM storefront.cart \
             WHERE shopper_id = $1 AND status = 'open'"
        ))
        .bind(shopper)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Cart::from))
    }

    async fn cart_for_shopper(
        &self,
        cart: CartId,
        shopper: ShopperId,
    ) -> Result<Option<Cart>, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(&format!(
            "SELECT {CART_COLUMNS} FROM storefront.cart \
             WHERE id = $1 AND shopper_id = $2"
        ))
        .bind(cart)
        .bind(shopper)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Cart::from))
    }

    async fn increment_line(
        &self,
        cart: CartId,
        product: ProductId,
    ) -> Result<LineOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        match lock_cart(&mut *tx, cart).await? {
            None => return Ok(LineOutcome::CartMissing),
            Some(status) if !status.is_open() => return Ok(LineOutcome::CartClosed),
            Some(_) => {}
        }

        let product_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM storefront.product WHERE id = $1)",
        )
        .bind(product)
        .fetch_one(&mut *tx)
        .await?;
        if !product_exists {
            return Ok(LineOutcome::ProductMissing);
        }

        let quantity = sqlx::query_scalar::<_, i32>(
            r"
            INSERT INTO storefront.line_item (cart_id, product_id, quantity)
            VALUES ($1, $2, 1)
            ON CONFLICT (cart_id, product_id)
            DO UPDATE SET quantity = storefront.line_item.quantity + 1
            RETURNING quantity
            ",
        )
        .bind(cart)
        .bind(product)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_constraint(e, "line item already exists"))?;

        tx.commit().await?;
        Ok(LineOutcome::Quantity(quantity_from_db(quantity)?))
    }

    async fn decrement_line(
        &self,
        cart: CartId,
        product: ProductId,
    ) -> Result<LineOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        match lock_cart(&mut *tx, cart).await? {
            None => return Ok(LineOutcome::CartMissing),
            Some(status) if !status.is_open() => return Ok(LineOutcome::CartClosed),
            Some(_) => {}
        }

        let decremented = sqlx::query_scalar::<_, i32>(
            r"
            UPDATE storefront.line_item
            SET quantity = quantity - 1
            WHERE cart_id = $1 AND product_id = $2 AND quantity > 1
            RETURNING quantity
            ",
        )
        .bind(cart)
        .bind(product)
        .fetch_optional(&mut *tx)
        .await?;

        let outcome = if let Some(quantity) = decremented {
            LineOutcome::Quantity(quantity_from_db(quantity)?)
        } else {
            let removed = sqlx::query(
                r"
                DELETE FROM storefront.line_item
                WHERE cart_id = $1 AND product_id = $2 AND quantity = 1
                ",
            )
            .bind(cart)
            .bind(product)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            if removed == 0 {
                LineOutcome::LineMissing
            } else {
                LineOutcome::Removed
            }
        };

        tx.commit().await?;
        Ok(outcome)
    }

    async fn cart_lines(&self, cart: CartId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, LineRow>(
            r"
            SELECT li.product_id, p.name, p.price AS unit_price, li.quantity
            FROM storefront.line_item li
            JOIN storefront.product p ON p.id = li.product_id
            WHERE li.cart_id = $1
            ORDER BY li.product_id ASC
            ",
        )
        .bind(cart)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> Result<CartLine, RepositoryError> {
                Ok(CartLine {
                    product_id: row.product_id,
                    name: row.name,
                    unit_price: row.unit_price,
                    quantity: quantity_from_db(row.quantity)?,
                })
            })
            .collect()
    }

    async fn complete_cart(
        &self,
        cart: CartId,
        shopper: ShopperId,
    ) -> Result<CompleteOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let status = sqlx::query_scalar::<_, CartStatus>(
            r"
            SELECT status FROM storefront.cart
            WHERE id = $1 AND shopper_id = $2
            FOR UPDATE
            ",
        )
        .bind(cart)
        .bind(shopper)
        .fetch_optional(&mut *tx)
        .await?;

        match status {
            None => return Ok(CompleteOutcome::NotFound),
            Some(status) if !status.can_transition_to(CartStatus::Completed) => {
                return Ok(CompleteOutcome::NotOpen);
            }
            Some(_) => {}
        }

        let has_lines = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM storefront.line_item WHERE cart_id = $1)",
        )
        .bind(cart)
        .fetch_one(&mut *tx)
        .await?;
        if !has_lines {
            return Ok(CompleteOutcome::Empty);
        }

        let row = sqlx::query_as::<_, CartRow>(&format!(
            "UPDATE storefront.cart \
             SET status = 'completed', completed_at = now() \
             WHERE id = $1 AND status = 'open' \
             RETURNING {CART_COLUMNS}"
        ))
        .bind(cart)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(CompleteOutcome::Completed(row.into()))
    }

    async fn completed_carts(&self, shopper: ShopperId) -> Result<Vec<Cart>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartRow>(&format!(
            "SELECT {CART_COLUMNS} FROM storefront.cart \
             WHERE shopper_id = $1 AND status = 'completed' \
             ORDER BY completed_at DESC, id DESC"
        ))
        .bind(shopper)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Cart::from).collect())
    }
}
