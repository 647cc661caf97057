//! Order route handlers.
//!
//! An order is a completed cart. Lookups of another shopper's order, an
//! unknown ID, or a still-open cart all answer 404.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::instrument;

use suds_core::{CartId, CartStatus};

use crate::error::{AppError, add_breadcrumb};
use crate::extract::ValidPath;
use crate::middleware::RequireShopper;
use crate::models::Cart;
use crate::routes::cart::CartItemView;
use crate::services::cart::CartTotals;
use crate::services::orders::OrderService;
use crate::state::AppState;

/// Order list entry.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    pub cart_id: CartId,
    pub status: CartStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<Cart> for OrderSummary {
    fn from(cart: Cart) -> Self {
        Self {
            cart_id: cart.id,
            status: cart.status,
            created_at: cart.created_at,
            completed_at: cart.completed_at,
        }
    }
}

/// A completed order with its priced lines.
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub summary: OrderSummary,
    pub items: Vec<CartItemView>,
    pub item_count: u32,
    pub total_price: String,
}

impl OrderView {
    fn new(cart: Cart, totals: &CartTotals) -> Self {
        Self {
            summary: OrderSummary::from(cart),
            items: totals.lines.iter().map(CartItemView::from).collect(),
            item_count: totals.item_count(),
            total_price: totals.total_price.display(),
        }
    }
}

/// Complete the shopper's open cart.
///
/// POST /orders/{cart_id}/complete
#[instrument(skip_all, fields(shopper_id = %shopper.id, cart_id = %cart_id))]
pub async fn complete(
    State(state): State<AppState>,
    RequireShopper(shopper): RequireShopper,
    ValidPath(cart_id): ValidPath<CartId>,
) -> Result<Json<OrderView>, AppError> {
    let service = OrderService::new(state.store());
    service.complete_order(cart_id, shopper.id).await?;

    add_breadcrumb("order", "Order completed", &[("cart_id", cart_id.to_string())]);

    let (order, totals) = service.past_order(cart_id, shopper.id).await?;
    Ok(Json(OrderView::new(order, &totals)))
}

/// List the shopper's completed orders, newest first.
///
/// GET /orders
#[instrument(skip_all, fields(shopper_id = %shopper.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireShopper(shopper): RequireShopper,
) -> Result<Json<Vec<OrderSummary>>, AppError> {
    let orders = OrderService::new(state.store())
        .past_orders(shopper.id)
        .await?;
    Ok(Json(orders.into_iter().map(OrderSummary::from).collect()))
}

/// Show one completed order.
///
/// GET /orders/{cart_id}
#[instrument(skip_all, fields(shopper_id = %shopper.id, cart_id = %cart_id))]
pub async fn show(
    State(state): State<AppState>,
    RequireShopper(shopper): RequireShopper,
    ValidPath(cart_id): ValidPath<CartId>,
) -> Result<Json<OrderView>, AppError> {
    let (order, totals) = OrderService::new(state.store())
        .past_order(cart_id, shopper.id)
        .await?;
    Ok(Json(OrderView::new(order, &totals)))
}
