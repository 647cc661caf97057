//! Cart route handlers.
//!
//! Every handler acts on the signed-in shopper's single open cart, which is
//! created on first use. Quantities change one unit per request.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use suds_core::{CartId, Money, ProductId};

use crate::error::{AppError, add_breadcrumb};
use crate::extract::{InputFields, ValidForm};
use crate::middleware::RequireShopper;
use crate::models::Cart;
use crate::services::cart::{CartService, CartTotals, TotalLine};
use crate::state::AppState;

/// Form data for adding or removing one unit of a product.
#[derive(Debug, Deserialize)]
pub struct LineForm {
    pub product_id: ProductId,
}

impl InputFields for LineForm {
    const FIELDS: &'static [&'static str] = &["product_id"];
}

/// Cart line display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: String,
    pub quantity: u32,
    pub line_total: String,
}

impl From<&TotalLine> for CartItemView {
    fn from(line: &TotalLine) -> Self {
        Self {
            product_id: line.product_id,
            name: line.name.clone(),
            unit_price: line.unit_price.display(),
            quantity: line.quantity,
            line_total: line.line_total.display(),
        }
    }
}

/// Cart display data.
///
/// Prices are rendered to cents; `total_price_exact` carries the unrounded sum.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub cart_id: CartId,
    pub items: Vec<CartItemView>,
    pub item_count: u32,
    pub total_price: String,
    pub total_price_exact: Money,
}

impl CartView {
    #[must_use]
    pub fn new(cart: &Cart, totals: &CartTotals) -> Self {
        Self {
            cart_id: cart.id,
            items: totals.lines.iter().map(CartItemView::from).collect(),
            item_count: totals.item_count(),
            total_price: totals.total_price.display(),
            total_price_exact: totals.total_price,
        }
    }
}

/// Show the open cart with totals.
///
/// GET /cart
#[instrument(skip_all, fields(shopper_id = %shopper.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireShopper(shopper): RequireShopper,
) -> Result<Json<CartView>, AppError> {
    let service = CartService::new(state.store());
    let cart = service.open_cart(shopper.id).await?;
    let totals = service.compute_totals(&cart).await?;
    Ok(Json(CartView::new(&cart, &totals)))
}

/// Add one unit of a product to the open cart.
///
/// POST /cart/add
#[instrument(skip_all, fields(shopper_id = %shopper.id, product_id = %form.product_id))]
pub async fn add(
    State(state): State<AppState>,
    RequireShopper(shopper): RequireShopper,
    ValidForm(form): ValidForm<LineForm>,
) -> Result<Json<CartView>, AppError> {
    let service = CartService::new(state.store());
    let (cart, quantity) = service
        .add_to_open_cart(shopper.id, form.product_id)
        .await?;

    add_breadcrumb(
        "cart",
        "Added to cart",
        &[
            ("product_id", form.product_id.to_string()),
            ("quantity", quantity.to_string()),
        ],
    );

    let totals = service.compute_totals(&cart).await?;
    Ok(Json(CartView::new(&cart, &totals)))
}

/// Remove one unit of a product from the open cart.
///
/// The line disappears when its quantity would reach zero.
///
/// POST /cart/decrease
#[instrument(skip_all, fields(shopper_id = %shopper.id, product_id = %form.product_id))]
pub async fn decrease(
    State(state): State<AppState>,
    RequireShopper(shopper): RequireShopper,
    ValidForm(form): ValidForm<LineForm>,
) -> Result<Json<CartView>, AppError> {
    let service = CartService::new(state.store());
    let (cart, remaining) = service
        .decrease_in_open_cart(shopper.id, form.product_id)
        .await?;

    add_breadcrumb(
        "cart",
        "Removed from cart",
        &[
            ("product_id", form.product_id.to_string()),
            ("quantity", remaining.unwrap_or(0).to_string()),
        ],
    );

    let totals = service.compute_totals(&cart).await?;
    Ok(Json(CartView::new(&cart, &totals)))
}
