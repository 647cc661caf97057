//! Search route handler.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use suds_core::ProductId;

use crate::error::AppError;
use crate::middleware::OptionalShopper;
use crate::search::SearchQuery;
use crate::services::catalog::{CatalogService, SearchHit};
use crate::state::AppState;

/// Search query parameters.
///
/// All three are optional; a missing term lists the whole catalog.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub search_term: Option<String>,
    pub filter: Option<String>,
    pub sort: Option<String>,
}

/// Search result display data.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResultView {
    pub id: ProductId,
    pub name: String,
    pub price: String,
    pub product_type: String,
    pub description: String,
    pub picture: Option<String>,
    pub in_cart: u32,
}

impl From<SearchHit> for SearchResultView {
    fn from(hit: SearchHit) -> Self {
        Self {
            id: hit.product.id,
            price: hit.product.price.display(),
            name: hit.product.name,
            product_type: hit.product.product_type,
            description: hit.product.description,
            picture: hit.product.picture,
            in_cart: hit.in_cart,
        }
    }
}

/// Search response.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub search_term: String,
    pub sort: &'static str,
    pub results: Vec<SearchResultView>,
}

/// Search the catalog.
///
/// Signed-in shoppers see how many of each result are already in their cart.
///
/// GET /search
#[instrument(skip_all)]
pub async fn search(
    State(state): State<AppState>,
    OptionalShopper(shopper): OptionalShopper,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    let query = SearchQuery::from_params(
        params.search_term.as_deref(),
        params.filter.as_deref(),
        params.sort.as_deref(),
    );

    let hits = CatalogService::new(state.store())
        .search(&query, shopper.map(|s| s.id))
        .await?;

    Ok(Json(SearchResponse {
        sort: query.sort.as_str(),
        results: hits.into_iter().map(SearchResultView::from).collect(),
        search_term: query.term,
    }))
}
