//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                     - Liveness check
//! GET    /health/ready               - Readiness check (storage)
//!
//! # Auth
//! POST   /auth/signup                - Register a shopper
//! POST   /auth/login                 - Sign in (stores identity in session)
//! POST   /auth/logout                - Sign out
//!
//! # Account (requires auth)
//! DELETE /account                    - Delete account
//!
//! # Cart (requires auth)
//! GET    /cart                       - Open cart with totals
//! POST   /cart/add                   - Add one unit (form: product_id)
//! POST   /cart/decrease              - Remove one unit (form: product_id)
//!
//! # Orders (requires auth)
//! GET    /orders                     - Completed orders, newest first
//! GET    /orders/{cart_id}           - One completed order
//! POST   /orders/{cart_id}/complete  - Complete the open cart
//!
//! # Catalog
//! GET    /search                     - Search (search_term, filter, sort)
//! POST   /contact                    - Support request
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod contact;
pub mod orders;
pub mod search;

use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::from_fn,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;
use tower_sessions::service::SignedCookie;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/decrease", post(cart::decrease))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{cart_id}", get(orders::show))
        .route("/{cart_id}/complete", post(orders::complete))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .route("/account", delete(account::delete))
        .nest("/cart", cart_routes())
        .nest("/orders", order_routes())
        .route("/search", get(search::search))
        .route("/contact", post(contact::submit))
}

/// The complete application: routes, health checks, sessions, request IDs
/// and request tracing. Sentry layers are added by the binary.
pub fn router<Store>(
    state: AppState,
    session_layer: SessionManagerLayer<Store, SignedCookie>,
) -> Router
where
    Store: SessionStore + Clone,
{
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .layer(session_layer)
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if storage is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
