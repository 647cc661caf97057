//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (echo or generate `x-request-id`)
//! 4. Session layer (tower-sessions)
//!
//! Shopper identity is read from the session by the [`RequireShopper`] and
//! [`OptionalShopper`] extractors.

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{OptionalShopper, RequireShopper, clear_current_shopper, set_current_shopper};
pub use request_id::{RequestId, request_id_middleware};
pub use session::{SESSION_COOKIE_NAME, configure_session_layer, create_session_layer};
