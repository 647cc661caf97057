//! Session middleware configuration.
//!
//! Production sessions live in `PostgreSQL` via tower-sessions; the store is
//! generic so tests can use an in-memory one with the same cookie settings.
//! Session cookies are signed with a key derived from
//! `STOREFRONT_SESSION_SECRET`, so a forged or altered session ID is treated
//! as no session at all.

use sqlx::PgPool;
use tower_sessions::cookie::Key;
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::{ConfigError, StorefrontConfig};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "suds_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Apply the storefront's cookie settings and signing key to any session store.
#[must_use]
pub fn configure_session_layer<Store: SessionStore + Clone>(
    store: Store,
    key: Key,
    secure: bool,
) -> SessionManagerLayer<Store, SignedCookie> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key)
}

/// Create the session layer with `PostgreSQL` store.
///
/// The session table is created by `suds-cli migrate`.
///
/// # Errors
///
/// Returns `ConfigError` if the session secret is too short to derive a
/// signing key.
pub fn create_session_layer(
    pool: &PgPool,
    config: &StorefrontConfig,
) -> Result<SessionManagerLayer<PostgresStore, SignedCookie>, ConfigError> {
    Ok(configure_session_layer(
        PostgresStore::new(pool.clone()),
        config.session_key()?,
        config.secure_cookies(),
    ))
}
