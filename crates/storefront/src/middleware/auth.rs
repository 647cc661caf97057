//! Shopper identity extractors.
//!
//! The session is the only place a shopper identity comes from. Handlers
//! take it as an extractor and pass the [`ShopperId`](suds_core::ShopperId)
//! on to services explicitly.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::CurrentShopper;
use crate::models::session::keys;

/// Extractor that requires a signed-in shopper.
///
/// Rejects with [`AppError::Unauthenticated`] (401) when nobody is signed in.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireShopper(shopper): RequireShopper,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", shopper.first_name)
/// }
/// ```
pub struct RequireShopper(pub CurrentShopper);

impl<S> FromRequestParts<S> for RequireShopper
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AppError::Unauthenticated)?;

        let shopper = session
            .get::<CurrentShopper>(keys::CURRENT_SHOPPER)
            .await?
            .ok_or(AppError::Unauthenticated)?;

        Ok(Self(shopper))
    }
}

/// Extractor that optionally gets the current shopper.
///
/// Unlike `RequireShopper`, this does not reject anonymous requests.
pub struct OptionalShopper(pub Option<CurrentShopper>);

impl<S> FromRequestParts<S> for OptionalShopper
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let shopper = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentShopper>(keys::CURRENT_SHOPPER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(shopper))
    }
}

/// Store the signed-in shopper in the session.
///
/// The session ID is cycled first so a pre-login session ID cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_shopper(
    session: &Session,
    shopper: &CurrentShopper,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(keys::CURRENT_SHOPPER, shopper).await
}

/// Clear the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_shopper(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
