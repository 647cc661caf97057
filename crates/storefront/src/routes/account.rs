//! Account route handlers.

use axum::{extract::State, http::StatusCode};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, clear_sentry_user};
use crate::middleware::{RequireShopper, clear_current_shopper};
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Delete the signed-in shopper's account and end the session.
///
/// The open cart is discarded; completed orders are kept without an owner.
///
/// DELETE /account
#[instrument(skip_all, fields(shopper_id = %shopper.id))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireShopper(shopper): RequireShopper,
) -> Result<StatusCode, AppError> {
    AuthService::new(state.store(), state.hasher())
        .delete_account(shopper.id)
        .await?;

    clear_current_shopper(&session).await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}
