//! Authentication route handlers.
//!
//! Signup, login and logout. The session holds only a [`CurrentShopper`];
//! everything else is looked up per request.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use suds_core::ShopperId;

use crate::error::{AppError, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::extract::{InputFields, ValidForm};
use crate::middleware::{clear_current_shopper, set_current_shopper};
use crate::models::{CurrentShopper, Shopper};
use crate::services::auth::{AuthService, Signup};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Signup form data.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl InputFields for SignupForm {
    const FIELDS: &'static [&'static str] =
        &["first_name", "last_name", "email", "password", "confirm_password"];
}

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl InputFields for LoginForm {
    const FIELDS: &'static [&'static str] = &["email", "password"];
}

/// Public view of a shopper.
#[derive(Debug, Serialize)]
pub struct ShopperView {
    pub id: ShopperId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<Shopper> for ShopperView {
    fn from(shopper: Shopper) -> Self {
        Self {
            id: shopper.id,
            first_name: shopper.first_name,
            last_name: shopper.last_name,
            email: shopper.email.into_inner(),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Register a shopper. Does not sign them in.
///
/// POST /auth/signup
#[instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    ValidForm(form): ValidForm<SignupForm>,
) -> Result<impl IntoResponse, AppError> {
    let service = AuthService::new(state.store(), state.hasher());
    let shopper = service
        .signup(&Signup {
            first_name: form.first_name,
            last_name: form.last_name,
            email: form.email,
            password: form.password,
            confirm_password: form.confirm_password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ShopperView::from(shopper))))
}

/// Sign in and store the shopper identity in the session.
///
/// POST /auth/login
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ValidForm(form): ValidForm<LoginForm>,
) -> Result<Json<ShopperView>, AppError> {
    let service = AuthService::new(state.store(), state.hasher());
    let shopper = service.login(&form.email, &form.password).await?;

    set_current_shopper(
        &session,
        &CurrentShopper {
            id: shopper.id,
            first_name: shopper.first_name.clone(),
        },
    )
    .await?;
    set_sentry_user(&shopper.id);
    add_breadcrumb("auth", "Shopper logged in", &[("shopper_id", shopper.id.to_string())]);

    Ok(Json(ShopperView::from(shopper)))
}

/// Sign out.
///
/// POST /auth/logout
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Result<StatusCode, AppError> {
    clear_current_shopper(&session).await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}
