//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`. Error bodies are JSON: `{"error": "...", "field": "..."}`,
//! with `field` present only for validation failures.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use suds_core::ValidationError;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::cart::CartError;
use crate::services::contact::ContactError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// No shopper is signed in.
    #[error("authentication required")]
    Unauthenticated,

    /// Cart or order operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Contact request failed.
    #[error("Contact error: {0}")]
    Contact(#[from] ContactError),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Malformed form or path input.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'a str>,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Cart(err) => match err {
                CartError::ProductNotFound
                | CartError::LineItemNotFound
                | CartError::CartNotFound
                | CartError::Storage(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
                CartError::EmptyCart => StatusCode::CONFLICT,
                CartError::CartClosed | CartError::Storage(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Auth(err) => match err {
                AuthError::Validation(_) => StatusCode::BAD_REQUEST,
                AuthError::EmailTaken => StatusCode::CONFLICT,
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::ShopperNotFound => StatusCode::NOT_FOUND,
                AuthError::PasswordHash | AuthError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Contact(err) => match err {
                ContactError::Validation(_) => StatusCode::BAD_REQUEST,
                ContactError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Database(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The field a validation error refers to, if any.
    fn field(&self) -> Option<&'static str> {
        match self {
            Self::Validation(err)
            | Self::Auth(AuthError::Validation(err))
            | Self::Contact(ContactError::Validation(err)) => Some(err.field),
            _ => None,
        }
    }

    /// Client-facing message. Server errors never expose details.
    fn public_message(&self) -> String {
        let status = self.status();
        if status.is_server_error() {
            return "Internal server error".to_string();
        }
        if status == StatusCode::NOT_FOUND {
            return "not found".to_string();
        }
        match self {
            Self::Validation(err)
            | Self::Auth(AuthError::Validation(err))
            | Self::Contact(ContactError::Validation(err)) => err.message.clone(),
            Self::Auth(AuthError::EmailTaken) => {
                "An account with this email already exists".to_string()
            }
            Self::Auth(AuthError::InvalidCredentials) => "Invalid credentials".to_string(),
            Self::Cart(CartError::EmptyCart) => "Cart is empty".to_string(),
            Self::Unauthenticated => "Please log in".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            if matches!(self, Self::Cart(CartError::CartClosed)) {
                tracing::error!(
                    error = %self,
                    sentry_event_id = %event_id,
                    "Mutation reached a completed cart"
                );
            } else {
                tracing::error!(
                    error = %self,
                    sentry_event_id = %event_id,
                    "Request error"
                );
            }
        }

        let message = self.public_message();
        let body = ErrorBody {
            error: &message,
            field: self.field(),
        };
        (status, Json(body)).into_response()
    }
}

/// Set the Sentry user context from a shopper ID.
///
/// Call this after successful authentication to associate errors with shoppers.
pub fn set_sentry_user(shopper_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(shopper_id.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for shopper actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: &[(&str, String)]) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data {
        breadcrumb
            .data
            .insert((*key).to_string(), serde_json::Value::String(value.clone()));
    }

    sentry::add_breadcrumb(breadcrumb);
}
