//! Authentication error types.

use thiserror::Error;

use suds_core::ValidationError;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A signup field was rejected.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// The email is already registered.
    #[error("email already registered")]
    EmailTaken,

    /// Invalid credentials (wrong password or shopper not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The shopper no longer exists.
    #[error("shopper not found")]
    ShopperNotFound,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
