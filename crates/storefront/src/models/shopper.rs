//! Shopper domain types.

use chrono::{DateTime, Utc};

use suds_core::{Email, ShopperId};

/// A registered shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shopper {
    pub id: ShopperId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub created_at: DateTime<Utc>,
}

/// Data needed to register a shopper.
///
/// `credential_digest` is the output of a
/// [`CredentialHasher`](crate::services::auth::CredentialHasher); the plain
/// password never reaches storage.
#[derive(Debug, Clone)]
pub struct NewShopper {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub credential_digest: String,
}
