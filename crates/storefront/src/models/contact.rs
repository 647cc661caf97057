//! Contact (support) requests.

use chrono::{DateTime, Utc};

use suds_core::ContactRequestId;

/// A stored support submission. Append-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRequest {
    pub id: ContactRequestId,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// A validated support submission awaiting storage.
#[derive(Debug, Clone)]
pub struct NewContactRequest {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}
