//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use suds_core::ShopperId;

/// Session-stored shopper identity.
///
/// Minimal data stored in the session to identify the signed-in shopper.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrentShopper {
    /// Shopper's database ID.
    pub id: ShopperId,
    /// First name, for greetings.
    pub first_name: String,
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current signed-in shopper.
    pub const CURRENT_SHOPPER: &str = "current_shopper";
}
