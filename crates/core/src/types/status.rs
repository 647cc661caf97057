//! Cart lifecycle status.

use serde::{Deserialize, Serialize};

/// Where a cart is in its lifecycle.
///
/// ```text
/// open --[complete, non-empty]--> completed
/// ```
///
/// There is no transition out of `Completed`; a completed cart is the
/// immutable record of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "storefront.cart_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum CartStatus {
    /// The shopper's single mutable cart.
    #[default]
    Open,
    /// A finalized order.
    Completed,
}

impl CartStatus {
    /// Whether line items may still change.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    /// Whether moving from `self` to `next` is a legal lifecycle step.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!((self, next), (Self::Open, Self::Completed))
    }
}

impl std::fmt::Display for CartStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for CartStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("invalid cart status: {s}")),
        }
    }
}
