//! Catalog product.

use serde::{Deserialize, Serialize};

use suds_core::{Money, ProductId};

/// A catalog entry.
///
/// Products are read-mostly; they are written only by catalog seeding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Unit price, never negative.
    pub price: Money,
    /// Category tag such as `Bar` or `Liquid`.
    pub product_type: String,
    pub description: String,
    /// Image reference, relative to the static image root.
    pub picture: Option<String>,
    #[serde(default)]
    pub featured: bool,
}
