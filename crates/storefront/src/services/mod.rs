//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `cart` - Open-cart resolution, line-item quantities and totals
//! - `orders` - Order completion and order history
//! - `catalog` - Catalog search annotated with in-cart quantities
//! - `auth` - Shopper signup, login and account deletion
//! - `contact` - Support requests
//!
//! Services borrow a store for the duration of one operation and take the
//! shopper identity as an explicit argument; they never read the session.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod contact;
pub mod orders;
