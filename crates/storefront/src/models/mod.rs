//! Domain models for the storefront.
//!
//! These are validated domain objects, separate from database row types.

pub mod cart;
pub mod contact;
pub mod product;
pub mod session;
pub mod shopper;

pub use cart::{Cart, CartLine};
pub use contact::{ContactRequest, NewContactRequest};
pub use product::Product;
pub use session::CurrentShopper;
pub use shopper::{NewShopper, Shopper};
