//! Suds Core - Shared domain types.
//!
//! This crate provides the types shared by every suds component:
//! - `storefront` - Cart/order lifecycle, catalog search, HTTP surface
//! - `cli` - Migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access. Database encoding is available behind the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, money, emails, and cart status
//! - [`validation`] - Field-level input validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod validation;

pub use types::*;
pub use validation::ValidationError;
