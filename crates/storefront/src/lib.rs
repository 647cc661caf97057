//! Suds storefront library.
//!
//! Shopper accounts, the open-cart and order lifecycle, catalog search and
//! support requests behind an Axum router. The binary wires the router to
//! `PostgreSQL`; tests wire it to the in-memory store.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod search;
pub mod services;
pub mod state;
