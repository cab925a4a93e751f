//! Artisan
//!
//! Storefront core for the Artisan shop: a product catalog, an observable
//! shopping cart store, shipping and order totals, and role-based navigation.

pub mod access;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod fixtures;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod storefront;
pub mod summary;
