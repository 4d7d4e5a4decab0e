//! Trolley
//!
//! Trolley is a storefront shopping-cart engine: a durable cart line store
//! with quantity clamping, per-line selection, derived statistics, and
//! checkout total derivation.

pub mod checkout;
pub mod lines;
pub mod prelude;
pub mod products;
pub mod snapshot;
pub mod stats;
pub mod store;
