//! Roastery
//!
//! Cart and order domain for a custom-blend coffee shop: taste profiles, a cart
//! that keeps one line per blend, order snapshots and the shopper's order history.

pub mod cart;
pub mod fixtures;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod profiles;
pub mod receipt;
pub mod sku;
pub mod uuids;
