//! Roastery Domain Concerns

pub mod carts;
pub mod checkout;
pub mod orders;
