//! Roastery application services: persisted cart, order history and checkout.

pub mod config;
pub mod context;
pub mod domain;
