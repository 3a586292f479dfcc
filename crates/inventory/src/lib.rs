//! Inventory domain module.
//!
//! This crate contains the stock quantity rules (movements, non-negative
//! invariant, low-stock derivation), implemented purely as deterministic
//! domain logic (no IO, no HTTP, no storage).

pub mod stock;

pub use stock::{StockAdjusted, StockLevel, StockMovement};
