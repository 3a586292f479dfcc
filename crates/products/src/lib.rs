//! Products domain module.
//!
//! This crate contains business rules for the catalog (products and the
//! categories they are filed under) plus the product search policy,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod category;
pub mod product;
pub mod search;

pub use category::{Category, CategoryDraft};
pub use product::{Product, ProductCommand, ProductDraft, ProductEvent};
pub use search::{ProductFilter, ProductSearch, ProductSortField};
