//! Entity store boundary: products, categories and suppliers.
//!
//! Stores own persistence mechanics (ids, timestamps, uniqueness, foreign
//! keys, row locking). Business rules stay in the domain crates and are run
//! by the store only through `Aggregate::execute` inside its own
//! read-modify-write.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use r#trait::{
    CategoryStore, ProductChange, ProductStore, Stores, StoreError, StoreResult, SupplierStore,
};
