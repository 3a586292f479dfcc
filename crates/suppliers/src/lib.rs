//! Suppliers domain module.
//!
//! Supplier records, their naming rule (unique ignoring case) and the
//! conjunctive supplier search. Pure domain logic; storage lives in `infra`.

pub mod search;
pub mod supplier;

pub use search::{SupplierSearch, SupplierSortField};
pub use supplier::{Supplier, SupplierDraft};
