//! `stockroom-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod page;
pub mod validation;
pub mod value_object;

pub use aggregate::Aggregate;
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{CategoryId, ProductId, SupplierId};
pub use page::{Page, PageLimits, PageRequest, SortDirection};
pub use validation::{FieldError, FieldErrors};
pub use value_object::{Price, ValueObject};
