//! Entity façades: the only entry points that mutate state.
//!
//! Every read goes through the read-through cache; every write runs the
//! domain rules, hits the store, and reports exactly which cache entries it
//! made stale.

use std::sync::Arc;

use thiserror::Error;

use stockroom_core::DomainError;

use crate::cache::{CacheError, CacheLayer, ReadThroughCache};
use crate::store::{StoreError, Stores};

pub mod categories;
pub mod products;
pub mod suppliers;
pub mod views;

pub use categories::CategoryService;
pub use products::ProductService;
pub use suppliers::SupplierService;
pub use views::{CategoryView, ProductView, SupplierView};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Façade error: a domain outcome the caller can act on, or an
/// infrastructure failure it cannot.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(StoreError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl ServiceError {
    pub fn is_internal(&self) -> bool {
        !matches!(self, ServiceError::Domain(_))
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => ServiceError::Domain(DomainError::not_found(msg)),
            StoreError::UniqueViolation(msg) | StoreError::ReferenceViolation(msg) => {
                ServiceError::Domain(DomainError::conflict(msg))
            }
            StoreError::Domain(e) => ServiceError::Domain(e),
            backend @ StoreError::Backend(_) => ServiceError::Store(backend),
        }
    }
}

/// All three façades over one store backend and one cache.
#[derive(Clone)]
pub struct Services {
    pub products: ProductService,
    pub categories: CategoryService,
    pub suppliers: SupplierService,
}

impl Services {
    pub fn new(stores: Stores, cache_layer: Arc<dyn CacheLayer>) -> Self {
        let cache = Arc::new(ReadThroughCache::new(cache_layer));
        Self {
            products: ProductService::new(stores.clone(), cache.clone()),
            categories: CategoryService::new(stores.clone(), cache.clone()),
            suppliers: SupplierService::new(stores, cache),
        }
    }
}
