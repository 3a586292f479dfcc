use std::sync::Arc;

use thiserror::Error;

use stockroom_core::{CategoryId, DomainError, PageRequest, ProductId, SupplierId};
use stockroom_products::{
    Category, CategoryDraft, Product, ProductCommand, ProductDraft, ProductFilter,
    ProductSortField,
};
use stockroom_suppliers::{Supplier, SupplierDraft, SupplierSearch, SupplierSortField};

/// Entity store error.
///
/// `NotFound`, `UniqueViolation`, `ReferenceViolation` and `Domain` are
/// caller-facing; `Backend` is everything the storage engine can throw at us.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{0}")]
    NotFound(String),

    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// A foreign key would dangle (missing parent, or parent still referenced).
    #[error("reference constraint violated: {0}")]
    ReferenceViolation(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub fn product_not_found(id: ProductId) -> StoreError {
    StoreError::NotFound(format!("Product not found with id: {id}"))
}

pub fn category_not_found(id: CategoryId) -> StoreError {
    StoreError::NotFound(format!("Category not found with id: {id}"))
}

pub fn supplier_not_found(id: SupplierId) -> StoreError {
    StoreError::NotFound(format!("Supplier not found with id: {id}"))
}

/// Product state on both sides of a committed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductChange {
    pub before: Product,
    pub after: Product,
}

#[async_trait::async_trait]
pub trait ProductStore: Send + Sync {
    async fn get(&self, id: ProductId) -> StoreResult<Option<Product>>;

    async fn get_by_sku(&self, sku: &str) -> StoreResult<Option<Product>>;

    async fn exists_by_sku(&self, sku: &str) -> StoreResult<bool>;

    /// Insert a new product; the store assigns the id.
    async fn insert(&self, draft: &ProductDraft) -> StoreResult<Product>;

    /// Atomic read-modify-write: load `id` exclusively, run `command` through
    /// the aggregate, persist the result.
    ///
    /// A rejected command leaves the stored row untouched.
    async fn execute(&self, id: ProductId, command: &ProductCommand) -> StoreResult<ProductChange>;

    /// Returns the deleted product.
    async fn delete(&self, id: ProductId) -> StoreResult<Product>;

    async fn count_by_category(&self, category_id: CategoryId) -> StoreResult<u64>;

    async fn count_by_supplier(&self, supplier_id: SupplierId) -> StoreResult<u64>;

    async fn page(
        &self,
        filter: &ProductFilter,
        request: &PageRequest<ProductSortField>,
    ) -> StoreResult<(Vec<Product>, u64)>;

    /// Every match, ordered by id.
    async fn list(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>>;
}

#[async_trait::async_trait]
pub trait CategoryStore: Send + Sync {
    async fn get(&self, id: CategoryId) -> StoreResult<Option<Category>>;

    async fn get_by_name(&self, name: &str) -> StoreResult<Option<Category>>;

    async fn exists_by_name(&self, name: &str) -> StoreResult<bool>;

    async fn insert(&self, draft: &CategoryDraft) -> StoreResult<Category>;

    async fn update(&self, category: &Category) -> StoreResult<Category>;

    /// Fails with `ReferenceViolation` while any product points at it.
    async fn delete(&self, id: CategoryId) -> StoreResult<()>;

    /// All categories ordered by id.
    async fn list(&self) -> StoreResult<Vec<Category>>;
}

#[async_trait::async_trait]
pub trait SupplierStore: Send + Sync {
    async fn get(&self, id: SupplierId) -> StoreResult<Option<Supplier>>;

    /// Case-insensitive lookup.
    async fn get_by_name(&self, name: &str) -> StoreResult<Option<Supplier>>;

    /// Case-insensitive existence check.
    async fn exists_by_name(&self, name: &str) -> StoreResult<bool>;

    /// Insert a new supplier; the store assigns id and timestamps.
    async fn insert(&self, draft: &SupplierDraft) -> StoreResult<Supplier>;

    /// Persist `supplier`; the store stamps `updated_at`.
    async fn update(&self, supplier: &Supplier) -> StoreResult<Supplier>;

    /// Fails with `ReferenceViolation` while any product points at it.
    async fn delete(&self, id: SupplierId) -> StoreResult<()>;

    async fn page(
        &self,
        search: &SupplierSearch,
        request: &PageRequest<SupplierSortField>,
    ) -> StoreResult<(Vec<Supplier>, u64)>;

    /// Active suppliers ordered by name.
    async fn list_active_by_name(&self) -> StoreResult<Vec<Supplier>>;
}

/// The three entity stores a service layer needs, type-erased.
#[derive(Clone)]
pub struct Stores {
    pub products: Arc<dyn ProductStore>,
    pub categories: Arc<dyn CategoryStore>,
    pub suppliers: Arc<dyn SupplierStore>,
}

impl Stores {
    /// One backend object implementing all three store traits.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: ProductStore + CategoryStore + SupplierStore + 'static,
    {
        Self {
            products: backend.clone(),
            categories: backend.clone(),
            suppliers: backend,
        }
    }
}
