//! Product façade: catalog CRUD, search, inventory engine and assignments.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, instrument, warn};

use stockroom_core::{CategoryId, DomainError, Page, PageRequest, ProductId, SupplierId};
use stockroom_inventory::StockMovement;
use stockroom_products::{
    Product, ProductCommand, ProductDraft, ProductFilter, ProductSearch, ProductSortField,
};

use crate::cache::{Invalidation, ReadThroughCache, keys};
use crate::store::{ProductChange, Stores};

use super::{ProductView, ServiceResult};

#[derive(Clone)]
pub struct ProductService {
    stores: Stores,
    cache: Arc<ReadThroughCache>,
}

/// Everything a change to `products` can have made stale.
///
/// Product views embed category/supplier names and the category/supplier
/// views embed product counts, so both sides of every reference are evicted.
fn invalidation_for(products: &[&Product]) -> Invalidation {
    let mut invalidation = Invalidation::new()
        .prefix(keys::PRODUCTS)
        .prefix(keys::CATEGORIES)
        .prefix(keys::SUPPLIERS);
    for product in products {
        invalidation = invalidation
            .key(keys::product(product.id))
            .key(keys::product_by_sku(&product.sku));
        if let Some(id) = product.category_id {
            invalidation = invalidation.key(keys::category(id));
        }
        if let Some(id) = product.supplier_id {
            invalidation = invalidation.key(keys::supplier(id));
        }
    }
    invalidation
}

impl ProductService {
    pub fn new(stores: Stores, cache: Arc<ReadThroughCache>) -> Self {
        Self { stores, cache }
    }

    #[instrument(skip(self, draft), fields(sku = %draft.sku), err)]
    pub async fn create(&self, draft: ProductDraft) -> ServiceResult<ProductView> {
        draft.validate().map_err(DomainError::validation)?;
        self.cache.write(|| self.create_uncached(&draft)).await
    }

    async fn create_uncached(&self, draft: &ProductDraft) -> ServiceResult<(ProductView, Invalidation)> {
        if self.stores.products.exists_by_sku(&draft.sku).await? {
            warn!(sku = %draft.sku, "duplicate sku rejected");
            return Err(DomainError::conflict(format!(
                "Product with SKU '{}' already exists",
                draft.sku
            ))
            .into());
        }
        self.require_category(draft.category_id).await?;
        self.require_supplier(draft.supplier_id).await?;

        let product = self.stores.products.insert(draft).await?;
        info!(product_id = %product.id, sku = %product.sku, low_stock = product.is_low_stock(), "product created");

        let view = self.view(&product).await?;
        Ok((view, invalidation_for(&[&product])))
    }

    #[instrument(skip(self), err)]
    pub async fn get(&self, id: ProductId) -> ServiceResult<ProductView> {
        self.cache
            .read(&keys::product(id), || async {
                let product = self.load(id).await?;
                self.view(&product).await
            })
            .await
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_sku(&self, sku: &str) -> ServiceResult<ProductView> {
        self.cache
            .read(&keys::product_by_sku(sku), || async {
                let product = self
                    .stores
                    .products
                    .get_by_sku(sku)
                    .await?
                    .ok_or_else(|| {
                        DomainError::not_found(format!("Product not found with SKU: {sku}"))
                    })?;
                self.view(&product).await
            })
            .await
    }

    #[instrument(skip(self, request), fields(page = request.page(), size = request.size()), err)]
    pub async fn list(
        &self,
        request: PageRequest<ProductSortField>,
    ) -> ServiceResult<Page<ProductView>> {
        self.page(ProductFilter::All, request).await
    }

    /// Replace catalog fields. Inventory quantity is left as stored; an
    /// absent category/supplier clears the assignment.
    #[instrument(skip(self, draft), fields(product_id = %id), err)]
    pub async fn update(&self, id: ProductId, draft: ProductDraft) -> ServiceResult<ProductView> {
        draft.validate().map_err(DomainError::validation)?;
        self.cache.write(|| self.update_uncached(id, draft)).await
    }

    async fn update_uncached(
        &self,
        id: ProductId,
        draft: ProductDraft,
    ) -> ServiceResult<(ProductView, Invalidation)> {
        let current = self.load(id).await?;
        if current.sku != draft.sku && self.stores.products.exists_by_sku(&draft.sku).await? {
            warn!(product_id = %id, sku = %draft.sku, "duplicate sku rejected");
            return Err(DomainError::conflict(format!(
                "Product with SKU '{}' already exists",
                draft.sku
            ))
            .into());
        }
        self.require_category(draft.category_id).await?;
        self.require_supplier(draft.supplier_id).await?;

        let change = self
            .stores
            .products
            .execute(id, &ProductCommand::Revise(draft))
            .await?;
        info!(product_id = %id, "product updated");
        self.finish(change).await
    }

    #[instrument(skip(self), err)]
    pub async fn delete(&self, id: ProductId) -> ServiceResult<()> {
        self.cache
            .write(|| async {
                let removed = self.stores.products.delete(id).await?;
                info!(product_id = %id, sku = %removed.sku, "product deleted");
                Ok(((), invalidation_for(&[&removed])))
            })
            .await
    }

    /// Single-predicate search; see [`ProductSearch::resolve`] for precedence.
    #[instrument(skip(self, request), fields(page = request.page(), size = request.size()), err)]
    pub async fn search(
        &self,
        criteria: ProductSearch,
        request: PageRequest<ProductSortField>,
    ) -> ServiceResult<Page<ProductView>> {
        self.page(criteria.resolve(), request).await
    }

    /// Products whose stored low-stock flag is set, ordered by id.
    #[instrument(skip(self), err)]
    pub async fn list_low_stock(&self) -> ServiceResult<Vec<ProductView>> {
        self.cache
            .read(&keys::products_low_stock(), || async {
                let products = self.stores.products.list(&ProductFilter::LowStock).await?;
                self.views(&products).await
            })
            .await
    }

    #[instrument(skip(self, request), err)]
    pub async fn list_by_category(
        &self,
        category_id: CategoryId,
        request: PageRequest<ProductSortField>,
    ) -> ServiceResult<Page<ProductView>> {
        let filter = ProductFilter::Category(category_id);
        self.cache
            .read(&keys::products_page(&filter, &request), || async {
                self.require_category(Some(category_id)).await?;
                self.load_page(&filter, &request).await
            })
            .await
    }

    #[instrument(skip(self, request), err)]
    pub async fn list_by_supplier(
        &self,
        supplier_id: SupplierId,
        request: PageRequest<ProductSortField>,
    ) -> ServiceResult<Page<ProductView>> {
        self.page(ProductFilter::Supplier(supplier_id), request).await
    }

    #[instrument(skip(self), err)]
    pub async fn get_quantity(&self, id: ProductId) -> ServiceResult<i64> {
        Ok(self.get(id).await?.inventory_quantity)
    }

    #[instrument(skip(self), err)]
    pub async fn set_quantity(&self, id: ProductId, quantity: i64) -> ServiceResult<ProductView> {
        self.adjust(id, StockMovement::Set(quantity)).await
    }

    #[instrument(skip(self), err)]
    pub async fn increase(&self, id: ProductId, delta: i64) -> ServiceResult<ProductView> {
        self.adjust(id, StockMovement::Increase(delta)).await
    }

    /// Fails with `InsufficientInventory` (quantity unchanged) if the result
    /// would be negative.
    #[instrument(skip(self), err)]
    pub async fn decrease(&self, id: ProductId, delta: i64) -> ServiceResult<ProductView> {
        self.adjust(id, StockMovement::Decrease(delta)).await
    }

    #[instrument(skip(self), err)]
    pub async fn assign_category(
        &self,
        id: ProductId,
        category_id: CategoryId,
    ) -> ServiceResult<ProductView> {
        self.cache
            .write(|| async {
                self.load(id).await?;
                self.require_category(Some(category_id)).await?;
                let change = self
                    .stores
                    .products
                    .execute(id, &ProductCommand::AssignCategory(category_id))
                    .await?;
                info!(product_id = %id, category_id = %category_id, "category assigned");
                self.finish(change).await
            })
            .await
    }

    #[instrument(skip(self), err)]
    pub async fn assign_supplier(
        &self,
        id: ProductId,
        supplier_id: SupplierId,
    ) -> ServiceResult<ProductView> {
        self.cache
            .write(|| async {
                self.load(id).await?;
                self.require_supplier(Some(supplier_id)).await?;
                let change = self
                    .stores
                    .products
                    .execute(id, &ProductCommand::AssignSupplier(supplier_id))
                    .await?;
                info!(product_id = %id, supplier_id = %supplier_id, "supplier assigned");
                self.finish(change).await
            })
            .await
    }

    async fn adjust(&self, id: ProductId, movement: StockMovement) -> ServiceResult<ProductView> {
        // Reject bad amounts before taking the write fence.
        movement.validate()?;
        self.cache
            .write(|| async {
                let change = match self
                    .stores
                    .products
                    .execute(id, &ProductCommand::AdjustStock(movement))
                    .await
                {
                    Ok(change) => change,
                    Err(e) => {
                        warn!(product_id = %id, movement = movement.name(), amount = movement.amount(), error = %e, "inventory change rejected");
                        return Err(e.into());
                    }
                };
                info!(
                    product_id = %id,
                    movement = movement.name(),
                    amount = movement.amount(),
                    quantity = change.after.quantity(),
                    low_stock = change.after.is_low_stock(),
                    "inventory adjusted"
                );
                self.finish(change).await
            })
            .await
    }

    async fn finish(&self, change: ProductChange) -> ServiceResult<(ProductView, Invalidation)> {
        let view = self.view(&change.after).await?;
        Ok((view, invalidation_for(&[&change.before, &change.after])))
    }

    async fn page(
        &self,
        filter: ProductFilter,
        request: PageRequest<ProductSortField>,
    ) -> ServiceResult<Page<ProductView>> {
        self.cache
            .read(&keys::products_page(&filter, &request), || {
                self.load_page(&filter, &request)
            })
            .await
    }

    async fn load_page(
        &self,
        filter: &ProductFilter,
        request: &PageRequest<ProductSortField>,
    ) -> ServiceResult<Page<ProductView>> {
        let (products, total) = self.stores.products.page(filter, request).await?;
        let views = self.views(&products).await?;
        Ok(Page::new(views, total, request))
    }

    async fn load(&self, id: ProductId) -> ServiceResult<Product> {
        self.stores
            .products
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Product not found with id: {id}")).into())
    }

    async fn require_category(&self, id: Option<CategoryId>) -> ServiceResult<()> {
        if let Some(id) = id {
            if self.stores.categories.get(id).await?.is_none() {
                return Err(DomainError::not_found(format!("Category not found with id: {id}")).into());
            }
        }
        Ok(())
    }

    async fn require_supplier(&self, id: Option<SupplierId>) -> ServiceResult<()> {
        if let Some(id) = id {
            if self.stores.suppliers.get(id).await?.is_none() {
                return Err(DomainError::not_found(format!("Supplier not found with id: {id}")).into());
            }
        }
        Ok(())
    }

    async fn view(&self, product: &Product) -> ServiceResult<ProductView> {
        Ok(self.views(std::slice::from_ref(product)).await?.remove(0))
    }

    /// Resolve category/supplier names, each referenced parent fetched once.
    async fn views(&self, products: &[Product]) -> ServiceResult<Vec<ProductView>> {
        let mut category_names: HashMap<CategoryId, Option<String>> = HashMap::new();
        let mut supplier_names: HashMap<SupplierId, Option<String>> = HashMap::new();

        for product in products {
            if let Some(id) = product.category_id {
                if !category_names.contains_key(&id) {
                    let name = self.stores.categories.get(id).await?.map(|c| c.name);
                    category_names.insert(id, name);
                }
            }
            if let Some(id) = product.supplier_id {
                if !supplier_names.contains_key(&id) {
                    let name = self.stores.suppliers.get(id).await?.map(|s| s.name);
                    supplier_names.insert(id, name);
                }
            }
        }

        Ok(products
            .iter()
            .map(|p| {
                ProductView::new(
                    p,
                    p.category_id
                        .and_then(|id| category_names.get(&id).cloned().flatten()),
                    p.supplier_id
                        .and_then(|id| supplier_names.get(&id).cloned().flatten()),
                )
            })
            .collect())
    }
}
