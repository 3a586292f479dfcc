use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use stockroom_core::{DomainError, Page, PageRequest, SupplierId};
use stockroom_suppliers::{Supplier, SupplierDraft, SupplierSearch, SupplierSortField};

use crate::cache::{Invalidation, ReadThroughCache, keys};
use crate::store::Stores;

use super::{ServiceResult, SupplierView};

#[derive(Clone)]
pub struct SupplierService {
    stores: Stores,
    cache: Arc<ReadThroughCache>,
}

fn invalidation_for(id: SupplierId) -> Invalidation {
    Invalidation::new()
        .key(keys::supplier(id))
        .prefix(keys::SUPPLIERS)
        .prefix(keys::PRODUCT)
        .prefix(keys::PRODUCTS)
}

impl SupplierService {
    pub fn new(stores: Stores, cache: Arc<ReadThroughCache>) -> Self {
        Self { stores, cache }
    }

    #[instrument(skip(self, draft), fields(name = %draft.name), err)]
    pub async fn create(&self, draft: SupplierDraft) -> ServiceResult<SupplierView> {
        draft.validate().map_err(DomainError::validation)?;
        self.cache
            .write(|| async {
                self.require_unused_name(&draft.name).await?;
                let supplier = self.stores.suppliers.insert(&draft).await?;
                info!(supplier_id = %supplier.id, active = supplier.active, "supplier created");
                let id = supplier.id;
                Ok((SupplierView::new(supplier, 0), invalidation_for(id)))
            })
            .await
    }

    #[instrument(skip(self), err)]
    pub async fn get(&self, id: SupplierId) -> ServiceResult<SupplierView> {
        self.cache
            .read(&keys::supplier(id), || async {
                let supplier = self.load(id).await?;
                self.view(supplier).await
            })
            .await
    }

    /// The supplier together with the number of products it supplies.
    pub async fn get_with_products(&self, id: SupplierId) -> ServiceResult<SupplierView> {
        self.get(id).await
    }

    /// A case-differing re-submission of the current name is not a rename and
    /// skips the uniqueness check.
    #[instrument(skip(self, draft), fields(supplier_id = %id), err)]
    pub async fn update(&self, id: SupplierId, draft: SupplierDraft) -> ServiceResult<SupplierView> {
        draft.validate().map_err(DomainError::validation)?;
        self.cache
            .write(|| async {
                let mut supplier = self.load(id).await?;
                if supplier.is_renamed_to(&draft.name) {
                    self.require_unused_name(&draft.name).await?;
                }
                supplier.revise(&draft, Utc::now());
                let supplier = self.stores.suppliers.update(&supplier).await?;
                info!(supplier_id = %id, "supplier updated");
                Ok((self.view(supplier).await?, invalidation_for(id)))
            })
            .await
    }

    /// Refused with `Conflict` while any product references the supplier.
    #[instrument(skip(self), err)]
    pub async fn delete(&self, id: SupplierId) -> ServiceResult<()> {
        self.cache
            .write(|| async {
                self.load(id).await?;
                let count = self.stores.products.count_by_supplier(id).await?;
                if count > 0 {
                    warn!(supplier_id = %id, product_count = count, "supplier delete refused");
                    return Err(DomainError::conflict(
                        "Cannot delete supplier with associated products. Please reassign or remove products first.",
                    )
                    .into());
                }
                self.stores.suppliers.delete(id).await?;
                info!(supplier_id = %id, "supplier deleted");
                Ok(((), invalidation_for(id)))
            })
            .await
    }

    #[instrument(skip(self, request), fields(page = request.page(), size = request.size()), err)]
    pub async fn list(
        &self,
        request: PageRequest<SupplierSortField>,
    ) -> ServiceResult<Page<SupplierView>> {
        self.page(SupplierSearch::default(), request).await
    }

    /// Conjunctive search; blank text predicates are ignored.
    #[instrument(skip(self, criteria, request), err)]
    pub async fn search(
        &self,
        criteria: SupplierSearch,
        request: PageRequest<SupplierSortField>,
    ) -> ServiceResult<Page<SupplierView>> {
        self.page(criteria.normalized(), request).await
    }

    #[instrument(skip(self, request), err)]
    pub async fn list_active(
        &self,
        request: PageRequest<SupplierSortField>,
    ) -> ServiceResult<Page<SupplierView>> {
        self.page(SupplierSearch::active(true), request).await
    }

    #[instrument(skip(self, request), err)]
    pub async fn list_inactive(
        &self,
        request: PageRequest<SupplierSortField>,
    ) -> ServiceResult<Page<SupplierView>> {
        self.page(SupplierSearch::active(false), request).await
    }

    /// Active suppliers ordered by name, unpaged.
    #[instrument(skip(self), err)]
    pub async fn dropdown(&self) -> ServiceResult<Vec<SupplierView>> {
        self.cache
            .read(&keys::suppliers_dropdown(), || async {
                let mut views = Vec::new();
                for supplier in self.stores.suppliers.list_active_by_name().await? {
                    views.push(self.view(supplier).await?);
                }
                Ok(views)
            })
            .await
    }

    #[instrument(skip(self), err)]
    pub async fn activate(&self, id: SupplierId) -> ServiceResult<SupplierView> {
        self.set_active(id, true).await
    }

    #[instrument(skip(self), err)]
    pub async fn deactivate(&self, id: SupplierId) -> ServiceResult<SupplierView> {
        self.set_active(id, false).await
    }

    /// Case-insensitive.
    #[instrument(skip(self), err)]
    pub async fn exists_by_name(&self, name: &str) -> ServiceResult<bool> {
        self.cache
            .read(&keys::supplier_name_exists(name), || async {
                Ok(self.stores.suppliers.exists_by_name(name).await?)
            })
            .await
    }

    async fn set_active(&self, id: SupplierId, active: bool) -> ServiceResult<SupplierView> {
        self.cache
            .write(|| async {
                let mut supplier = self.load(id).await?;
                supplier.set_active(active, Utc::now());
                let supplier = self.stores.suppliers.update(&supplier).await?;
                info!(supplier_id = %id, active, "supplier active flag changed");
                Ok((self.view(supplier).await?, invalidation_for(id)))
            })
            .await
    }

    async fn page(
        &self,
        search: SupplierSearch,
        request: PageRequest<SupplierSortField>,
    ) -> ServiceResult<Page<SupplierView>> {
        self.cache
            .read(&keys::suppliers_page(&search, &request), || async {
                let (suppliers, total) = self.stores.suppliers.page(&search, &request).await?;
                let mut views = Vec::with_capacity(suppliers.len());
                for supplier in suppliers {
                    views.push(self.view(supplier).await?);
                }
                Ok(Page::new(views, total, &request))
            })
            .await
    }

    async fn require_unused_name(&self, name: &str) -> ServiceResult<()> {
        if self.stores.suppliers.exists_by_name(name).await? {
            warn!(name, "duplicate supplier name rejected");
            return Err(DomainError::conflict(format!(
                "Supplier with name '{name}' already exists"
            ))
            .into());
        }
        Ok(())
    }

    async fn load(&self, id: SupplierId) -> ServiceResult<Supplier> {
        self.stores
            .suppliers
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Supplier not found with id: {id}")).into())
    }

    async fn view(&self, supplier: Supplier) -> ServiceResult<SupplierView> {
        let count = self.stores.products.count_by_supplier(supplier.id).await?;
        Ok(SupplierView::new(supplier, count))
    }
}
