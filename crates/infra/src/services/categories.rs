use std::sync::Arc;

use tracing::{info, instrument, warn};

use stockroom_core::{CategoryId, DomainError};
use stockroom_products::{Category, CategoryDraft};

use crate::cache::{Invalidation, ReadThroughCache, keys};
use crate::store::Stores;

use super::{CategoryView, ServiceResult};

#[derive(Clone)]
pub struct CategoryService {
    stores: Stores,
    cache: Arc<ReadThroughCache>,
}

/// Product views carry the category name and by-category listings check the
/// category exists, so product entries go stale too.
fn invalidation_for(id: CategoryId) -> Invalidation {
    Invalidation::new()
        .key(keys::category(id))
        .prefix(keys::CATEGORIES)
        .prefix(keys::PRODUCT)
        .prefix(keys::PRODUCTS)
}

impl CategoryService {
    pub fn new(stores: Stores, cache: Arc<ReadThroughCache>) -> Self {
        Self { stores, cache }
    }

    #[instrument(skip(self, draft), fields(name = %draft.name), err)]
    pub async fn create(&self, draft: CategoryDraft) -> ServiceResult<CategoryView> {
        draft.validate().map_err(DomainError::validation)?;
        self.cache
            .write(|| async {
                self.require_unused_name(&draft.name).await?;
                let category = self.stores.categories.insert(&draft).await?;
                info!(category_id = %category.id, "category created");
                let id = category.id;
                Ok((CategoryView::new(category, 0), invalidation_for(id)))
            })
            .await
    }

    #[instrument(skip(self), err)]
    pub async fn get(&self, id: CategoryId) -> ServiceResult<CategoryView> {
        self.cache
            .read(&keys::category(id), || async {
                let category = self.load(id).await?;
                self.view(category).await
            })
            .await
    }

    /// Every category with its product count, ordered by id.
    #[instrument(skip(self), err)]
    pub async fn list(&self) -> ServiceResult<Vec<CategoryView>> {
        self.cache
            .read(&keys::categories_all(), || async {
                let mut views = Vec::new();
                for category in self.stores.categories.list().await? {
                    views.push(self.view(category).await?);
                }
                Ok(views)
            })
            .await
    }

    #[instrument(skip(self, draft), fields(category_id = %id), err)]
    pub async fn update(&self, id: CategoryId, draft: CategoryDraft) -> ServiceResult<CategoryView> {
        draft.validate().map_err(DomainError::validation)?;
        self.cache
            .write(|| async {
                let mut category = self.load(id).await?;
                if category.is_renamed_by(&draft) {
                    self.require_unused_name(&draft.name).await?;
                }
                category.revise(&draft);
                let category = self.stores.categories.update(&category).await?;
                info!(category_id = %id, "category updated");
                Ok((self.view(category).await?, invalidation_for(id)))
            })
            .await
    }

    /// Refused with `Conflict` while any product references the category.
    #[instrument(skip(self), err)]
    pub async fn delete(&self, id: CategoryId) -> ServiceResult<()> {
        self.cache
            .write(|| async {
                self.load(id).await?;
                let count = self.stores.products.count_by_category(id).await?;
                if count > 0 {
                    warn!(category_id = %id, product_count = count, "category delete refused");
                    return Err(DomainError::conflict(
                        "Cannot delete category with associated products. Remove products first or reassign them to another category.",
                    )
                    .into());
                }
                self.stores.categories.delete(id).await?;
                info!(category_id = %id, "category deleted");
                Ok(((), invalidation_for(id)))
            })
            .await
    }

    async fn require_unused_name(&self, name: &str) -> ServiceResult<()> {
        if self.stores.categories.exists_by_name(name).await? {
            warn!(name, "duplicate category name rejected");
            return Err(DomainError::conflict(format!(
                "Category with name '{name}' already exists"
            ))
            .into());
        }
        Ok(())
    }

    async fn load(&self, id: CategoryId) -> ServiceResult<Category> {
        self.stores
            .categories
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Category not found with id: {id}")).into())
    }

    async fn view(&self, category: Category) -> ServiceResult<CategoryView> {
        let count = self.stores.products.count_by_category(category.id).await?;
        Ok(CategoryView::new(category, count))
    }
}
