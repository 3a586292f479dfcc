use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use stockroom_core::{Aggregate, CategoryId, Entity, Page, PageRequest, ProductId, SupplierId};
use stockroom_products::{
    Category, CategoryDraft, Product, ProductCommand, ProductDraft, ProductFilter,
    ProductSortField,
};
use stockroom_suppliers::{
    Supplier, SupplierDraft, SupplierSearch, SupplierSortField, supplier::names_match,
};

use super::r#trait::{
    CategoryStore, ProductChange, ProductStore, StoreError, StoreResult, SupplierStore,
    category_not_found, product_not_found, supplier_not_found,
};

/// Write `entity` under its own id and hand back the stored copy.
fn put<E: Entity + Clone>(table: &mut BTreeMap<E::Id, E>, entity: E) -> E {
    table.insert(entity.id(), entity.clone());
    entity
}

#[derive(Debug, Default)]
struct Tables {
    products: BTreeMap<ProductId, Product>,
    categories: BTreeMap<CategoryId, Category>,
    suppliers: BTreeMap<SupplierId, Supplier>,
    product_seq: i64,
    category_seq: i64,
    supplier_seq: i64,
}

impl Tables {
    fn check_references(
        &self,
        category_id: Option<CategoryId>,
        supplier_id: Option<SupplierId>,
    ) -> StoreResult<()> {
        if let Some(id) = category_id {
            if !self.categories.contains_key(&id) {
                return Err(StoreError::ReferenceViolation(format!(
                    "category {id} does not exist"
                )));
            }
        }
        if let Some(id) = supplier_id {
            if !self.suppliers.contains_key(&id) {
                return Err(StoreError::ReferenceViolation(format!(
                    "supplier {id} does not exist"
                )));
            }
        }
        Ok(())
    }

    fn sku_taken(&self, sku: &str, except: Option<ProductId>) -> bool {
        self.products
            .values()
            .any(|p| p.sku == sku && Some(p.id) != except)
    }

    fn supplier_name_taken(&self, name: &str, except: Option<SupplierId>) -> bool {
        self.suppliers
            .values()
            .any(|s| names_match(&s.name, name) && Some(s.id) != except)
    }
}

/// In-memory entity store for tests/dev.
///
/// All three tables live behind one lock, so foreign keys, uniqueness and
/// read-modify-write are enforced exactly like a single database would.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }
}

fn paginate<T: Clone, F>(items: Vec<T>, request: &PageRequest<F>) -> (Vec<T>, u64) {
    let page = Page::from_sorted(items, request);
    (page.content, page.total_elements)
}

#[async_trait::async_trait]
impl ProductStore for InMemoryStore {
    async fn get(&self, id: ProductId) -> StoreResult<Option<Product>> {
        Ok(self.read()?.products.get(&id).cloned())
    }

    async fn get_by_sku(&self, sku: &str) -> StoreResult<Option<Product>> {
        Ok(self
            .read()?
            .products
            .values()
            .find(|p| p.sku == sku)
            .cloned())
    }

    async fn exists_by_sku(&self, sku: &str) -> StoreResult<bool> {
        Ok(self.read()?.sku_taken(sku, None))
    }

    async fn insert(&self, draft: &ProductDraft) -> StoreResult<Product> {
        let mut tables = self.write()?;
        if tables.sku_taken(&draft.sku, None) {
            return Err(StoreError::UniqueViolation(format!(
                "sku '{}' already exists",
                draft.sku
            )));
        }
        tables.check_references(draft.category_id, draft.supplier_id)?;

        tables.product_seq += 1;
        let product = Product::from_draft(ProductId::new(tables.product_seq), draft);
        Ok(put(&mut tables.products, product))
    }

    async fn execute(&self, id: ProductId, command: &ProductCommand) -> StoreResult<ProductChange> {
        let mut tables = self.write()?;
        let before = tables
            .products
            .get(&id)
            .cloned()
            .ok_or_else(|| product_not_found(id))?;

        let mut after = before.clone();
        after.execute(command)?;

        if after.sku != before.sku && tables.sku_taken(&after.sku, Some(id)) {
            return Err(StoreError::UniqueViolation(format!(
                "sku '{}' already exists",
                after.sku
            )));
        }
        tables.check_references(after.category_id, after.supplier_id)?;

        let after = put(&mut tables.products, after);
        Ok(ProductChange { before, after })
    }

    async fn delete(&self, id: ProductId) -> StoreResult<Product> {
        self.write()?
            .products
            .remove(&id)
            .ok_or_else(|| product_not_found(id))
    }

    async fn count_by_category(&self, category_id: CategoryId) -> StoreResult<u64> {
        Ok(self
            .read()?
            .products
            .values()
            .filter(|p| p.category_id == Some(category_id))
            .count() as u64)
    }

    async fn count_by_supplier(&self, supplier_id: SupplierId) -> StoreResult<u64> {
        Ok(self
            .read()?
            .products
            .values()
            .filter(|p| p.supplier_id == Some(supplier_id))
            .count() as u64)
    }

    async fn page(
        &self,
        filter: &ProductFilter,
        request: &PageRequest<ProductSortField>,
    ) -> StoreResult<(Vec<Product>, u64)> {
        let mut items: Vec<Product> = self
            .read()?
            .products
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        let field = *request.sort();
        let direction = request.direction();
        items.sort_by(|a, b| field.ordering(direction, a, b));
        Ok(paginate(items, request))
    }

    async fn list(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>> {
        Ok(self
            .read()?
            .products
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl CategoryStore for InMemoryStore {
    async fn get(&self, id: CategoryId) -> StoreResult<Option<Category>> {
        Ok(self.read()?.categories.get(&id).cloned())
    }

    async fn get_by_name(&self, name: &str) -> StoreResult<Option<Category>> {
        Ok(self
            .read()?
            .categories
            .values()
            .find(|c| c.name == name)
            .cloned())
    }

    async fn exists_by_name(&self, name: &str) -> StoreResult<bool> {
        Ok(self.read()?.categories.values().any(|c| c.name == name))
    }

    async fn insert(&self, draft: &CategoryDraft) -> StoreResult<Category> {
        let mut tables = self.write()?;
        if tables.categories.values().any(|c| c.name == draft.name) {
            return Err(StoreError::UniqueViolation(format!(
                "category name '{}' already exists",
                draft.name
            )));
        }
        tables.category_seq += 1;
        let category = Category::from_draft(CategoryId::new(tables.category_seq), draft);
        Ok(put(&mut tables.categories, category))
    }

    async fn update(&self, category: &Category) -> StoreResult<Category> {
        let mut tables = self.write()?;
        if !tables.categories.contains_key(&category.id) {
            return Err(category_not_found(category.id));
        }
        if tables
            .categories
            .values()
            .any(|c| c.name == category.name && c.id != category.id)
        {
            return Err(StoreError::UniqueViolation(format!(
                "category name '{}' already exists",
                category.name
            )));
        }
        Ok(put(&mut tables.categories, category.clone()))
    }

    async fn delete(&self, id: CategoryId) -> StoreResult<()> {
        let mut tables = self.write()?;
        if !tables.categories.contains_key(&id) {
            return Err(category_not_found(id));
        }
        if tables.products.values().any(|p| p.category_id == Some(id)) {
            return Err(StoreError::ReferenceViolation(format!(
                "category {id} is referenced by products"
            )));
        }
        tables.categories.remove(&id);
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<Category>> {
        Ok(self.read()?.categories.values().cloned().collect())
    }
}

#[async_trait::async_trait]
impl SupplierStore for InMemoryStore {
    async fn get(&self, id: SupplierId) -> StoreResult<Option<Supplier>> {
        Ok(self.read()?.suppliers.get(&id).cloned())
    }

    async fn get_by_name(&self, name: &str) -> StoreResult<Option<Supplier>> {
        Ok(self
            .read()?
            .suppliers
            .values()
            .find(|s| names_match(&s.name, name))
            .cloned())
    }

    async fn exists_by_name(&self, name: &str) -> StoreResult<bool> {
        Ok(self.read()?.supplier_name_taken(name, None))
    }

    async fn insert(&self, draft: &SupplierDraft) -> StoreResult<Supplier> {
        let mut tables = self.write()?;
        if tables.supplier_name_taken(&draft.name, None) {
            return Err(StoreError::UniqueViolation(format!(
                "supplier name '{}' already exists",
                draft.name
            )));
        }
        tables.supplier_seq += 1;
        let supplier =
            Supplier::from_draft(SupplierId::new(tables.supplier_seq), draft, Utc::now());
        Ok(put(&mut tables.suppliers, supplier))
    }

    async fn update(&self, supplier: &Supplier) -> StoreResult<Supplier> {
        let mut tables = self.write()?;
        let created_at = tables
            .suppliers
            .get(&supplier.id)
            .map(|s| s.created_at)
            .ok_or_else(|| supplier_not_found(supplier.id))?;
        if tables.supplier_name_taken(&supplier.name, Some(supplier.id)) {
            return Err(StoreError::UniqueViolation(format!(
                "supplier name '{}' already exists",
                supplier.name
            )));
        }
        let mut stored = supplier.clone();
        stored.created_at = created_at;
        stored.updated_at = Utc::now();
        Ok(put(&mut tables.suppliers, stored))
    }

    async fn delete(&self, id: SupplierId) -> StoreResult<()> {
        let mut tables = self.write()?;
        if !tables.suppliers.contains_key(&id) {
            return Err(supplier_not_found(id));
        }
        if tables.products.values().any(|p| p.supplier_id == Some(id)) {
            return Err(StoreError::ReferenceViolation(format!(
                "supplier {id} is referenced by products"
            )));
        }
        tables.suppliers.remove(&id);
        Ok(())
    }

    async fn page(
        &self,
        search: &SupplierSearch,
        request: &PageRequest<SupplierSortField>,
    ) -> StoreResult<(Vec<Supplier>, u64)> {
        let mut items: Vec<Supplier> = self
            .read()?
            .suppliers
            .values()
            .filter(|s| search.matches(s))
            .cloned()
            .collect();
        let field = *request.sort();
        let direction = request.direction();
        items.sort_by(|a, b| field.ordering(direction, a, b));
        Ok(paginate(items, request))
    }

    async fn list_active_by_name(&self) -> StoreResult<Vec<Supplier>> {
        let mut items: Vec<Supplier> = self
            .read()?
            .suppliers
            .values()
            .filter(|s| s.active)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(items)
    }
}
