//! Postgres-backed entity store.
//!
//! ## Error Mapping
//!
//! | PostgreSQL Error Code | StoreError | Scenario |
//! |----------------------|------------|----------|
//! | `23505` | `UniqueViolation` | Duplicate SKU / category name / supplier name |
//! | `23503` | `ReferenceViolation` | Dangling category/supplier, or delete of a referenced parent |
//! | `23514` | `Backend` | Check constraint (price, quantity, threshold) slipped past the domain |
//! | other / pool / IO | `Backend` | Anything else |
//!
//! Prices are stored as integer cents. Inventory read-modify-write runs in a
//! transaction holding `SELECT ... FOR UPDATE` on the product row.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Row};
use tracing::{Span, instrument};

use stockroom_core::{
    Aggregate, CategoryId, PageRequest, Price, ProductId, SortDirection, SupplierId,
};
use stockroom_inventory::StockLevel;
use stockroom_products::{
    Category, CategoryDraft, Product, ProductCommand, ProductDraft, ProductFilter,
    ProductSortField,
};
use stockroom_suppliers::{Supplier, SupplierDraft, SupplierSearch, SupplierSortField};

use super::r#trait::{
    CategoryStore, ProductChange, ProductStore, StoreError, StoreResult, SupplierStore,
    category_not_found, product_not_found, supplier_not_found,
};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS categories (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(100) NOT NULL UNIQUE,
        description TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS suppliers (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        contact_person VARCHAR(100) NOT NULL,
        email VARCHAR(100),
        phone VARCHAR(20),
        address VARCHAR(255),
        city VARCHAR(100),
        country VARCHAR(100),
        postal_code VARCHAR(20),
        notes TEXT,
        active BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS suppliers_name_ci_key ON suppliers (lower(name))",
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT NOT NULL,
        price_cents BIGINT NOT NULL CHECK (price_cents > 0),
        inventory_quantity BIGINT NOT NULL CHECK (inventory_quantity >= 0),
        sku TEXT NOT NULL UNIQUE,
        category_id BIGINT REFERENCES categories (id),
        supplier_id BIGINT REFERENCES suppliers (id),
        low_stock_threshold BIGINT CHECK (low_stock_threshold >= 1),
        low_stock BOOLEAN NOT NULL DEFAULT FALSE
    )
    "#,
    "CREATE INDEX IF NOT EXISTS products_category_id_idx ON products (category_id)",
    "CREATE INDEX IF NOT EXISTS products_supplier_id_idx ON products (supplier_id)",
];

const PRODUCT_COLUMNS: &str = "id, name, description, price_cents, inventory_quantity, sku, \
     category_id, supplier_id, low_stock_threshold, low_stock";

const SUPPLIER_COLUMNS: &str = "id, name, contact_person, email, phone, address, city, country, \
     postal_code, notes, active, created_at, updated_at";

/// Product filter flattened into nullable SQL parameters.
const PRODUCT_WHERE: &str = r#"
    ($1::text IS NULL OR strpos(lower(name), lower($1)) > 0)
    AND ($2::bigint IS NULL OR category_id = $2)
    AND ($3::bigint IS NULL OR supplier_id = $3)
    AND ($4::bigint IS NULL OR price_cents >= $4)
    AND ($5::bigint IS NULL OR price_cents <= $5)
    AND ($6::boolean IS NOT TRUE OR inventory_quantity > 0)
    AND ($7::boolean IS NOT TRUE OR low_stock)
"#;

const SUPPLIER_WHERE: &str = r#"
    ($1::text IS NULL OR strpos(lower(name), lower($1)) > 0)
    AND ($2::text IS NULL OR strpos(lower(contact_person), lower($2)) > 0)
    AND ($3::text IS NULL OR lower(city) = lower($3))
    AND ($4::text IS NULL OR lower(country) = lower($4))
    AND ($5::boolean IS NULL OR active = $5)
"#;

/// Postgres-backed store for products, categories and suppliers.
///
/// Uses SQLx connection pool which is thread-safe (Arc + Send + Sync).
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect a bounded pool.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Apply the schema. Idempotent.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("migrate", e))?;
        }
        Ok(())
    }

    async fn fetch_product(&self, sql: &str, bind: ProductKey<'_>) -> StoreResult<Option<Product>> {
        let query = sqlx::query(sql);
        let query = match bind {
            ProductKey::Id(id) => query.bind(id.value()),
            ProductKey::Sku(sku) => query.bind(sku),
        };
        let row = query
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("fetch_product", e))?;
        row.map(|r| decode::<ProductRow>(&r).map(Product::from))
            .transpose()
    }

    async fn count_products(&self, column: &str, id: i64) -> StoreResult<u64> {
        let sql = format!("SELECT COUNT(*) AS total FROM products WHERE {column} = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_products", e))?;
        read_total(&row)
    }
}

enum ProductKey<'a> {
    Id(ProductId),
    Sku(&'a str),
}

#[derive(Debug, Default)]
struct ProductFilterParams {
    name: Option<String>,
    category_id: Option<i64>,
    supplier_id: Option<i64>,
    min_cents: Option<i64>,
    max_cents: Option<i64>,
    in_stock: bool,
    low_stock: bool,
}

impl From<&ProductFilter> for ProductFilterParams {
    fn from(filter: &ProductFilter) -> Self {
        let mut params = Self::default();
        match filter {
            ProductFilter::All => {}
            ProductFilter::NameContains(name) => params.name = Some(name.clone()),
            ProductFilter::Category(id) => params.category_id = Some(id.value()),
            ProductFilter::Supplier(id) => params.supplier_id = Some(id.value()),
            ProductFilter::PriceBetween { min, max } => {
                params.min_cents = Some(min.cents());
                params.max_cents = Some(max.cents());
            }
            ProductFilter::InStock => params.in_stock = true,
            ProductFilter::LowStock => params.low_stock = true,
        }
        params
    }
}

fn order_by(column: &str, direction: SortDirection) -> String {
    // Option<T> sorts None first; keep NULLs on the same side.
    let nulls = match direction {
        SortDirection::Asc => "NULLS FIRST",
        SortDirection::Desc => "NULLS LAST",
    };
    format!("ORDER BY {column} {} {nulls}, id ASC", direction.as_sql())
}

#[async_trait::async_trait]
impl ProductStore for PostgresStore {
    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn get(&self, id: ProductId) -> StoreResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        self.fetch_product(&sql, ProductKey::Id(id)).await
    }

    #[instrument(skip(self), err)]
    async fn get_by_sku(&self, sku: &str) -> StoreResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE sku = $1");
        self.fetch_product(&sql, ProductKey::Sku(sku)).await
    }

    #[instrument(skip(self), err)]
    async fn exists_by_sku(&self, sku: &str) -> StoreResult<bool> {
        let row = sqlx::query("SELECT EXISTS (SELECT 1 FROM products WHERE sku = $1) AS found")
            .bind(sku)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("exists_by_sku", e))?;
        row.try_get("found")
            .map_err(|e| map_sqlx_error("exists_by_sku", e))
    }

    #[instrument(skip(self, draft), fields(sku = %draft.sku, product_id), err)]
    async fn insert(&self, draft: &ProductDraft) -> StoreResult<Product> {
        let stock = StockLevel::new(draft.inventory_quantity, draft.low_stock_threshold);
        let sql = format!(
            r#"
            INSERT INTO products (
                name, description, price_cents, inventory_quantity, sku,
                category_id, supplier_id, low_stock_threshold, low_stock
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(draft.price.cents())
            .bind(stock.quantity())
            .bind(&draft.sku)
            .bind(draft.category_id.map(|id| id.value()))
            .bind(draft.supplier_id.map(|id| id.value()))
            .bind(stock.threshold())
            .bind(stock.is_low_stock())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_product", e))?;
        let product = Product::from(decode::<ProductRow>(&row)?);
        Span::current().record("product_id", product.id.value());
        Ok(product)
    }

    #[instrument(skip(self, command), fields(product_id = %id), err)]
    async fn execute(&self, id: ProductId, command: &ProductCommand) -> StoreResult<ProductChange> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 FOR UPDATE");
        let row = sqlx::query(&sql)
            .bind(id.value())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("lock_product", e))?
            .ok_or_else(|| product_not_found(id))?;
        let before = Product::from(decode::<ProductRow>(&row)?);

        let mut after = before.clone();
        // Dropping `tx` on the error path rolls back and releases the row lock.
        after.execute(command)?;

        sqlx::query(
            r#"
            UPDATE products SET
                name = $2,
                description = $3,
                price_cents = $4,
                inventory_quantity = $5,
                sku = $6,
                category_id = $7,
                supplier_id = $8,
                low_stock_threshold = $9,
                low_stock = $10
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .bind(&after.name)
        .bind(&after.description)
        .bind(after.price.cents())
        .bind(after.quantity())
        .bind(&after.sku)
        .bind(after.category_id.map(|c| c.value()))
        .bind(after.supplier_id.map(|s| s.value()))
        .bind(after.low_stock_threshold())
        .bind(after.is_low_stock())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_product", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(ProductChange { before, after })
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn delete(&self, id: ProductId) -> StoreResult<Product> {
        let sql = format!("DELETE FROM products WHERE id = $1 RETURNING {PRODUCT_COLUMNS}");
        let row = sqlx::query(&sql)
            .bind(id.value())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_product", e))?
            .ok_or_else(|| product_not_found(id))?;
        Ok(Product::from(decode::<ProductRow>(&row)?))
    }

    async fn count_by_category(&self, category_id: CategoryId) -> StoreResult<u64> {
        self.count_products("category_id", category_id.value()).await
    }

    async fn count_by_supplier(&self, supplier_id: SupplierId) -> StoreResult<u64> {
        self.count_products("supplier_id", supplier_id.value()).await
    }

    #[instrument(skip(self, request), fields(page = request.page(), size = request.size(), total), err)]
    async fn page(
        &self,
        filter: &ProductFilter,
        request: &PageRequest<ProductSortField>,
    ) -> StoreResult<(Vec<Product>, u64)> {
        let params = ProductFilterParams::from(filter);

        let count_sql = format!("SELECT COUNT(*) AS total FROM products WHERE {PRODUCT_WHERE}");
        let count_row = sqlx::query(&count_sql)
            .bind(params.name.as_deref())
            .bind(params.category_id)
            .bind(params.supplier_id)
            .bind(params.min_cents)
            .bind(params.max_cents)
            .bind(params.in_stock)
            .bind(params.low_stock)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_products", e))?;
        let total = read_total(&count_row)?;
        Span::current().record("total", total);

        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE {PRODUCT_WHERE} {} LIMIT $8 OFFSET $9",
            order_by(request.sort().column(), request.direction())
        );
        let rows = sqlx::query(&sql)
            .bind(params.name.as_deref())
            .bind(params.category_id)
            .bind(params.supplier_id)
            .bind(params.min_cents)
            .bind(params.max_cents)
            .bind(params.in_stock)
            .bind(params.low_stock)
            .bind(i64::from(request.size()))
            .bind(i64::try_from(request.offset()).unwrap_or(i64::MAX))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("page_products", e))?;

        let items = rows
            .iter()
            .map(|r| decode::<ProductRow>(r).map(Product::from))
            .collect::<StoreResult<Vec<_>>>()?;
        Ok((items, total))
    }

    #[instrument(skip(self), err)]
    async fn list(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>> {
        let params = ProductFilterParams::from(filter);
        let sql =
            format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE {PRODUCT_WHERE} ORDER BY id ASC");
        let rows = sqlx::query(&sql)
            .bind(params.name.as_deref())
            .bind(params.category_id)
            .bind(params.supplier_id)
            .bind(params.min_cents)
            .bind(params.max_cents)
            .bind(params.in_stock)
            .bind(params.low_stock)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_products", e))?;
        rows.iter()
            .map(|r| decode::<ProductRow>(r).map(Product::from))
            .collect()
    }
}

#[async_trait::async_trait]
impl CategoryStore for PostgresStore {
    #[instrument(skip(self), fields(category_id = %id), err)]
    async fn get(&self, id: CategoryId) -> StoreResult<Option<Category>> {
        let row = sqlx::query("SELECT id, name, description FROM categories WHERE id = $1")
            .bind(id.value())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_category", e))?;
        row.map(|r| decode::<CategoryRow>(&r).map(Category::from))
            .transpose()
    }

    #[instrument(skip(self), err)]
    async fn get_by_name(&self, name: &str) -> StoreResult<Option<Category>> {
        let row = sqlx::query("SELECT id, name, description FROM categories WHERE name = $1")
            .bind(name)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_category_by_name", e))?;
        row.map(|r| decode::<CategoryRow>(&r).map(Category::from))
            .transpose()
    }

    #[instrument(skip(self), err)]
    async fn exists_by_name(&self, name: &str) -> StoreResult<bool> {
        let row = sqlx::query("SELECT EXISTS (SELECT 1 FROM categories WHERE name = $1) AS found")
            .bind(name)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("exists_category", e))?;
        row.try_get("found")
            .map_err(|e| map_sqlx_error("exists_category", e))
    }

    #[instrument(skip(self, draft), fields(name = %draft.name), err)]
    async fn insert(&self, draft: &CategoryDraft) -> StoreResult<Category> {
        let row = sqlx::query(
            "INSERT INTO categories (name, description) VALUES ($1, $2) \
             RETURNING id, name, description",
        )
        .bind(&draft.name)
        .bind(draft.description.as_deref())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_category", e))?;
        Ok(Category::from(decode::<CategoryRow>(&row)?))
    }

    #[instrument(skip(self, category), fields(category_id = %category.id), err)]
    async fn update(&self, category: &Category) -> StoreResult<Category> {
        let row = sqlx::query(
            "UPDATE categories SET name = $2, description = $3 WHERE id = $1 \
             RETURNING id, name, description",
        )
        .bind(category.id.value())
        .bind(&category.name)
        .bind(category.description.as_deref())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_category", e))?
        .ok_or_else(|| category_not_found(category.id))?;
        Ok(Category::from(decode::<CategoryRow>(&row)?))
    }

    #[instrument(skip(self), fields(category_id = %id), err)]
    async fn delete(&self, id: CategoryId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id.value())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_category", e))?;
        if result.rows_affected() == 0 {
            return Err(category_not_found(id));
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn list(&self) -> StoreResult<Vec<Category>> {
        let rows = sqlx::query("SELECT id, name, description FROM categories ORDER BY id ASC")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_categories", e))?;
        rows.iter()
            .map(|r| decode::<CategoryRow>(r).map(Category::from))
            .collect()
    }
}

#[async_trait::async_trait]
impl SupplierStore for PostgresStore {
    #[instrument(skip(self), fields(supplier_id = %id), err)]
    async fn get(&self, id: SupplierId) -> StoreResult<Option<Supplier>> {
        let sql = format!("SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.value())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_supplier", e))?;
        row.map(|r| decode::<SupplierRow>(&r).map(Supplier::from))
            .transpose()
    }

    #[instrument(skip(self), err)]
    async fn get_by_name(&self, name: &str) -> StoreResult<Option<Supplier>> {
        let sql = format!("SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE lower(name) = lower($1)");
        let row = sqlx::query(&sql)
            .bind(name)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_supplier_by_name", e))?;
        row.map(|r| decode::<SupplierRow>(&r).map(Supplier::from))
            .transpose()
    }

    #[instrument(skip(self), err)]
    async fn exists_by_name(&self, name: &str) -> StoreResult<bool> {
        let row = sqlx::query(
            "SELECT EXISTS (SELECT 1 FROM suppliers WHERE lower(name) = lower($1)) AS found",
        )
        .bind(name)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("exists_supplier", e))?;
        row.try_get("found")
            .map_err(|e| map_sqlx_error("exists_supplier", e))
    }

    #[instrument(skip(self, draft), fields(name = %draft.name, supplier_id), err)]
    async fn insert(&self, draft: &SupplierDraft) -> StoreResult<Supplier> {
        let sql = format!(
            r#"
            INSERT INTO suppliers (
                name, contact_person, email, phone, address, city, country,
                postal_code, notes, active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {SUPPLIER_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(&draft.name)
            .bind(&draft.contact_person)
            .bind(draft.email.as_deref())
            .bind(draft.phone.as_deref())
            .bind(draft.address.as_deref())
            .bind(draft.city.as_deref())
            .bind(draft.country.as_deref())
            .bind(draft.postal_code.as_deref())
            .bind(draft.notes.as_deref())
            .bind(draft.active.unwrap_or(true))
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_supplier", e))?;
        let supplier = Supplier::from(decode::<SupplierRow>(&row)?);
        Span::current().record("supplier_id", supplier.id.value());
        Ok(supplier)
    }

    #[instrument(skip(self, supplier), fields(supplier_id = %supplier.id), err)]
    async fn update(&self, supplier: &Supplier) -> StoreResult<Supplier> {
        let sql = format!(
            r#"
            UPDATE suppliers SET
                name = $2,
                contact_person = $3,
                email = $4,
                phone = $5,
                address = $6,
                city = $7,
                country = $8,
                postal_code = $9,
                notes = $10,
                active = $11,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {SUPPLIER_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(supplier.id.value())
            .bind(&supplier.name)
            .bind(&supplier.contact_person)
            .bind(supplier.email.as_deref())
            .bind(supplier.phone.as_deref())
            .bind(supplier.address.as_deref())
            .bind(supplier.city.as_deref())
            .bind(supplier.country.as_deref())
            .bind(supplier.postal_code.as_deref())
            .bind(supplier.notes.as_deref())
            .bind(supplier.active)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_supplier", e))?
            .ok_or_else(|| supplier_not_found(supplier.id))?;
        Ok(Supplier::from(decode::<SupplierRow>(&row)?))
    }

    #[instrument(skip(self), fields(supplier_id = %id), err)]
    async fn delete(&self, id: SupplierId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(id.value())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_supplier", e))?;
        if result.rows_affected() == 0 {
            return Err(supplier_not_found(id));
        }
        Ok(())
    }

    #[instrument(skip(self, request), fields(page = request.page(), size = request.size(), total), err)]
    async fn page(
        &self,
        search: &SupplierSearch,
        request: &PageRequest<SupplierSortField>,
    ) -> StoreResult<(Vec<Supplier>, u64)> {
        let count_sql = format!("SELECT COUNT(*) AS total FROM suppliers WHERE {SUPPLIER_WHERE}");
        let count_row = sqlx::query(&count_sql)
            .bind(search.name.as_deref())
            .bind(search.contact_person.as_deref())
            .bind(search.city.as_deref())
            .bind(search.country.as_deref())
            .bind(search.active)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_suppliers", e))?;
        let total = read_total(&count_row)?;
        Span::current().record("total", total);

        let sql = format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE {SUPPLIER_WHERE} {} LIMIT $6 OFFSET $7",
            order_by(request.sort().column(), request.direction())
        );
        let rows = sqlx::query(&sql)
            .bind(search.name.as_deref())
            .bind(search.contact_person.as_deref())
            .bind(search.city.as_deref())
            .bind(search.country.as_deref())
            .bind(search.active)
            .bind(i64::from(request.size()))
            .bind(i64::try_from(request.offset()).unwrap_or(i64::MAX))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("page_suppliers", e))?;

        let items = rows
            .iter()
            .map(|r| decode::<SupplierRow>(r).map(Supplier::from))
            .collect::<StoreResult<Vec<_>>>()?;
        Ok((items, total))
    }

    #[instrument(skip(self), err)]
    async fn list_active_by_name(&self) -> StoreResult<Vec<Supplier>> {
        let sql = format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE active \
             ORDER BY name COLLATE \"C\" ASC, id ASC"
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_active_suppliers", e))?;
        rows.iter()
            .map(|r| decode::<SupplierRow>(r).map(Supplier::from))
            .collect()
    }
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::UniqueViolation(msg),
                Some("23503") => StoreError::ReferenceViolation(msg),
                Some("23514") => StoreError::Backend(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}

fn decode<'r, T: FromRow<'r, PgRow>>(row: &'r PgRow) -> StoreResult<T> {
    T::from_row(row).map_err(|e| StoreError::Backend(format!("failed to decode row: {}", e)))
}

fn read_total(row: &PgRow) -> StoreResult<u64> {
    let total: i64 = row
        .try_get("total")
        .map_err(|e| StoreError::Backend(format!("failed to read count: {}", e)))?;
    Ok(u64::try_from(total).unwrap_or_default())
}

// SQLx row types

#[derive(Debug)]
struct ProductRow {
    id: i64,
    name: String,
    description: String,
    price_cents: i64,
    inventory_quantity: i64,
    sku: String,
    category_id: Option<i64>,
    supplier_id: Option<i64>,
    low_stock_threshold: Option<i64>,
    low_stock: bool,
}

impl<'r> sqlx::FromRow<'r, PgRow> for ProductRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProductRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price_cents: row.try_get("price_cents")?,
            inventory_quantity: row.try_get("inventory_quantity")?,
            sku: row.try_get("sku")?,
            category_id: row.try_get("category_id")?,
            supplier_id: row.try_get("supplier_id")?,
            low_stock_threshold: row.try_get("low_stock_threshold")?,
            low_stock: row.try_get("low_stock")?,
        })
    }
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price: Price::from_cents(row.price_cents),
            sku: row.sku,
            category_id: row.category_id.map(CategoryId::new),
            supplier_id: row.supplier_id.map(SupplierId::new),
            stock: StockLevel::restore(
                row.inventory_quantity,
                row.low_stock_threshold,
                row.low_stock,
            ),
        }
    }
}

#[derive(Debug)]
struct CategoryRow {
    id: i64,
    name: String,
    description: Option<String>,
}

impl<'r> sqlx::FromRow<'r, PgRow> for CategoryRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(CategoryRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
        })
    }
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: CategoryId::new(row.id),
            name: row.name,
            description: row.description,
        }
    }
}

#[derive(Debug)]
struct SupplierRow {
    id: i64,
    name: String,
    contact_person: String,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    city: Option<String>,
    country: Option<String>,
    postal_code: Option<String>,
    notes: Option<String>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, PgRow> for SupplierRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(SupplierRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            contact_person: row.try_get("contact_person")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            address: row.try_get("address")?,
            city: row.try_get("city")?,
            country: row.try_get("country")?,
            postal_code: row.try_get("postal_code")?,
            notes: row.try_get("notes")?,
            active: row.try_get("active")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl From<SupplierRow> for Supplier {
    fn from(row: SupplierRow) -> Self {
        Supplier {
            id: SupplierId::new(row.id),
            name: row.name,
            contact_person: row.contact_person,
            email: row.email,
            phone: row.phone,
            address: row.address,
            city: row.city,
            country: row.country,
            postal_code: row.postal_code,
            notes: row.notes,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
