//! Cache key builders, one per query shape.
//!
//! Point reads live under the singular namespace and are evicted by exact
//! key. Listings and searches live under the plural namespace and are
//! evicted wholesale on any write of that type.

use core::fmt::Display;

use stockroom_core::{CategoryId, PageRequest, ProductId, SupplierId};
use stockroom_products::{ProductFilter, ProductSortField};
use stockroom_suppliers::{SupplierSearch, SupplierSortField};

pub const PRODUCT: &str = "product:";
pub const PRODUCTS: &str = "products:";
pub const CATEGORY: &str = "category:";
pub const CATEGORIES: &str = "categories:";
pub const SUPPLIER: &str = "supplier:";
pub const SUPPLIERS: &str = "suppliers:";

fn page_suffix<F: Display>(request: &PageRequest<F>) -> String {
    format!(
        "{}:{}:{}:{}",
        request.page(),
        request.size(),
        request.sort(),
        request.direction()
    )
}

pub fn product(id: ProductId) -> String {
    format!("{PRODUCT}id:{id}")
}

pub fn product_by_sku(sku: &str) -> String {
    format!("{PRODUCT}sku:{sku}")
}

pub fn products_page(filter: &ProductFilter, request: &PageRequest<ProductSortField>) -> String {
    format!(
        "{PRODUCTS}page:{}:{}",
        filter.cache_fragment(),
        page_suffix(request)
    )
}

pub fn products_low_stock() -> String {
    format!("{PRODUCTS}low_stock")
}

pub fn category(id: CategoryId) -> String {
    format!("{CATEGORY}id:{id}")
}

pub fn categories_all() -> String {
    format!("{CATEGORIES}all")
}

pub fn supplier(id: SupplierId) -> String {
    format!("{SUPPLIER}id:{id}")
}

pub fn suppliers_page(search: &SupplierSearch, request: &PageRequest<SupplierSortField>) -> String {
    format!(
        "{SUPPLIERS}page:{}:{}",
        search.cache_fragment(),
        page_suffix(request)
    )
}

pub fn suppliers_dropdown() -> String {
    format!("{SUPPLIERS}dropdown")
}

/// Existence answers depend on the whole supplier set, so they are listings.
pub fn supplier_name_exists(name: &str) -> String {
    format!("{SUPPLIERS}exists:{}", name.to_lowercase())
}
