//! Read shapes returned by the façades (and cached as JSON).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{CategoryId, Price, ProductId, SupplierId};
use stockroom_products::{Category, Product};
use stockroom_suppliers::Supplier;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub inventory_quantity: i64,
    pub sku: String,
    pub category_id: Option<CategoryId>,
    pub category_name: Option<String>,
    pub supplier_id: Option<SupplierId>,
    pub supplier_name: Option<String>,
    pub low_stock: bool,
    pub low_stock_threshold: Option<i64>,
}

impl ProductView {
    pub fn new(
        product: &Product,
        category_name: Option<String>,
        supplier_name: Option<String>,
    ) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            inventory_quantity: product.quantity(),
            sku: product.sku.clone(),
            category_id: product.category_id,
            category_name,
            supplier_id: product.supplier_id,
            supplier_name,
            low_stock: product.is_low_stock(),
            low_stock_threshold: product.low_stock_threshold(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub product_count: u64,
}

impl CategoryView {
    pub fn new(category: Category, product_count: u64) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
            product_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierView {
    pub id: SupplierId,
    pub name: String,
    pub contact_person: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub notes: Option<String>,
    pub active: bool,
    pub product_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SupplierView {
    pub fn new(supplier: Supplier, product_count: u64) -> Self {
        Self {
            id: supplier.id,
            name: supplier.name,
            contact_person: supplier.contact_person,
            email: supplier.email,
            phone: supplier.phone,
            address: supplier.address,
            city: supplier.city,
            country: supplier.country,
            postal_code: supplier.postal_code,
            notes: supplier.notes,
            active: supplier.active,
            product_count,
            created_at: supplier.created_at,
            updated_at: supplier.updated_at,
        }
    }
}
