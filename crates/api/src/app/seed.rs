//! Optional demo catalog, loaded through the façades on an empty store.

use tracing::info;

use stockroom_core::Price;
use stockroom_infra::services::{ServiceResult, Services};
use stockroom_products::{CategoryDraft, ProductDraft};
use stockroom_suppliers::SupplierDraft;

const CATEGORIES: &[(&str, &str)] = &[
    ("Electronics", "Electronic devices and components"),
    ("Clothing", "Apparel and fashion items"),
    ("Books", "Books and educational materials"),
    ("Home & Garden", "Home improvement and gardening supplies"),
    ("Sports", "Sports equipment and accessories"),
];

// name, contact, email, city, country
const SUPPLIERS: &[(&str, &str, &str, &str, &str)] = &[
    ("TechCorp Solutions", "Alice Johnson", "alice@techcorp.com", "San Francisco", "USA"),
    ("Fashion Forward Inc", "Bob Smith", "bob@fashionforward.com", "New York", "USA"),
    ("BookWorld Distributors", "Carol Davis", "carol@bookworld.com", "Chicago", "USA"),
    ("HomeStyle Suppliers", "David Wilson", "david@homestyle.com", "Los Angeles", "USA"),
    ("SportZone International", "Eva Martinez", "eva@sportzone.com", "Miami", "USA"),
];

// name, sku, cents, quantity, threshold, category index, supplier index
const PRODUCTS: &[(&str, &str, i64, i64, i64, usize, usize)] = &[
    ("Smartphone Pro", "PHONE-001", 89_999, 50, 10, 0, 0),
    ("Wireless Earbuds", "AUDIO-001", 12_999, 8, 10, 0, 0),
    ("Denim Jacket", "CLOTH-001", 7_950, 30, 5, 1, 1),
    ("Rust in Action", "BOOK-001", 4_499, 3, 5, 2, 2),
    ("Garden Hose 25m", "HOME-001", 2_999, 40, 10, 3, 3),
    ("Yoga Mat", "SPORT-001", 3_500, 0, 5, 4, 4),
];

/// Returns `false` without writing anything when categories already exist.
pub async fn seed_sample_data(services: &Services) -> ServiceResult<bool> {
    if !services.categories.list().await?.is_empty() {
        info!("store not empty; skipping sample data");
        return Ok(false);
    }

    let mut category_ids = Vec::with_capacity(CATEGORIES.len());
    for (name, description) in CATEGORIES {
        let view = services
            .categories
            .create(CategoryDraft {
                name: (*name).into(),
                description: Some((*description).into()),
            })
            .await?;
        category_ids.push(view.id);
    }

    let mut supplier_ids = Vec::with_capacity(SUPPLIERS.len());
    for (name, contact, email, city, country) in SUPPLIERS {
        let view = services
            .suppliers
            .create(SupplierDraft {
                name: (*name).into(),
                contact_person: (*contact).into(),
                email: Some((*email).into()),
                city: Some((*city).into()),
                country: Some((*country).into()),
                ..SupplierDraft::default()
            })
            .await?;
        supplier_ids.push(view.id);
    }

    for &(name, sku, cents, quantity, threshold, category, supplier) in PRODUCTS {
        services
            .products
            .create(ProductDraft {
                name: name.into(),
                description: format!("{name} (sample)"),
                price: Price::from_cents(cents),
                inventory_quantity: quantity,
                sku: sku.into(),
                category_id: category_ids.get(category).copied(),
                supplier_id: supplier_ids.get(supplier).copied(),
                low_stock_threshold: Some(threshold),
            })
            .await?;
    }

    info!(
        categories = CATEGORIES.len(),
        suppliers = SUPPLIERS.len(),
        products = PRODUCTS.len(),
        "sample data loaded"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::build_in_memory_services;

    #[tokio::test]
    async fn seeding_runs_once() {
        let services = build_in_memory_services();
        assert!(seed_sample_data(&services).await.unwrap());
        assert!(!seed_sample_data(&services).await.unwrap());

        let low = services.products.list_low_stock().await.unwrap();
        let skus: Vec<_> = low.iter().map(|p| p.sku.as_str()).collect();
        assert_eq!(skus, ["AUDIO-001", "BOOK-001", "SPORT-001"]);
    }
}
