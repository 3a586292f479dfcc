//! Product search criteria and listing order.
//!
//! Product search is *not* conjunctive: exactly one predicate is chosen, in a
//! fixed precedence order (name, category, price range, in-stock, all).
//! Combining e.g. name and price narrows by name only.

use core::cmp::Ordering;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use stockroom_core::{CategoryId, DomainError, Price, SortDirection, SupplierId};

use crate::product::Product;

/// Raw search input; every field optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSearch {
    pub name: Option<String>,
    pub category_id: Option<CategoryId>,
    pub min_price: Option<Price>,
    pub max_price: Option<Price>,
    pub in_stock: Option<bool>,
}

impl ProductSearch {
    /// Pick the single predicate that applies.
    pub fn resolve(&self) -> ProductFilter {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            return ProductFilter::NameContains(name.to_string());
        }
        if let Some(category_id) = self.category_id {
            return ProductFilter::Category(category_id);
        }
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            return ProductFilter::PriceBetween { min, max };
        }
        if self.in_stock == Some(true) {
            return ProductFilter::InStock;
        }
        ProductFilter::All
    }
}

/// A single resolved product predicate, as handed to a store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum ProductFilter {
    All,
    /// Case-insensitive substring on the product name.
    NameContains(String),
    Category(CategoryId),
    Supplier(SupplierId),
    /// Inclusive on both ends.
    PriceBetween { min: Price, max: Price },
    InStock,
    /// Stored flag, not a live recomputation.
    LowStock,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            ProductFilter::All => true,
            ProductFilter::NameContains(needle) => product
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            ProductFilter::Category(id) => product.category_id == Some(*id),
            ProductFilter::Supplier(id) => product.supplier_id == Some(*id),
            ProductFilter::PriceBetween { min, max } => {
                product.price >= *min && product.price <= *max
            }
            ProductFilter::InStock => product.stock.is_in_stock(),
            ProductFilter::LowStock => product.is_low_stock(),
        }
    }

    /// Stable fragment used when building cache keys.
    pub fn cache_fragment(&self) -> String {
        match self {
            ProductFilter::All => "all".to_string(),
            ProductFilter::NameContains(n) => format!("name={}", n.to_lowercase()),
            ProductFilter::Category(id) => format!("category={id}"),
            ProductFilter::Supplier(id) => format!("supplier={id}"),
            ProductFilter::PriceBetween { min, max } => {
                format!("price={}..{}", min.cents(), max.cents())
            }
            ProductFilter::InStock => "in_stock".to_string(),
            ProductFilter::LowStock => "low_stock".to_string(),
        }
    }
}

/// Whitelisted product sort fields.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum ProductSortField {
    #[default]
    Id,
    Name,
    Price,
    InventoryQuantity,
    Sku,
    LowStockThreshold,
}

impl ProductSortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductSortField::Id => "id",
            ProductSortField::Name => "name",
            ProductSortField::Price => "price",
            ProductSortField::InventoryQuantity => "inventoryQuantity",
            ProductSortField::Sku => "sku",
            ProductSortField::LowStockThreshold => "lowStockThreshold",
        }
    }

    /// SQL expression. Text columns use byte order so both backends agree.
    pub fn column(&self) -> &'static str {
        match self {
            ProductSortField::Id => "id",
            ProductSortField::Name => "name COLLATE \"C\"",
            ProductSortField::Price => "price_cents",
            ProductSortField::InventoryQuantity => "inventory_quantity",
            ProductSortField::Sku => "sku COLLATE \"C\"",
            ProductSortField::LowStockThreshold => "low_stock_threshold",
        }
    }

    /// Ascending comparison on this field only.
    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        match self {
            ProductSortField::Id => a.id.cmp(&b.id),
            ProductSortField::Name => a.name.cmp(&b.name),
            ProductSortField::Price => a.price.cmp(&b.price),
            ProductSortField::InventoryQuantity => a.quantity().cmp(&b.quantity()),
            ProductSortField::Sku => a.sku.cmp(&b.sku),
            ProductSortField::LowStockThreshold => {
                a.low_stock_threshold().cmp(&b.low_stock_threshold())
            }
        }
    }

    /// Full listing order: the field in the requested direction, then id ascending.
    pub fn ordering(&self, direction: SortDirection, a: &Product, b: &Product) -> Ordering {
        direction
            .orient(self.compare(a, b))
            .then_with(|| a.id.cmp(&b.id))
    }
}

impl FromStr for ProductSortField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(ProductSortField::Id),
            "name" => Ok(ProductSortField::Name),
            "price" => Ok(ProductSortField::Price),
            "inventoryQuantity" => Ok(ProductSortField::InventoryQuantity),
            "sku" => Ok(ProductSortField::Sku),
            "lowStockThreshold" => Ok(ProductSortField::LowStockThreshold),
            other => Err(DomainError::invalid_argument(format!(
                "unknown product sort field: {other}"
            ))),
        }
    }
}

impl core::fmt::Display for ProductSortField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::ProductDraft;
    use stockroom_core::ProductId;

    fn product(id: i64, name: &str, cents: i64, qty: i64, category: Option<i64>) -> Product {
        Product::from_draft(
            ProductId::new(id),
            &ProductDraft {
                name: name.to_string(),
                description: "d".to_string(),
                price: Price::from_cents(cents),
                inventory_quantity: qty,
                sku: format!("SKU-{id}"),
                category_id: category.map(CategoryId::new),
                supplier_id: None,
                low_stock_threshold: Some(10),
            },
        )
    }

    #[test]
    fn name_wins_over_category() {
        let search = ProductSearch {
            name: Some("phone".into()),
            category_id: Some(CategoryId::new(1)),
            ..Default::default()
        };
        let filter = search.resolve();
        assert_eq!(filter, ProductFilter::NameContains("phone".into()));

        let phone = product(1, "Smartphone Pro", 89_999, 50, Some(2));
        let tablet = product(2, "Tablet", 49_999, 5, Some(1));
        assert!(filter.matches(&phone));
        assert!(!filter.matches(&tablet));
    }

    #[test]
    fn empty_name_falls_through_to_next_predicate() {
        let search = ProductSearch {
            name: Some(String::new()),
            category_id: Some(CategoryId::new(3)),
            in_stock: Some(true),
            ..Default::default()
        };
        assert_eq!(search.resolve(), ProductFilter::Category(CategoryId::new(3)));
    }

    #[test]
    fn price_range_needs_both_bounds() {
        let only_min = ProductSearch {
            min_price: Some(Price::from_cents(100)),
            in_stock: Some(true),
            ..Default::default()
        };
        assert_eq!(only_min.resolve(), ProductFilter::InStock);

        let both = ProductSearch {
            min_price: Some(Price::from_cents(100)),
            max_price: Some(Price::from_cents(200)),
            ..Default::default()
        };
        let filter = both.resolve();
        assert!(filter.matches(&product(1, "a", 100, 1, None)));
        assert!(filter.matches(&product(2, "b", 200, 1, None)));
        assert!(!filter.matches(&product(3, "c", 201, 1, None)));
    }

    #[test]
    fn in_stock_false_means_no_filter() {
        let search = ProductSearch {
            in_stock: Some(false),
            ..Default::default()
        };
        assert_eq!(search.resolve(), ProductFilter::All);
        assert!(ProductFilter::InStock.matches(&product(1, "a", 1, 1, None)));
        assert!(!ProductFilter::InStock.matches(&product(2, "b", 1, 0, None)));
    }

    #[test]
    fn name_match_is_case_insensitive() {
        let filter = ProductFilter::NameContains("PHONE".into());
        assert!(filter.matches(&product(1, "Smartphone Pro", 1, 1, None)));
    }

    #[test]
    fn sort_fields_are_whitelisted() {
        assert_eq!(
            "inventoryQuantity".parse::<ProductSortField>().unwrap(),
            ProductSortField::InventoryQuantity
        );
        assert!(matches!(
            "password".parse::<ProductSortField>(),
            Err(DomainError::InvalidArgument(_))
        ));
    }

    #[test]
    fn ties_break_by_id_regardless_of_direction() {
        let a = product(1, "same", 100, 1, None);
        let b = product(2, "same", 100, 1, None);
        let field = ProductSortField::Price;
        assert_eq!(field.ordering(SortDirection::Asc, &a, &b), Ordering::Less);
        assert_eq!(field.ordering(SortDirection::Desc, &a, &b), Ordering::Less);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: a non-empty name always decides the filter, whatever else is set.
            #[test]
            fn non_empty_name_always_takes_precedence(
                name in "[a-z]{1,8}",
                category in proptest::option::of(1i64..100),
                min in proptest::option::of(1i64..1_000),
                max in proptest::option::of(1i64..1_000),
                in_stock in proptest::option::of(any::<bool>()),
            ) {
                let search = ProductSearch {
                    name: Some(name.clone()),
                    category_id: category.map(CategoryId::new),
                    min_price: min.map(Price::from_cents),
                    max_price: max.map(Price::from_cents),
                    in_stock,
                };
                prop_assert_eq!(search.resolve(), ProductFilter::NameContains(name));
            }

            /// Property: sorting by any field is total and puts equal keys in id order.
            #[test]
            fn ordering_is_consistent_with_id_tiebreak(
                prices in proptest::collection::vec(1i64..5, 1..20),
                desc in any::<bool>(),
            ) {
                let direction = if desc { SortDirection::Desc } else { SortDirection::Asc };
                let mut items: Vec<Product> = prices
                    .iter()
                    .enumerate()
                    .map(|(i, cents)| product(i as i64 + 1, "p", *cents, 1, None))
                    .collect();
                items.sort_by(|a, b| ProductSortField::Price.ordering(direction, a, b));
                for pair in items.windows(2) {
                    let ord = direction.orient(pair[0].price.cmp(&pair[1].price));
                    prop_assert_ne!(ord, Ordering::Greater);
                    if pair[0].price == pair[1].price {
                        prop_assert!(pair[0].id < pair[1].id);
                    }
                }
            }
        }
    }
}
