use serde::{Deserialize, Serialize};

use stockroom_core::{
    Aggregate, CategoryId, DomainError, Entity, FieldErrors, Price, ProductId, SupplierId,
};
use stockroom_inventory::{StockAdjusted, StockLevel, StockMovement};

/// Input shape for creating or revising a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub inventory_quantity: i64,
    pub sku: String,
    pub category_id: Option<CategoryId>,
    pub supplier_id: Option<SupplierId>,
    pub low_stock_threshold: Option<i64>,
}

impl ProductDraft {
    /// Field-level checks, all violations collected.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require_non_blank("name", &self.name, "Product name is required");
        errors.require_non_blank(
            "description",
            &self.description,
            "Product description is required",
        );
        if !self.price.is_positive() {
            errors.push("price", "Price must be greater than zero");
        }
        if self.inventory_quantity < 0 {
            errors.push("inventoryQuantity", "Inventory quantity cannot be negative");
        }
        errors.require_non_blank("sku", &self.sku, "SKU is required");
        if self.low_stock_threshold.is_some_and(|t| t < 1) {
            errors.push("lowStockThreshold", "Low stock threshold must be at least 1");
        }
        errors.into_result()
    }
}

/// Aggregate root: Product.
///
/// Quantity and the low-stock flag live inside [`StockLevel`], which is the
/// only place they can change; everything else is plain catalog data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub sku: String,
    pub category_id: Option<CategoryId>,
    pub supplier_id: Option<SupplierId>,
    pub stock: StockLevel,
}

impl Product {
    /// Materialise a freshly inserted product (store-assigned id).
    pub fn from_draft(id: ProductId, draft: &ProductDraft) -> Self {
        Self {
            id,
            name: draft.name.clone(),
            description: draft.description.clone(),
            price: draft.price,
            sku: draft.sku.clone(),
            category_id: draft.category_id,
            supplier_id: draft.supplier_id,
            stock: StockLevel::new(draft.inventory_quantity, draft.low_stock_threshold),
        }
    }

    pub fn quantity(&self) -> i64 {
        self.stock.quantity()
    }

    pub fn is_low_stock(&self) -> bool {
        self.stock.is_low_stock()
    }

    pub fn low_stock_threshold(&self) -> Option<i64> {
        self.stock.threshold()
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductCommand {
    AdjustStock(StockMovement),
    AssignCategory(CategoryId),
    AssignSupplier(SupplierId),
    /// Replace catalog fields from a draft. Quantity is not touched.
    Revise(ProductDraft),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductEvent {
    StockAdjusted(StockAdjusted),
    CategoryAssigned {
        previous: Option<CategoryId>,
        category_id: CategoryId,
    },
    SupplierAssigned {
        previous: Option<SupplierId>,
        supplier_id: SupplierId,
    },
    Revised(ProductDraft),
}

impl Aggregate for Product {
    type Command = ProductCommand;
    type Event = ProductEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ProductEvent::StockAdjusted(e) => {
                self.stock = e.current;
            }
            ProductEvent::CategoryAssigned { category_id, .. } => {
                self.category_id = Some(*category_id);
            }
            ProductEvent::SupplierAssigned { supplier_id, .. } => {
                self.supplier_id = Some(*supplier_id);
            }
            ProductEvent::Revised(draft) => {
                self.name = draft.name.clone();
                self.description = draft.description.clone();
                self.price = draft.price;
                self.sku = draft.sku.clone();
                self.category_id = draft.category_id;
                self.supplier_id = draft.supplier_id;
                self.stock = self.stock.with_threshold(draft.low_stock_threshold);
            }
        }
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ProductCommand::AdjustStock(movement) => self.handle_adjust(*movement),
            ProductCommand::AssignCategory(category_id) => {
                Ok(vec![ProductEvent::CategoryAssigned {
                    previous: self.category_id,
                    category_id: *category_id,
                }])
            }
            ProductCommand::AssignSupplier(supplier_id) => {
                Ok(vec![ProductEvent::SupplierAssigned {
                    previous: self.supplier_id,
                    supplier_id: *supplier_id,
                }])
            }
            ProductCommand::Revise(draft) => {
                draft.validate().map_err(DomainError::validation)?;
                Ok(vec![ProductEvent::Revised(draft.clone())])
            }
        }
    }
}

impl Product {
    fn handle_adjust(&self, movement: StockMovement) -> Result<Vec<ProductEvent>, DomainError> {
        let current = self.stock.apply(movement)?;
        Ok(vec![ProductEvent::StockAdjusted(StockAdjusted {
            movement,
            previous: self.stock,
            current,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ProductDraft {
        ProductDraft {
            name: "Smartphone Pro".to_string(),
            description: "Flagship phone".to_string(),
            price: Price::from_cents(89_999),
            inventory_quantity: 50,
            sku: "PHONE-001".to_string(),
            category_id: Some(CategoryId::new(1)),
            supplier_id: None,
            low_stock_threshold: Some(10),
        }
    }

    fn product() -> Product {
        Product::from_draft(ProductId::new(1), &draft())
    }

    #[test]
    fn new_product_derives_low_stock() {
        let p = product();
        assert_eq!(p.quantity(), 50);
        assert!(!p.is_low_stock());
    }

    #[test]
    fn decrease_into_low_stock_then_insufficient() {
        let mut p = product();
        p.execute(&ProductCommand::AdjustStock(StockMovement::Decrease(45)))
            .unwrap();
        assert_eq!(p.quantity(), 5);
        assert!(p.is_low_stock());

        let err = p
            .execute(&ProductCommand::AdjustStock(StockMovement::Decrease(10)))
            .unwrap_err();
        assert_eq!(err, DomainError::insufficient_inventory(5, 10));
        assert_eq!(p.quantity(), 5);
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let p = product();
        let before = p.clone();
        let events = p
            .handle(&ProductCommand::AdjustStock(StockMovement::Set(3)))
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(p, before);
    }

    #[test]
    fn revise_keeps_quantity_and_recomputes_flag() {
        let mut p = product();
        let mut revised = draft();
        revised.inventory_quantity = 999;
        revised.low_stock_threshold = Some(60);
        revised.category_id = None;
        p.execute(&ProductCommand::Revise(revised)).unwrap();

        assert_eq!(p.quantity(), 50);
        assert!(p.is_low_stock());
        assert_eq!(p.category_id, None);
    }

    #[test]
    fn revise_without_threshold_keeps_flag() {
        let mut p = product();
        p.execute(&ProductCommand::AdjustStock(StockMovement::Set(2)))
            .unwrap();
        assert!(p.is_low_stock());

        let mut revised = draft();
        revised.low_stock_threshold = None;
        p.execute(&ProductCommand::Revise(revised)).unwrap();
        assert!(p.is_low_stock());
        assert_eq!(p.low_stock_threshold(), None);
    }

    #[test]
    fn revise_rejects_invalid_draft() {
        let p = product();
        let mut bad = draft();
        bad.name = " ".to_string();
        bad.price = Price::from_cents(0);
        let err = p.handle(&ProductCommand::Revise(bad)).unwrap_err();
        match err {
            DomainError::Validation(fields) => {
                assert!(fields.contains("name"));
                assert!(fields.contains("price"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn assignment_events_record_previous_reference() {
        let mut p = product();
        let events = p
            .execute(&ProductCommand::AssignCategory(CategoryId::new(9)))
            .unwrap();
        assert_eq!(
            events,
            vec![ProductEvent::CategoryAssigned {
                previous: Some(CategoryId::new(1)),
                category_id: CategoryId::new(9),
            }]
        );
        assert_eq!(p.category_id, Some(CategoryId::new(9)));
    }

    #[test]
    fn draft_validation_collects_all_fields() {
        let bad = ProductDraft {
            name: String::new(),
            description: String::new(),
            price: Price::from_cents(-1),
            inventory_quantity: -1,
            sku: String::new(),
            category_id: None,
            supplier_id: None,
            low_stock_threshold: Some(0),
        };
        let errors = bad.validate().unwrap_err();
        assert_eq!(errors.len(), 6);
    }
}
