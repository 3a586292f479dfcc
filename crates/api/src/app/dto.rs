use std::str::FromStr;

use serde::Deserialize;

use stockroom_core::{
    CategoryId, DomainError, FieldErrors, PageLimits, PageRequest, Price, SortDirection,
    SupplierId,
};
use stockroom_products::ProductSearch;
use stockroom_suppliers::SupplierSearch;

use crate::app::errors::ApiError;

// -------------------------
// Query parameters
// -------------------------

/// `page`, `size`, `sortBy`, `sortDir`; each optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
}

impl PageParams {
    /// Resolve against the configured limits. An absent sort field falls back
    /// to the entity default; an unknown one is rejected.
    pub fn request<F>(&self, limits: &PageLimits) -> Result<PageRequest<F>, ApiError>
    where
        F: FromStr<Err = DomainError> + Default,
    {
        let sort = match self.sort_by.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(field) => field.parse()?,
            None => F::default(),
        };
        let direction = self
            .sort_dir
            .as_deref()
            .map(SortDirection::parse)
            .unwrap_or_default();
        Ok(limits.request(self.page, self.size, sort, direction)?)
    }
}

// Query strings cannot go through `#[serde(flatten)]` (numbers arrive as
// strings), so search parameters repeat the paging fields.

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSearchParams {
    pub name: Option<String>,
    pub category_id: Option<CategoryId>,
    pub min_price: Option<Price>,
    pub max_price: Option<Price>,
    pub in_stock: Option<bool>,
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
}

impl ProductSearchParams {
    pub fn criteria(&self) -> ProductSearch {
        ProductSearch {
            name: self.name.clone(),
            category_id: self.category_id,
            min_price: self.min_price,
            max_price: self.max_price,
            in_stock: self.in_stock,
        }
    }

    pub fn paging(&self) -> PageParams {
        PageParams {
            page: self.page,
            size: self.size,
            sort_by: self.sort_by.clone(),
            sort_dir: self.sort_dir.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierSearchParams {
    pub name: Option<String>,
    pub contact_person: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub active: Option<bool>,
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
}

impl SupplierSearchParams {
    pub fn criteria(&self) -> SupplierSearch {
        SupplierSearch {
            name: self.name.clone(),
            contact_person: self.contact_person.clone(),
            city: self.city.clone(),
            country: self.country.clone(),
            active: self.active,
        }
    }

    pub fn paging(&self) -> PageParams {
        PageParams {
            page: self.page,
            size: self.size,
            sort_by: self.sort_by.clone(),
            sort_dir: self.sort_dir.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAssignment {
    pub category_id: CategoryId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierAssignment {
    pub supplier_id: SupplierId,
}

#[derive(Debug, Deserialize)]
pub struct NameQuery {
    pub name: String,
}

// -------------------------
// Request bodies
// -------------------------

/// Body of every inventory mutation.
#[derive(Debug, Default, Deserialize)]
pub struct InventoryUpdateRequest {
    pub quantity: Option<i64>,
}

impl InventoryUpdateRequest {
    pub fn quantity(&self) -> Result<i64, ApiError> {
        let mut errors = FieldErrors::new();
        match self.quantity {
            None => errors.push("quantity", "Quantity is required"),
            Some(q) if q < 0 => errors.push("quantity", "Quantity cannot be negative"),
            Some(_) => {}
        }
        errors.into_result().map_err(DomainError::validation)?;
        Ok(self.quantity.unwrap_or_default())
    }
}
