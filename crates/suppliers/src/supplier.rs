use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{Entity, FieldErrors, SupplierId, validation::is_plausible_email};

/// Input shape for creating or updating a supplier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierDraft {
    pub name: String,
    pub contact_person: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub notes: Option<String>,
    /// `None` on create means active; on update it leaves the flag alone.
    pub active: Option<bool>,
}

impl SupplierDraft {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require_non_blank("name", &self.name, "Supplier name is required");
        errors.max_len(
            "name",
            Some(&self.name),
            100,
            "Supplier name must not exceed 100 characters",
        );
        errors.require_non_blank(
            "contactPerson",
            &self.contact_person,
            "Contact person is required",
        );
        errors.max_len(
            "contactPerson",
            Some(&self.contact_person),
            100,
            "Contact person must not exceed 100 characters",
        );
        if let Some(email) = self.email.as_deref().filter(|e| !e.is_empty()) {
            if !is_plausible_email(email) {
                errors.push("email", "Email should be valid");
            }
        }
        errors.max_len(
            "email",
            self.email.as_deref(),
            100,
            "Email must not exceed 100 characters",
        );
        errors.max_len(
            "phone",
            self.phone.as_deref(),
            20,
            "Phone must not exceed 20 characters",
        );
        errors.max_len(
            "address",
            self.address.as_deref(),
            255,
            "Address must not exceed 255 characters",
        );
        errors.max_len(
            "city",
            self.city.as_deref(),
            100,
            "City must not exceed 100 characters",
        );
        errors.max_len(
            "country",
            self.country.as_deref(),
            100,
            "Country must not exceed 100 characters",
        );
        errors.max_len(
            "postalCode",
            self.postal_code.as_deref(),
            20,
            "Postal code must not exceed 20 characters",
        );
        errors.into_result()
    }
}

/// A supplier. Products reference suppliers by id; a supplier never holds
/// its products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Supplier {
    pub fn from_draft(id: SupplierId, draft: &SupplierDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name.clone(),
            contact_person: draft.contact_person.clone(),
            email: draft.email.clone(),
            phone: draft.phone.clone(),
            address: draft.address.clone(),
            city: draft.city.clone(),
            country: draft.country.clone(),
            postal_code: draft.postal_code.clone(),
            notes: draft.notes.clone(),
            active: draft.active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `candidate` is a different name once case is ignored.
    ///
    /// Re-submitting the current name in another casing is not a rename.
    pub fn is_renamed_to(&self, candidate: &str) -> bool {
        !names_match(&self.name, candidate)
    }

    pub fn revise(&mut self, draft: &SupplierDraft, now: DateTime<Utc>) {
        self.name = draft.name.clone();
        self.contact_person = draft.contact_person.clone();
        self.email = draft.email.clone();
        self.phone = draft.phone.clone();
        self.address = draft.address.clone();
        self.city = draft.city.clone();
        self.country = draft.country.clone();
        self.postal_code = draft.postal_code.clone();
        self.notes = draft.notes.clone();
        if let Some(active) = draft.active {
            self.active = active;
        }
        self.updated_at = now;
    }

    pub fn set_active(&mut self, active: bool, now: DateTime<Utc>) {
        self.active = active;
        self.updated_at = now;
    }
}

impl Entity for Supplier {
    type Id = SupplierId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Case-insensitive name equality used for the uniqueness rule.
pub fn names_match(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}
