use serde::{Deserialize, Serialize};

use stockroom_core::{CategoryId, Entity, FieldErrors};

pub const CATEGORY_NAME_MAX_LEN: usize = 100;

/// Input shape for creating or renaming a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDraft {
    pub name: String,
    pub description: Option<String>,
}

impl CategoryDraft {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require_non_blank("name", &self.name, "Category name is required");
        errors.max_len(
            "name",
            Some(&self.name),
            CATEGORY_NAME_MAX_LEN,
            "Category name must not exceed 100 characters",
        );
        errors.into_result()
    }
}

/// A product grouping. Products point at categories, never the other way round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
}

impl Category {
    pub fn from_draft(id: CategoryId, draft: &CategoryDraft) -> Self {
        Self {
            id,
            name: draft.name.clone(),
            description: draft.description.clone(),
        }
    }

    /// Uniqueness must be re-checked only when the name actually changes.
    pub fn is_renamed_by(&self, draft: &CategoryDraft) -> bool {
        self.name != draft.name
    }

    pub fn revise(&mut self, draft: &CategoryDraft) {
        self.name = draft.name.clone();
        self.description = draft.description.clone();
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_overlong_names_are_rejected() {
        let blank = CategoryDraft {
            name: "   ".into(),
            description: None,
        };
        assert!(blank.validate().unwrap_err().contains("name"));

        let long = CategoryDraft {
            name: "x".repeat(101),
            description: None,
        };
        assert!(long.validate().is_err());

        let ok = CategoryDraft {
            name: "x".repeat(100),
            description: Some("fine".into()),
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn revise_replaces_name_and_description() {
        let mut category = Category::from_draft(
            CategoryId::new(1),
            &CategoryDraft {
                name: "Electronics".into(),
                description: Some("Gadgets".into()),
            },
        );
        let draft = CategoryDraft {
            name: "Electronics".into(),
            description: None,
        };
        assert!(!category.is_renamed_by(&draft));
        category.revise(&draft);
        assert_eq!(category.description, None);
        assert_eq!(category.id, CategoryId::new(1));
    }
}
