//! Supplier search: every present predicate narrows the result (logical AND).

use core::cmp::Ordering;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, SortDirection};

use crate::supplier::Supplier;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierSearch {
    /// Case-insensitive substring.
    pub name: Option<String>,
    /// Case-insensitive substring.
    pub contact_person: Option<String>,
    /// Case-insensitive exact match.
    pub city: Option<String>,
    /// Case-insensitive exact match.
    pub country: Option<String>,
    pub active: Option<bool>,
}

impl SupplierSearch {
    pub fn active(active: bool) -> Self {
        Self {
            active: Some(active),
            ..Self::default()
        }
    }

    /// Blank text predicates carry no constraint; drop them.
    pub fn normalized(self) -> Self {
        fn keep(v: Option<String>) -> Option<String> {
            v.filter(|s| !s.trim().is_empty())
        }
        Self {
            name: keep(self.name),
            contact_person: keep(self.contact_person),
            city: keep(self.city),
            country: keep(self.country),
            active: self.active,
        }
    }

    pub fn matches(&self, supplier: &Supplier) -> bool {
        contains_ci(Some(&supplier.name), self.name.as_deref())
            && contains_ci(Some(&supplier.contact_person), self.contact_person.as_deref())
            && equals_ci(supplier.city.as_deref(), self.city.as_deref())
            && equals_ci(supplier.country.as_deref(), self.country.as_deref())
            && self.active.is_none_or(|a| supplier.active == a)
    }

    /// Stable fragment used when building cache keys. Each text predicate is
    /// length-prefixed so separators inside a value cannot shift field bounds.
    pub fn cache_fragment(&self) -> String {
        fn part(v: &Option<String>) -> String {
            match v.as_deref().map(str::to_lowercase) {
                Some(v) => format!("{}:{v}", v.len()),
                None => "-".to_string(),
            }
        }
        format!(
            "name={}|contact={}|city={}|country={}|active={}",
            part(&self.name),
            part(&self.contact_person),
            part(&self.city),
            part(&self.country),
            self.active.map(|a| a.to_string()).unwrap_or_default(),
        )
    }
}

fn contains_ci(value: Option<&String>, needle: Option<&str>) -> bool {
    match needle {
        None => true,
        Some(n) => value.is_some_and(|v| v.to_lowercase().contains(&n.to_lowercase())),
    }
}

fn equals_ci(value: Option<&str>, expected: Option<&str>) -> bool {
    match expected {
        None => true,
        Some(e) => value.is_some_and(|v| v.to_lowercase() == e.to_lowercase()),
    }
}

/// Whitelisted supplier sort fields.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum SupplierSortField {
    Id,
    #[default]
    Name,
    ContactPerson,
    City,
    Country,
    Active,
    CreatedAt,
    UpdatedAt,
}

impl SupplierSortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupplierSortField::Id => "id",
            SupplierSortField::Name => "name",
            SupplierSortField::ContactPerson => "contactPerson",
            SupplierSortField::City => "city",
            SupplierSortField::Country => "country",
            SupplierSortField::Active => "active",
            SupplierSortField::CreatedAt => "createdAt",
            SupplierSortField::UpdatedAt => "updatedAt",
        }
    }

    /// SQL expression. Text columns use byte order so both backends agree.
    pub fn column(&self) -> &'static str {
        match self {
            SupplierSortField::Id => "id",
            SupplierSortField::Name => "name COLLATE \"C\"",
            SupplierSortField::ContactPerson => "contact_person COLLATE \"C\"",
            SupplierSortField::City => "city COLLATE \"C\"",
            SupplierSortField::Country => "country COLLATE \"C\"",
            SupplierSortField::Active => "active",
            SupplierSortField::CreatedAt => "created_at",
            SupplierSortField::UpdatedAt => "updated_at",
        }
    }

    pub fn compare(&self, a: &Supplier, b: &Supplier) -> Ordering {
        match self {
            SupplierSortField::Id => a.id.cmp(&b.id),
            SupplierSortField::Name => a.name.cmp(&b.name),
            SupplierSortField::ContactPerson => a.contact_person.cmp(&b.contact_person),
            SupplierSortField::City => a.city.cmp(&b.city),
            SupplierSortField::Country => a.country.cmp(&b.country),
            SupplierSortField::Active => a.active.cmp(&b.active),
            SupplierSortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SupplierSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        }
    }

    /// The field in the requested direction, then id ascending.
    pub fn ordering(&self, direction: SortDirection, a: &Supplier, b: &Supplier) -> Ordering {
        direction
            .orient(self.compare(a, b))
            .then_with(|| a.id.cmp(&b.id))
    }
}

impl FromStr for SupplierSortField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(SupplierSortField::Id),
            "name" => Ok(SupplierSortField::Name),
            "contactPerson" => Ok(SupplierSortField::ContactPerson),
            "city" => Ok(SupplierSortField::City),
            "country" => Ok(SupplierSortField::Country),
            "active" => Ok(SupplierSortField::Active),
            "createdAt" => Ok(SupplierSortField::CreatedAt),
            "updatedAt" => Ok(SupplierSortField::UpdatedAt),
            other => Err(DomainError::invalid_argument(format!(
                "unknown supplier sort field: {other}"
            ))),
        }
    }
}

impl core::fmt::Display for SupplierSortField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supplier::SupplierDraft;
    use chrono::Utc;
    use stockroom_core::SupplierId;

    fn supplier(id: i64, name: &str, city: &str, active: bool) -> Supplier {
        Supplier::from_draft(
            SupplierId::new(id),
            &SupplierDraft {
                name: name.into(),
                contact_person: "Jane Doe".into(),
                city: Some(city.into()),
                country: Some("Germany".into()),
                active: Some(active),
                ..Default::default()
            },
            Utc::now(),
        )
    }

    #[test]
    fn predicates_combine_conjunctively() {
        let acme = supplier(1, "Acme Tools", "Berlin", true);
        let globex = supplier(2, "Globex", "Berlin", false);

        let search = SupplierSearch {
            city: Some("berlin".into()),
            active: Some(true),
            ..Default::default()
        };
        assert!(search.matches(&acme));
        assert!(!search.matches(&globex));
    }

    #[test]
    fn city_is_exact_but_name_is_substring() {
        let acme = supplier(1, "Acme Tools", "Berlin", true);
        let by_city = SupplierSearch {
            city: Some("Berl".into()),
            ..Default::default()
        };
        assert!(!by_city.matches(&acme));

        let by_name = SupplierSearch {
            name: Some("TOOLS".into()),
            contact_person: Some("jane".into()),
            ..Default::default()
        };
        assert!(by_name.matches(&acme));
    }

    #[test]
    fn blank_predicates_are_dropped() {
        let search = SupplierSearch {
            city: Some(" ".into()),
            ..Default::default()
        }
        .normalized();
        assert_eq!(search, SupplierSearch::default());
        assert!(search.matches(&supplier(1, "Acme", "Berlin", false)));
    }

    #[test]
    fn missing_city_never_matches_a_city_filter() {
        let mut s = supplier(1, "Acme", "Berlin", true);
        s.city = None;
        let search = SupplierSearch {
            city: Some("Berlin".into()),
            ..Default::default()
        };
        assert!(!search.matches(&s));
    }

    #[test]
    fn cache_fragments_keep_field_boundaries() {
        let smuggled = SupplierSearch {
            name: Some("x|contact=y".into()),
            ..Default::default()
        };
        let split = SupplierSearch {
            name: Some("x".into()),
            contact_person: Some("y|contact=".into()),
            ..Default::default()
        };
        assert_ne!(smuggled.cache_fragment(), split.cache_fragment());

        let empty_name = SupplierSearch {
            name: Some(String::new()),
            ..Default::default()
        };
        assert_ne!(empty_name.cache_fragment(), SupplierSearch::default().cache_fragment());
        assert_eq!(
            SupplierSearch::active(true).cache_fragment(),
            "name=-|contact=-|city=-|country=-|active=true"
        );
    }

    #[test]
    fn default_sort_is_name() {
        assert_eq!(SupplierSortField::default(), SupplierSortField::Name);
        assert!("email".parse::<SupplierSortField>().is_err());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: a combined search matches exactly when every single-predicate search matches.
            #[test]
            fn combined_search_is_the_and_of_its_parts(
                name in proptest::option::of("[a-c]{1,2}"),
                city in proptest::option::of("(Berlin|Paris)"),
                active in proptest::option::of(any::<bool>()),
                supplier_name in "[a-c]{1,6}",
                supplier_city in "(Berlin|Paris|Rome)",
                supplier_active in any::<bool>(),
            ) {
                let s = supplier(1, &supplier_name, &supplier_city, supplier_active);
                let combined = SupplierSearch {
                    name: name.clone(),
                    city: city.clone(),
                    active,
                    ..Default::default()
                };
                let parts = [
                    SupplierSearch { name, ..Default::default() },
                    SupplierSearch { city, ..Default::default() },
                    SupplierSearch { active, ..Default::default() },
                ];
                prop_assert_eq!(combined.matches(&s), parts.iter().all(|p| p.matches(&s)));
            }
        }
    }
}
