//! Pagination primitives shared by every listing operation.

use core::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Sort direction. Anything other than a case-insensitive `"desc"` is ascending.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    /// Orient an ascending comparison result.
    pub fn orient(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl core::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        })
    }
}

/// Page size policy (default when absent, upper clamp when too large).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PageLimits {
    pub default_size: u32,
    pub max_size: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_PAGE_SIZE,
            max_size: MAX_PAGE_SIZE,
        }
    }
}

impl PageLimits {
    /// Build a request from optional caller input.
    pub fn request<F>(
        &self,
        page: Option<u32>,
        size: Option<u32>,
        sort: F,
        direction: SortDirection,
    ) -> DomainResult<PageRequest<F>> {
        let size = size.unwrap_or(self.default_size);
        if size == 0 {
            return Err(DomainError::invalid_argument("page size must be at least 1"));
        }
        Ok(PageRequest {
            page: page.unwrap_or(0),
            size: size.min(self.max_size.max(1)),
            sort,
            direction,
        })
    }
}

/// A 0-based page index, page size and a typed sort field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageRequest<F> {
    page: u32,
    size: u32,
    sort: F,
    direction: SortDirection,
}

impl<F> PageRequest<F> {
    pub fn new(page: u32, size: u32, sort: F, direction: SortDirection) -> DomainResult<Self> {
        PageLimits::default().request(Some(page), Some(size), sort, direction)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn sort(&self) -> &F {
        &self.sort
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

/// One page of results plus the totals needed to navigate the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
    pub number: u32,
    pub size: u32,
}

impl<T> Page<T> {
    pub fn new<F>(content: Vec<T>, total_elements: u64, request: &PageRequest<F>) -> Self {
        let size = u64::from(request.size());
        Self {
            content,
            total_elements,
            total_pages: total_elements.div_ceil(size),
            number: request.page(),
            size: request.size(),
        }
    }

    /// Slice an already filtered and sorted result set.
    pub fn from_sorted<F>(items: Vec<T>, request: &PageRequest<F>) -> Self {
        let total = items.len() as u64;
        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let content = items
            .into_iter()
            .skip(offset)
            .take(request.size() as usize)
            .collect();
        Self::new(content, total, request)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            number: self.number,
            size: self.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_desc_sorts_descending() {
        assert_eq!(SortDirection::parse("DESC"), SortDirection::Desc);
        assert_eq!(SortDirection::parse("desc"), SortDirection::Desc);
        assert_eq!(SortDirection::parse("asc"), SortDirection::Asc);
        assert_eq!(SortDirection::parse("descending"), SortDirection::Asc);
        assert_eq!(SortDirection::parse(""), SortDirection::Asc);
    }

    #[test]
    fn size_zero_is_rejected_and_large_sizes_are_clamped() {
        let limits = PageLimits::default();
        assert!(limits.request(None, Some(0), (), SortDirection::Asc).is_err());

        let req = limits.request(Some(2), Some(5_000), (), SortDirection::Asc).unwrap();
        assert_eq!(req.size(), MAX_PAGE_SIZE);
        assert_eq!(req.offset(), 2 * u64::from(MAX_PAGE_SIZE));

        let req = limits.request(None, None, (), SortDirection::Asc).unwrap();
        assert_eq!(req.page(), 0);
        assert_eq!(req.size(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn page_totals_round_up() {
        let req = PageRequest::new(1, 2, (), SortDirection::Asc).unwrap();
        let page = Page::from_sorted(vec![1, 2, 3, 4, 5], &req);
        assert_eq!(page.content, vec![3, 4]);
        assert_eq!(page.total_elements, 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.number, 1);
    }

    #[test]
    fn page_past_the_end_is_empty_but_keeps_totals() {
        let req = PageRequest::new(9, 2, (), SortDirection::Asc).unwrap();
        let page = Page::from_sorted(vec![1, 2, 3], &req);
        assert!(page.content.is_empty());
        assert_eq!(page.total_elements, 3);
        assert_eq!(page.total_pages, 2);
    }
}
