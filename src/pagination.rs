//! Page slicing over the repository with page metadata.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::models::{Invoice, InvoiceCriteria, SearchParams};
use crate::repository::InvoiceRepository;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PER_PAGE: i64 = 20;
pub const MAX_PER_PAGE: i64 = 100;

/// Normalized page request: `page >= 1`, `1 <= per_page <= MAX_PER_PAGE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    per_page: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    /// Absent or non-positive values fall back to the defaults; `per_page`
    /// above the maximum is clamped.
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        let page = page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE);
        let per_page = match per_page {
            Some(n) if n > MAX_PER_PAGE => MAX_PER_PAGE,
            Some(n) if n > 0 => n,
            _ => DEFAULT_PER_PAGE,
        };
        Self { page, per_page }
    }

    pub fn from_params(params: &SearchParams) -> Self {
        Self::new(params.page(), params.per_page())
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn per_page(&self) -> i64 {
        self.per_page
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_count: i64,
    pub per_page: i64,
}

impl PaginationMeta {
    pub fn new(request: PageRequest, total_count: i64) -> Self {
        let total_count = total_count.max(0);
        Self {
            current_page: request.page(),
            total_pages: total_pages(total_count, request.per_page()),
            total_count,
            per_page: request.per_page(),
        }
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }
}

/// `ceil(total_count / per_page)`, 0 for an empty result. A non-positive
/// `per_page` is treated as the default.
pub fn total_pages(total_count: i64, per_page: i64) -> i64 {
    let per_page = if per_page > 0 { per_page } else { DEFAULT_PER_PAGE };
    if total_count <= 0 {
        0
    } else {
        (total_count + per_page - 1) / per_page
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PaginationMeta,
}

/// One page of `search(criteria)` plus metadata. The slice and the count are
/// fetched concurrently; a page past the end is simply empty.
pub async fn paginate(
    repository: &InvoiceRepository,
    criteria: &InvoiceCriteria,
    request: PageRequest,
) -> Result<Page<Invoice>, StoreError> {
    let (items, total_count) = tokio::try_join!(
        repository.page(criteria, request),
        repository.count_matching(criteria)
    )?;

    Ok(Page {
        items,
        meta: PaginationMeta::new(request, total_count),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_defaults_and_clamping() {
        assert_eq!(PageRequest::new(None, None), PageRequest::default());
        assert_eq!(PageRequest::new(Some(0), Some(0)).per_page(), DEFAULT_PER_PAGE);
        assert_eq!(PageRequest::new(Some(-3), Some(-5)).page(), DEFAULT_PAGE);
        assert_eq!(PageRequest::new(Some(2), Some(500)).per_page(), MAX_PER_PAGE);
        assert_eq!(PageRequest::new(Some(3), Some(10)).offset(), 20);
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 20), 0);
        assert_eq!(total_pages(1, 20), 1);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
        assert_eq!(total_pages(5, 0), 1);
        assert_eq!(total_pages(45, -1), 3);
    }

    #[test]
    fn test_meta_navigation_flags() {
        let meta = PaginationMeta::new(PageRequest::new(Some(2), Some(10)), 25);
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_next());
        assert!(meta.has_previous());

        let empty = PaginationMeta::new(PageRequest::default(), 0);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next());
        assert!(!empty.has_previous());
    }
}
