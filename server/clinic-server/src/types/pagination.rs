//! Pagination types shared by every list endpoint

use database_layer::Page;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::{api_success_with_meta, ApiResponse, PaginationInfo, ResponseMetadata};

/// Standard pagination parameters for list endpoints
///
/// List endpoints with extra filters repeat these two fields instead of
/// flattening this struct; flattened numbers do not survive query-string
/// decoding.
#[derive(Debug, Deserialize, IntoParams, Clone, Copy, Default)]
pub struct PaginationParams {
    #[param(example = 1, minimum = 1)]
    pub page: Option<u32>,

    #[param(example = 20, minimum = 1, maximum = 100)]
    pub page_size: Option<u32>,
}

impl PaginationParams {
    pub fn page(&self) -> Page {
        Page::new(self.page, self.page_size)
    }
}

/// One page of rows plus the total across all pages.
#[derive(Debug, Clone)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: Page,
}

impl<T> Paginated<T> {
    pub fn empty(page: Page) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page,
        }
    }

    pub fn metadata(&self) -> ResponseMetadata {
        let total_pages = self.page.total_pages(self.total);
        ResponseMetadata {
            pagination: Some(PaginationInfo {
                page: self.page.page,
                page_size: self.page.page_size,
                total_pages,
                has_next: self.page.page < total_pages,
                has_previous: self.page.page > 1,
            }),
            total_count: Some(self.total),
        }
    }

    /// Wrap the rows with pagination metadata
    pub fn into_response(self) -> ApiResponse<Vec<T>> {
        let metadata = self.metadata();
        api_success_with_meta(self.items, metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pagination_defaults() {
        let params = PaginationParams::default();
        assert_eq!(params.page(), Page { page: 1, page_size: 20 });
    }

    #[test]
    fn test_page_size_is_capped() {
        let params = PaginationParams { page: Some(0), page_size: Some(500) };
        assert_eq!(params.page(), Page { page: 1, page_size: 100 });
    }

    #[test]
    fn test_metadata_flags() {
        let page = Paginated {
            items: vec![1, 2, 3],
            total: 45,
            page: Page::new(Some(2), Some(20)),
        };
        let info = page.metadata().pagination.unwrap();
        assert_eq!(info.total_pages, 3);
        assert!(info.has_next);
        assert!(info.has_previous);

        let empty: Paginated<u8> = Paginated::empty(Page::default());
        let info = empty.metadata().pagination.unwrap();
        assert_eq!(info.total_pages, 1);
        assert!(!info.has_next);
    }

    proptest! {
        #[test]
        fn pages_cover_every_row(page in proptest::option::of(0u32..1000), size in proptest::option::of(0u32..1000), total in 0u64..100_000) {
            let page = Page::new(page, size);
            prop_assert!(page.page >= 1);
            prop_assert!((1..=Page::MAX_SIZE).contains(&page.page_size));

            let info = Paginated::<u8>::empty(page).metadata().pagination.unwrap();
            let pages = u64::from(page.total_pages(total));
            prop_assert!(pages * u64::from(page.page_size) >= total);
            prop_assert!(total == 0 || (pages - 1) * u64::from(page.page_size) < total);
            prop_assert_eq!(info.has_previous, page.page > 1);
        }
    }
}
