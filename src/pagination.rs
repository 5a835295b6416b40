//! This modules defines the common functionality for paging data.

use serde::Serialize;

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of items per page when not specified in a request.
    pub default_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
        }
    }
}

/// Metadata sent alongside a page of data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// The number of items across all pages.
    pub total_items: u64,
    /// The number of pages needed to show all items.
    pub total_pages: u64,
    /// The one-based index of the page being returned.
    pub current_page: u64,
    /// The maximum number of items per page.
    pub page_size: u64,
}

impl Pagination {
    /// Create the metadata for `page` given `total_items` split into pages of `page_size`.
    ///
    /// `page_size` must be greater than zero.
    pub fn new(total_items: u64, page: u64, page_size: u64) -> Self {
        Self {
            total_items,
            total_pages: total_items.div_ceil(page_size),
            current_page: page,
            page_size,
        }
    }

    /// The number of items before the current page.
    ///
    /// Saturates at [u64::MAX] for pages too far out to count, which still
    /// lands past the last item.
    pub fn offset(&self) -> u64 {
        self.current_page
            .saturating_sub(1)
            .saturating_mul(self.page_size)
    }
}

/// A page of data and its metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    /// The items on this page.
    pub data: Vec<T>,
    /// Where this page sits in the full list.
    pub pagination: Pagination,
}

#[cfg(test)]
mod pagination_tests {
    use super::Pagination;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(Pagination::new(25, 1, 10).total_pages, 3);
        assert_eq!(Pagination::new(30, 1, 10).total_pages, 3);
        assert_eq!(Pagination::new(1, 1, 10).total_pages, 1);
    }

    #[test]
    fn no_items_means_no_pages() {
        assert_eq!(Pagination::new(0, 1, 10).total_pages, 0);
    }

    #[test]
    fn offset_skips_previous_pages() {
        assert_eq!(Pagination::new(25, 1, 10).offset(), 0);
        assert_eq!(Pagination::new(25, 3, 10).offset(), 20);
    }

    #[test]
    fn offset_saturates_for_huge_pages() {
        let pagination = Pagination::new(25, i64::MAX as u64, 10);

        assert_eq!(pagination.offset(), u64::MAX);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(Pagination::new(25, 4, 10)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "totalItems": 25,
                "totalPages": 3,
                "currentPage": 4,
                "pageSize": 10,
            })
        );
    }
}
