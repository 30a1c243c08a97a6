//! Pagination for list endpoints

use jukebox_common::api::{PageQuery, Paginated, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Pagination metadata calculated from total results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: i64,
    pub page_size: i64,
    /// Total number of pages
    pub total_pages: i64,
    /// Offset for SQL LIMIT/OFFSET query
    pub offset: i64,
}

impl Pagination {
    /// Wrap one page of rows with its metadata
    pub fn wrap<T>(&self, data: Vec<T>, total: i64) -> Paginated<T> {
        Paginated {
            data,
            page: self.page,
            page_size: self.page_size,
            total,
            total_pages: self.total_pages,
        }
    }
}

/// Requested page size, defaulted and clamped to `1..=MAX_PAGE_SIZE`
pub fn effective_page_size(requested: Option<i64>) -> i64 {
    requested
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE)
}

/// Calculate pagination metadata from total results and requested page
///
/// The page is clamped into `[1, total_pages]`.
///
/// # Examples
/// ```
/// use jukebox_server::pagination::calculate_pagination;
///
/// // 45 results at 20 per page = 3 pages (20 + 20 + 5)
/// let p = calculate_pagination(45, Some(2), Some(20));
/// assert_eq!(p.page, 2);
/// assert_eq!(p.total_pages, 3);
/// assert_eq!(p.offset, 20);
/// ```
pub fn calculate_pagination(
    total_results: i64,
    requested_page: Option<i64>,
    requested_page_size: Option<i64>,
) -> Pagination {
    let page_size = effective_page_size(requested_page_size);
    let total_pages = (total_results + page_size - 1) / page_size;
    let page = requested_page
        .unwrap_or(1)
        .max(1)
        .min(total_pages.max(1));
    let offset = (page - 1) * page_size;

    Pagination {
        page,
        page_size,
        total_pages,
        offset,
    }
}

/// Same as [`calculate_pagination`] for a `?page=&page_size=` query
pub fn from_query(total_results: i64, query: &PageQuery) -> Pagination {
    calculate_pagination(total_results, query.page, query.page_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = calculate_pagination(45, None, None);
        assert_eq!(p.page, 1);
        assert_eq!(p.page_size, 20);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn test_last_page() {
        let p = calculate_pagination(45, Some(3), Some(20));
        assert_eq!(p.page, 3);
        assert_eq!(p.offset, 40);
    }

    #[test]
    fn test_out_of_bounds_clamped() {
        let high = calculate_pagination(45, Some(99), Some(20));
        assert_eq!(high.page, 3);

        let low = calculate_pagination(45, Some(0), Some(20));
        assert_eq!(low.page, 1);
        assert_eq!(low.offset, 0);
    }

    #[test]
    fn test_page_size_clamped() {
        assert_eq!(effective_page_size(Some(0)), 1);
        assert_eq!(effective_page_size(Some(1000)), 100);
        assert_eq!(effective_page_size(None), 20);
    }

    #[test]
    fn test_empty() {
        let p = calculate_pagination(0, Some(1), None);
        assert_eq!(p.page, 1);
        assert_eq!(p.total_pages, 0);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn test_wrap() {
        let p = calculate_pagination(3, Some(1), Some(2));
        let page = p.wrap(vec!["a", "b"], 3);
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.data.len(), 2);
    }
}
