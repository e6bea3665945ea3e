//! Page-number pagination
//!
//! `?page=N&page_size=M` query parameters with a configurable default
//! and cap, and a `{count, next, previous, results}` response envelope.

use serde::{Deserialize, Serialize};

use crate::config::PaginationConfig;
use crate::error::AppError;

/// Pagination query parameters
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Resolved pagination window
#[derive(Debug, Clone, Copy)]
pub struct PageWindow {
    pub page: u32,
    pub page_size: u32,
}

impl PageWindow {
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }
}

impl PageParams {
    /// Resolve raw query parameters against configured bounds
    ///
    /// Page sizes above the cap are clamped, not rejected; zero values
    /// are validation errors.
    pub fn resolve(&self, config: &PaginationConfig) -> Result<PageWindow, AppError> {
        let page = self.page.unwrap_or(1);
        if page == 0 {
            return Err(AppError::Validation("page must be at least 1".to_string()));
        }

        let page_size = self.page_size.unwrap_or(config.default_page_size);
        if page_size == 0 {
            return Err(AppError::Validation(
                "page_size must be at least 1".to_string(),
            ));
        }
        let page_size = page_size.min(config.max_page_size);

        Ok(PageWindow { page, page_size })
    }
}

/// Paginated response envelope
///
/// `next`/`previous` are page numbers, null at the edges.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<u32>,
    pub previous: Option<u32>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Build an envelope from a window, total count, and page of results
    pub fn new(window: PageWindow, count: i64, results: Vec<T>) -> Self {
        let consumed = i64::from(window.page) * i64::from(window.page_size);
        let next = if consumed < count {
            Some(window.page + 1)
        } else {
            None
        };
        let previous = if window.page > 1 {
            Some(window.page - 1)
        } else {
            None
        };

        Self {
            count,
            next,
            previous,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> PaginationConfig {
        PaginationConfig {
            default_page_size: 10,
            max_page_size: 50,
        }
    }

    #[test]
    fn resolve_applies_defaults() {
        let window = PageParams::default().resolve(&test_config()).unwrap();
        assert_eq!(window.page, 1);
        assert_eq!(window.page_size, 10);
        assert_eq!(window.limit(), 10);
        assert_eq!(window.offset(), 0);
    }

    #[test]
    fn resolve_clamps_page_size_to_cap() {
        let params = PageParams {
            page: Some(3),
            page_size: Some(500),
        };
        let window = params.resolve(&test_config()).unwrap();
        assert_eq!(window.page_size, 50);
        assert_eq!(window.offset(), 100);
    }

    #[test]
    fn resolve_rejects_zero_values() {
        let zero_page = PageParams {
            page: Some(0),
            page_size: None,
        };
        assert!(matches!(
            zero_page.resolve(&test_config()),
            Err(AppError::Validation(_))
        ));

        let zero_size = PageParams {
            page: None,
            page_size: Some(0),
        };
        assert!(matches!(
            zero_size.resolve(&test_config()),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn envelope_links_pages() {
        let window = PageWindow {
            page: 2,
            page_size: 10,
        };
        let page = Page::new(window, 25, vec![0; 10]);
        assert_eq!(page.count, 25);
        assert_eq!(page.next, Some(3));
        assert_eq!(page.previous, Some(1));

        let last = Page::new(
            PageWindow {
                page: 3,
                page_size: 10,
            },
            25,
            vec![0; 5],
        );
        assert_eq!(last.next, None);
        assert_eq!(last.previous, Some(2));

        let only = Page::new(
            PageWindow {
                page: 1,
                page_size: 10,
            },
            5,
            vec![0; 5],
        );
        assert_eq!(only.next, None);
        assert_eq!(only.previous, None);
    }
}
