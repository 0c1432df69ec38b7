//! Page/limit windowing for list endpoints.

use serde::Serialize;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 6;

/// A requested window. Missing, non-numeric or non-positive values fall back
/// to the defaults (page 1, limit 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Self {
        Self {
            page: page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE),
            limit: limit.filter(|l| *l > 0).unwrap_or(DEFAULT_LIMIT),
        }
    }

    /// Parses raw query-string values the lenient way: anything that is not a
    /// positive integer is ignored.
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Self {
        let num = |raw: Option<&str>| raw.and_then(|v| v.trim().parse::<u64>().ok());
        Self::new(num(page), num(limit))
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub total: u64,
    pub page: u64,
    pub pages: u64,
    pub limit: u64,
}

/// One window of results plus the totals needed to render a pager.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            pagination: Pagination {
                total,
                page: request.page,
                pages: total.div_ceil(request.limit),
                limit: request.limit,
            },
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_and_invalid_values() {
        assert_eq!(PageRequest::parse(None, None), PageRequest { page: 1, limit: 6 });
        assert_eq!(PageRequest::parse(Some("abc"), Some("0")), PageRequest { page: 1, limit: 6 });
        assert_eq!(PageRequest::parse(Some("-2"), Some("10")), PageRequest { page: 1, limit: 10 });
    }

    #[test]
    fn skip_and_page_count() {
        let req = PageRequest::new(Some(3), Some(6));
        assert_eq!(req.skip(), 12);

        let page: Page<u8> = Page::new(vec![], 13, req);
        assert_eq!(page.pagination.pages, 3);
        let empty: Page<u8> = Page::new(vec![], 0, req);
        assert_eq!(empty.pagination.pages, 0);
    }
}
