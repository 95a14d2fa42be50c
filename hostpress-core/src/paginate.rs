//! Offset pagination shared by services and transports.

use serde::Serialize;

/// A requested page: 1-based `page`, `page_size` items per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub page_size: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
        }
    }
}

impl Pagination {
    /// Builds a window from raw inputs. Unparsable or zero pages become 1,
    /// the size falls back to `default_size` and is clamped to `[1, max_size]`.
    pub fn from_raw(
        page: Option<&str>,
        page_size: Option<&str>,
        default_size: u64,
        max_size: u64,
    ) -> Self {
        let page = page
            .and_then(|p| p.trim().parse::<u64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);

        let max_size = max_size.max(1);
        let page_size = page_size
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(default_size)
            .clamp(1, max_size);

        Self { page, page_size }
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        self.page_size
    }
}

/// Params that may carry a pagination window.
///
/// `None` means the caller wants the whole, unpaged listing.
pub trait PaginateParams {
    fn pagination(&self) -> Option<Pagination>;
}

impl PaginateParams for () {
    fn pagination(&self) -> Option<Pagination> {
        None
    }
}

impl PaginateParams for Option<Pagination> {
    fn pagination(&self) -> Option<Pagination> {
        *self
    }
}

/// One page of results plus the independently counted total.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<R> {
    pub items: Vec<R>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

impl<R> Paginated<R> {
    pub fn new(items: Vec<R>, total: u64, window: Pagination) -> Self {
        Self {
            items,
            total,
            page: window.page,
            page_size: window.page_size,
            total_pages: total.div_ceil(window.page_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_is_offset_of_previous_pages() {
        let p = Pagination::from_raw(Some("2"), Some("5"), 20, 100);
        assert_eq!(p.skip(), 5);
        assert_eq!(p.limit(), 5);
    }

    #[test]
    fn bad_inputs_fall_back() {
        let p = Pagination::from_raw(Some("0"), Some("nope"), 20, 100);
        assert_eq!(p, Pagination { page: 1, page_size: 20 });

        let p = Pagination::from_raw(Some("-3"), Some("5000"), 20, 100);
        assert_eq!(p, Pagination { page: 1, page_size: 100 });
    }

    #[test]
    fn total_pages_rounds_up() {
        let window = Pagination { page: 2, page_size: 5 };
        let page = Paginated::new(vec![6, 7], 7, window);
        assert_eq!(page.total_pages, 2);

        let empty: Paginated<u8> = Paginated::new(vec![], 0, Pagination { page: 1, page_size: 20 });
        assert_eq!(empty.total_pages, 0);
    }
}
