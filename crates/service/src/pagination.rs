//! Pagination utilities for service layer
//!
//! `Pagination` carries the page parameters exactly as a caller sent them;
//! `normalize` resolves them to a `PageWindow` before any query runs.

use common::utils::query::empty_as_none;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PER_PAGE: u64 = 20;
pub const MAX_PER_PAGE: u64 = 100;

/// Raw pagination parameters, either of which may be missing.
///
/// Deserializes straight from a query string (`?page=&perPage=`); empty
/// values count as missing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// 1-based page index
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<i64>,
    /// items per page
    #[serde(default, deserialize_with = "empty_as_none")]
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self { Self { page, per_page } }

    /// Substitute defaults for missing or out-of-range values.
    ///
    /// `page < 1` becomes 1; `per_page` outside `1..=100` becomes 20.
    pub fn normalize(self) -> PageWindow {
        let page = match self.page {
            Some(p) if p >= 1 => p as u64,
            _ => DEFAULT_PAGE,
        };
        let per_page = match self.per_page {
            Some(n) if n >= 1 && n as u64 <= MAX_PER_PAGE => n as u64,
            _ => DEFAULT_PER_PAGE,
        };
        PageWindow { page, per_page }
    }
}

/// A normalized page: `page >= 1`, `1 <= per_page <= 100`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u64,
    pub per_page: u64,
}

/// Largest offset a SQL `OFFSET` bind accepts (a signed 64-bit value).
pub const MAX_OFFSET: u64 = i64::MAX as u64;

impl PageWindow {
    /// Rows to skip before this page, capped at `MAX_OFFSET`. A capped
    /// offset is far past any real table, so the page comes back empty.
    pub fn offset(&self) -> u64 { (self.page - 1).saturating_mul(self.per_page).min(MAX_OFFSET) }
}

impl Default for PageWindow {
    fn default() -> Self { Self { page: DEFAULT_PAGE, per_page: DEFAULT_PER_PAGE } }
}

/// One page of results plus the metadata clients need to page through them.
///
/// `total_count` is the grand total of rows in the collection, never the
/// size of this page and never narrowed by a filter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResultSet<T> {
    pub items: Vec<T>,
    pub current_page: u64,
    pub total_count: u64,
    pub page_size: u64,
}

impl<T> PaginatedResultSet<T> {
    pub fn new(mut items: Vec<T>, window: PageWindow, total_count: u64) -> Self {
        items.truncate(window.per_page as usize);
        Self { items, current_page: window.page, total_count, page_size: window.per_page }
    }

    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 { return 0; }
        self.total_count.div_ceil(self.page_size)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResultSet<U> {
        PaginatedResultSet {
            items: self.items.into_iter().map(f).collect(),
            current_page: self.current_page,
            total_count: self.total_count,
            page_size: self.page_size,
        }
    }
}
