//! Pagination metadata and the list response envelope.

use crate::record::Record;
use serde::{Deserialize, Serialize};

/// Page size used before the server has reported one.
pub const DEFAULT_ITEMS_PER_PAGE: u64 = 10;

/// Pagination state derived from the latest list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub total_records: u64,
    pub items_per_page: u64,
    pub total_pages: u64,
}

impl PageMeta {
    pub fn with_items_per_page(items_per_page: u64) -> Self {
        Self {
            total_records: 0,
            items_per_page,
            total_pages: 0,
        }
    }

    /// Folds a response into the metadata.
    ///
    /// `total_pages` is computed with the page size the request was sent
    /// with; the server-reported page size then replaces `items_per_page`
    /// for the next request.
    pub fn apply(&mut self, meta: &ResponseMeta) {
        self.total_records = meta.total_count;
        self.total_pages = total_pages(meta.total_count, self.items_per_page);
        self.items_per_page = meta.page_size;
    }
}

impl Default for PageMeta {
    fn default() -> Self {
        Self::with_items_per_page(DEFAULT_ITEMS_PER_PAGE)
    }
}

/// `ceil(total / per_page)`; zero when the page size is zero.
pub fn total_pages(total: u64, per_page: u64) -> u64 {
    if per_page == 0 {
        0
    } else {
        total.div_ceil(per_page)
    }
}

/// The `_meta` block of a list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMeta {
    #[serde(rename = "totalCount")]
    pub total_count: u64,
    #[serde(rename = "pageSize")]
    pub page_size: u64,
}

/// Body of `GET /records`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordsPage {
    #[serde(default)]
    pub items: Vec<Record>,
    #[serde(rename = "_meta")]
    pub meta: ResponseMeta,
}
