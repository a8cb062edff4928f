//! Paginated result envelope for in-memory catalog listings.

use serde::Serialize;

/// Page metadata reported alongside a slice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u32,
    pub page_size: u32,
    pub total: usize,
    pub page_count: usize,
}

/// One page of a fully materialized, ordered collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> Paginated<T> {
    /// Slice `items` to the requested page
    ///
    /// Pages past the end yield an empty slice. `page` and `page_size` are
    /// clamped to at least 1.
    pub fn from_items(items: Vec<T>, page: u32, page_size: u32) -> Self {
        let page = page.max(1);
        let page_size = page_size.max(1);
        let total = items.len();
        let size = page_size as usize;
        let offset = (page as usize - 1).saturating_mul(size);

        let data = items.into_iter().skip(offset).take(size).collect();

        Self {
            data,
            pagination: PaginationMeta {
                page,
                page_size,
                total,
                page_count: total.div_ceil(size),
            },
        }
    }
}
