use serde::{Deserialize, Serialize};

use super::null_as_default;

/// A page of results from a list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct PaginatedList<T> {
    #[serde(default = "Vec::new", deserialize_with = "null_as_default")]
    pub items: Vec<T>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: i64,
    /// Current page, 1-indexed.
    #[serde(default, deserialize_with = "null_as_default")]
    pub page: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub page_size: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_pages: i64,
}

impl<T> PaginatedList<T> {
    /// Whether pages after this one exist.
    pub fn has_more(&self) -> bool {
        has_more(self.page, self.total_pages)
    }
}

/// `true` iff `page` is a real page and not the last one.
pub fn has_more(page: i64, total_pages: i64) -> bool {
    page > 0 && page < total_pages
}
