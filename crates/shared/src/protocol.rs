use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{Record, SortDirection, SortSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub size: u32,
    pub number: u32,
    pub total_elements: u64,
    pub total_pages: u32,
}

/// One bounded slice of the remote record set. Totals are authoritative for
/// pagination controls even though only `content` is held locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: PageMeta,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            content: Vec::new(),
            page: PageMeta::default(),
        }
    }

    pub fn total_elements(&self) -> u64 {
        self.page.total_elements
    }

    pub fn total_pages(&self) -> u32 {
        self.page.total_pages
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}

pub type RecordPage = Page<Record>;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub total_products: u64,
    pub total_inventory_value: f64,
    pub average_stock_age: f64,
}

/// Query string of the paged listing endpoint (`page`, `size`, `sort`, `dir`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: u32,
    pub size: u32,
    pub sort: String,
    pub dir: SortDirection,
}

impl PageQuery {
    pub fn new(page: u32, size: u32, sort: &SortSpec) -> Self {
        Self {
            page,
            size,
            sort: sort.field.clone(),
            dir: sort.direction,
        }
    }
}

/// Per-row failure reported by the spreadsheet import endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowValidationError {
    pub row: i64,
    #[serde(default)]
    pub column: String,
    #[serde(default)]
    pub message: String,
}

impl fmt::Display for RowValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {}, {}: {}", self.row, self.column, self.message)
    }
}
