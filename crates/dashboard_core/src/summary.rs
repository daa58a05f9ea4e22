//! Summary figures shown above the table, and the page-local approximation
//! used while the aggregate endpoint is failing.

use shared::{
    domain::Record,
    protocol::{RecordPage, SummaryStats},
};

/// Where the currently displayed summary came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryProvenance {
    /// Nothing has been obtained yet.
    #[default]
    Pending,
    /// Returned by the summary endpoint; covers the whole dataset.
    Authoritative,
    /// Computed from the loaded page only. The count is exact, value and
    /// average age cover the held records.
    Approximated,
}

/// Builds an approximate summary from the held page. Returns `None` when the
/// page holds no records, leaving whatever is displayed untouched.
pub fn approximate_summary(page: &RecordPage) -> Option<SummaryStats> {
    if page.content.is_empty() {
        return None;
    }

    let total_inventory_value: f64 = page.content.iter().map(Record::line_value).sum();
    let ages: Vec<i64> = page
        .content
        .iter()
        .filter_map(Record::valid_stock_age)
        .collect();
    let average_stock_age = if ages.is_empty() {
        0.0
    } else {
        round_to_tenth(ages.iter().sum::<i64>() as f64 / ages.len() as f64)
    };

    Some(SummaryStats {
        total_products: page.total_elements(),
        total_inventory_value,
        average_stock_age,
    })
}

pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
#[path = "tests/summary_tests.rs"]
mod tests;
