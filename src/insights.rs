//! Startup aggregates over the full, unfiltered table.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

use crate::data::RecordTable;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub total_sales: f64,
    pub most_popular_brand: Option<String>,
    pub earliest_date: Option<NaiveDate>,
    pub latest_date: Option<NaiveDate>,
    pub rows: usize,
}

impl Insights {
    pub fn compute(table: &RecordTable) -> Self {
        let span = table.date_span();
        Self {
            total_sales: table.records().iter().filter_map(|r| r.sales).sum(),
            most_popular_brand: most_frequent_brand(table),
            earliest_date: span.map(|(lo, _)| lo),
            latest_date: span.map(|(_, hi)| hi),
            rows: table.len(),
        }
    }
}

/// Brand with the most rows. Ties go to the brand seen first in the table.
pub fn most_frequent_brand(table: &RecordTable) -> Option<String> {
    // brand -> (count, first row index)
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (i, r) in table.records().iter().enumerate() {
        counts.entry(r.brand.as_str()).or_insert((0, i)).0 += 1;
    }
    counts
        .into_iter()
        .max_by(|(_, (ca, fa)), (_, (cb, fb))| ca.cmp(cb).then(fb.cmp(fa)))
        .map(|(brand, _)| brand.to_string())
}
