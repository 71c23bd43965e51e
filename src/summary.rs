//! Brand summary table shown under the charts.

use serde::Serialize;

use crate::data::format_sales;
use crate::filter::DerivedView;
use crate::layout::html_escape;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub brand: String,
    pub total_sales: f64,
}

/// Summed sales per brand over the view, brands ascending.
pub fn summarize(view: &DerivedView<'_>) -> Vec<SummaryRow> {
    view.sales_by_brand()
        .into_iter()
        .map(|(brand, total_sales)| SummaryRow {
            brand: brand.to_string(),
            total_sales,
        })
        .collect()
}

pub fn render_summary_table(rows: &[SummaryRow], brand_header: &str, sales_header: &str) -> String {
    let mut html = String::from("<table class=\"summary\">");
    html.push_str(&format!(
        "<thead><tr><th>{}</th><th>{}</th></tr></thead><tbody>",
        html_escape(brand_header),
        html_escape(sales_header)
    ));
    for row in rows {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>",
            html_escape(&row.brand),
            format_sales(row.total_sales)
        ));
    }
    html.push_str("</tbody></table>");
    html
}
