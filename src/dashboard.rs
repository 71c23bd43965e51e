//! Filter-and-render engine plus the process-wide dashboard state.
//!
//! [`render_dashboard`] is the handler invoked on every control change: a pure
//! function of the immutable table and the filter selection. [`Dashboard`]
//! bundles everything built once at startup.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;

use crate::charts::{ChartKind, Figure};
use crate::config::Columns;
use crate::data::{DatasetManifest, RecordTable};
use crate::filter::{DerivedView, FilterSelection};
use crate::insights::Insights;
use crate::layout::Layout;
use crate::logging::{log_insights, log_view, ProfileScope};
use crate::summary::{render_summary_table, summarize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardOutputs {
    pub line_chart: Figure,
    pub bar_chart: Figure,
    pub pie_chart: Figure,
    pub scatter_plot: Figure,
    pub box_plot: Figure,
    pub histogram: Figure,
    pub summary_table: String,
}

pub fn render_dashboard(
    table: &RecordTable,
    selection: &FilterSelection,
    columns: &Columns,
) -> DashboardOutputs {
    let _scope = ProfileScope::with_context(
        "render_dashboard",
        &[
            ("brands", json!(selection.brands.len())),
            ("fuels", json!(selection.fuels.len())),
        ],
    );
    let view = DerivedView::apply(table, selection);
    log_view(selection.brands.len(), selection.fuels.len(), view.len());

    DashboardOutputs {
        line_chart: ChartKind::Line.build(&view),
        bar_chart: ChartKind::Bar.build(&view),
        pie_chart: ChartKind::Pie.build(&view),
        scatter_plot: ChartKind::Scatter.build(&view),
        box_plot: ChartKind::Box.build(&view),
        histogram: ChartKind::Histogram.build(&view),
        summary_table: render_summary_table(&summarize(&view), &columns.brand, &columns.sales),
    }
}

/// State built once at startup and shared read-only by every request.
#[derive(Debug)]
pub struct Dashboard {
    table: RecordTable,
    columns: Columns,
    insights: Insights,
    layout: Layout,
    page: String,
    manifest: Option<DatasetManifest>,
}

impl Dashboard {
    pub fn new(table: RecordTable, columns: Columns, manifest: Option<DatasetManifest>) -> Self {
        let insights = Insights::compute(&table);
        log_insights(insights.total_sales, insights.most_popular_brand.as_deref());
        let layout = Layout::build(&table, &insights);
        let page = layout.render_page();
        Self {
            table,
            columns,
            insights,
            layout,
            page,
            manifest,
        }
    }

    pub fn table(&self) -> &RecordTable {
        &self.table
    }

    pub fn insights(&self) -> &Insights {
        &self.insights
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn page(&self) -> &str {
        &self.page
    }

    pub fn manifest(&self) -> Option<&DatasetManifest> {
        self.manifest.as_ref()
    }

    /// Date-picker defaults. An empty table falls back to today.
    pub fn default_span(&self) -> (NaiveDate, NaiveDate) {
        self.table.date_span().unwrap_or_else(|| {
            let today = chrono::Utc::now().date_naive();
            (today, today)
        })
    }

    pub fn update(&self, selection: &FilterSelection) -> DashboardOutputs {
        render_dashboard(&self.table, selection, &self.columns)
    }
}
