//! Plotly figure builders.
//!
//! Each builder turns a [`DerivedView`] into a `{ data, layout }` figure that
//! the page hands to `Plotly.react`. An empty view yields a figure with no
//! points; none of the builders fail.

use serde::Serialize;
use serde_json::{json, Value};

use crate::data::Record;
use crate::filter::DerivedView;

const DATE_FMT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Value>,
    pub layout: Value,
}

#[cfg(test)]
impl Figure {
    pub(crate) fn title(&self) -> Option<&str> {
        self.layout["title"]["text"].as_str()
    }

    /// Total number of plotted values across traces.
    pub(crate) fn point_count(&self) -> usize {
        self.data
            .iter()
            .map(|t| {
                ["y", "values", "x"]
                    .iter()
                    .find_map(|k| t[*k].as_array().map(Vec::len))
                    .unwrap_or(0)
            })
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Bar,
    Pie,
    Scatter,
    Box,
    Histogram,
}

impl ChartKind {
    pub const ALL: [ChartKind; 6] = [
        ChartKind::Line,
        ChartKind::Bar,
        ChartKind::Pie,
        ChartKind::Scatter,
        ChartKind::Box,
        ChartKind::Histogram,
    ];

    /// DOM id of the chart's placeholder on the page.
    pub fn element_id(&self) -> &'static str {
        match self {
            Self::Line => "line-chart",
            Self::Bar => "bar-chart",
            Self::Pie => "pie-chart",
            Self::Scatter => "scatter-plot",
            Self::Box => "box-plot",
            Self::Histogram => "histogram",
        }
    }

    /// Field name in the serialized dashboard update.
    pub fn output_field(&self) -> &'static str {
        match self {
            Self::Line => "line_chart",
            Self::Bar => "bar_chart",
            Self::Pie => "pie_chart",
            Self::Scatter => "scatter_plot",
            Self::Box => "box_plot",
            Self::Histogram => "histogram",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Line => "Sales Trends",
            Self::Bar => "Brand Preferences",
            Self::Pie => "Fuel Type Distribution",
            Self::Scatter => "Sales by Date",
            Self::Box => "Box Plot of Sales by Brand",
            Self::Histogram => "Sales Distribution",
        }
    }

    pub fn background(&self) -> &'static str {
        match self {
            Self::Line => "#E0FFFF",
            Self::Bar => "#F5F5DC",
            Self::Pie => "#FFEFD5",
            Self::Scatter => "#FFFACD",
            Self::Box => "#FFEBEE",
            Self::Histogram => "#FFFACD",
        }
    }

    fn axis_labels(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::Line => Some(("Date", "Sales")),
            Self::Bar => Some(("Brand", "Sales")),
            Self::Pie => None,
            Self::Scatter => Some(("Observations", "Total sales")),
            Self::Box => Some(("Brand", "Sales")),
            Self::Histogram => Some(("Sales", "count")),
        }
    }

    pub fn build(&self, view: &DerivedView<'_>) -> Figure {
        match self {
            Self::Line => line_chart(view),
            Self::Bar => bar_chart(view),
            Self::Pie => pie_chart(view),
            Self::Scatter => scatter_plot(view),
            Self::Box => box_plot(view),
            Self::Histogram => histogram(view),
        }
    }
}

fn layout(kind: ChartKind) -> Value {
    let mut layout = json!({
        "title": { "text": kind.title() },
        "plot_bgcolor": kind.background(),
        "paper_bgcolor": kind.background(),
    });
    if let Some((x, y)) = kind.axis_labels() {
        layout["xaxis"] = json!({ "title": { "text": x } });
        layout["yaxis"] = json!({ "title": { "text": y } });
    }
    if matches!(kind, ChartKind::Line | ChartKind::Bar | ChartKind::Scatter) {
        layout["legend"] = json!({ "title": { "text": "Brand" } });
    }
    layout
}

fn dates(rows: &[&Record]) -> Vec<String> {
    rows.iter().map(|r| r.date.format(DATE_FMT).to_string()).collect()
}

fn sales(rows: &[&Record]) -> Vec<f64> {
    rows.iter().filter_map(|r| r.sales).collect()
}

/// Rows that have a sales value; per-row charts skip the rest.
fn with_sales<'a>(rows: &[&'a Record]) -> Vec<&'a Record> {
    rows.iter().copied().filter(|r| r.sales.is_some()).collect()
}

/// One line per brand, points in date order.
fn line_chart(view: &DerivedView<'_>) -> Figure {
    let data = view
        .rows_by_brand()
        .into_iter()
        .map(|(brand, rows)| {
            let mut rows = with_sales(&rows);
            rows.sort_by_key(|r| r.date);
            json!({
                "type": "scatter",
                "mode": "lines",
                "name": brand,
                "x": dates(&rows),
                "y": sales(&rows),
            })
        })
        .collect();
    Figure { data, layout: layout(ChartKind::Line) }
}

/// One bar per brand holding its summed sales.
fn bar_chart(view: &DerivedView<'_>) -> Figure {
    let data = view
        .sales_by_brand()
        .into_iter()
        .map(|(brand, total)| {
            json!({
                "type": "bar",
                "name": brand,
                "x": [brand],
                "y": [total],
            })
        })
        .collect();
    Figure { data, layout: layout(ChartKind::Bar) }
}

fn pie_chart(view: &DerivedView<'_>) -> Figure {
    let (labels, values): (Vec<&str>, Vec<f64>) = view.sales_by_fuel().into_iter().unzip();
    Figure {
        data: vec![json!({
            "type": "pie",
            "labels": labels,
            "values": values,
        })],
        layout: layout(ChartKind::Pie),
    }
}

/// Individual records, one marker series per brand.
fn scatter_plot(view: &DerivedView<'_>) -> Figure {
    let data = view
        .rows_by_brand()
        .into_iter()
        .map(|(brand, rows)| {
            let rows = with_sales(&rows);
            json!({
                "type": "scatter",
                "mode": "markers",
                "name": brand,
                "x": dates(&rows),
                "y": sales(&rows),
            })
        })
        .collect();
    Figure { data, layout: layout(ChartKind::Scatter) }
}

fn box_plot(view: &DerivedView<'_>) -> Figure {
    let rows = with_sales(view.rows());
    let brands: Vec<&str> = rows.iter().map(|r| r.brand.as_str()).collect();
    Figure {
        data: vec![json!({
            "type": "box",
            "x": brands,
            "y": sales(&rows),
        })],
        layout: layout(ChartKind::Box),
    }
}

fn histogram(view: &DerivedView<'_>) -> Figure {
    Figure {
        data: vec![json!({
            "type": "histogram",
            "x": sales(view.rows()),
        })],
        layout: layout(ChartKind::Histogram),
    }
}
