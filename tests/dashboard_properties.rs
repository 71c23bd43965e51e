//! Properties of the filter-and-render engine over a generated table.

use automobile_dashboard::charts::{ChartKind, Figure};
use automobile_dashboard::config::Columns;
use automobile_dashboard::dashboard::render_dashboard;
use automobile_dashboard::data::{Record, RecordTable};
use automobile_dashboard::filter::{DerivedView, FilterSelection};
use automobile_dashboard::insights::Insights;
use automobile_dashboard::summary::summarize;
use chrono::{Duration, NaiveDate};

const BRANDS: [&str; 5] = ["Toyota", "Suzuki", "Tata Motors", "BYD", "Kia Corporation"];
const FUELS: [&str; 4] = ["gasoline", "ethanol", "diesel", "hybrid"];

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn point_count(fig: &Figure) -> usize {
    fig.data
        .iter()
        .map(|t| {
            ["y", "values", "x"]
                .iter()
                .find_map(|k| t[*k].as_array().map(Vec::len))
                .unwrap_or(0)
        })
        .sum()
}

/// Deterministic table: brand, fuel, date and sales cycle at different rates.
fn generated_table(n: usize) -> RecordTable {
    let base = d(1976, 1, 1);
    let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
    let records = (0..n)
        .map(|i| {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let days = (seed >> 33) % 17_500;
            Record::new(
                BRANDS[i % BRANDS.len()],
                FUELS[(i / 3) % FUELS.len()],
                base + Duration::days(days as i64),
                ((seed >> 20) % 500) as f64,
            )
        })
        .collect();
    RecordTable::from_records(records)
}

fn selections(table: &RecordTable) -> Vec<FilterSelection> {
    let (lo, hi) = table.date_span().unwrap();
    vec![
        FilterSelection::new(lo, hi),
        FilterSelection::new(d(1990, 1, 1), d(2005, 12, 31)),
        FilterSelection::new(lo, hi).with_brands(["Toyota", "BYD"]),
        FilterSelection::new(lo, hi).with_fuels(["diesel"]),
        FilterSelection::new(d(2000, 1, 1), d(2020, 1, 1))
            .with_brands(["Suzuki"])
            .with_fuels(["gasoline", "hybrid"]),
        FilterSelection::new(lo, hi).with_brands(["Nobody"]),
    ]
}

#[test]
fn view_membership_matches_predicate() {
    let table = generated_table(400);
    for sel in selections(&table) {
        let view = DerivedView::apply(&table, &sel);
        let expected: Vec<&Record> = table
            .records()
            .iter()
            .filter(|r| {
                r.date >= sel.start
                    && r.date <= sel.end
                    && (sel.brands.is_empty() || sel.brands.contains(&r.brand))
                    && (sel.fuels.is_empty() || sel.fuels.contains(&r.fuel))
            })
            .collect();
        assert_eq!(view.rows(), expected.as_slice(), "{:?}", sel);
    }
}

#[test]
fn summary_totals_partition_the_view() {
    let table = generated_table(400);
    for sel in selections(&table) {
        let view = DerivedView::apply(&table, &sel);
        let summary = summarize(&view);
        for row in &summary {
            let expected: f64 = view
                .rows()
                .iter()
                .filter(|r| r.brand == row.brand)
                .filter_map(|r| r.sales)
                .sum();
            assert_eq!(row.total_sales, expected);
        }
        let sum: f64 = summary.iter().map(|r| r.total_sales).sum();
        assert!((sum - view.total_sales()).abs() < 1e-6);
    }
}

#[test]
fn full_span_without_sets_returns_whole_table() {
    let table = generated_table(250);
    let (lo, hi) = table.date_span().unwrap();
    let view = DerivedView::apply(&table, &FilterSelection::new(lo, hi));
    assert_eq!(view.len(), table.len());
}

#[test]
fn out_of_span_filter_renders_empty_outputs() {
    let table = generated_table(250);
    let sel = FilterSelection::new(d(2100, 1, 1), d(2101, 1, 1));
    assert!(DerivedView::apply(&table, &sel).is_empty());

    let out = render_dashboard(&table, &sel, &Columns::default());
    let figures = [
        (ChartKind::Line, &out.line_chart),
        (ChartKind::Bar, &out.bar_chart),
        (ChartKind::Pie, &out.pie_chart),
        (ChartKind::Scatter, &out.scatter_plot),
        (ChartKind::Box, &out.box_plot),
        (ChartKind::Histogram, &out.histogram),
    ];
    for (kind, fig) in figures {
        assert_eq!(point_count(fig), 0, "{:?}", kind);
        assert_eq!(fig.layout["title"]["text"], kind.title());
    }
    assert!(out.summary_table.contains("<tbody></tbody>"));
}

#[test]
fn identical_inputs_give_identical_outputs() {
    let table = generated_table(300);
    for sel in selections(&table) {
        let a = render_dashboard(&table, &sel, &Columns::default());
        let b = render_dashboard(&table, &sel, &Columns::default());
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}

#[test]
fn insights_ignore_filters() {
    let table = generated_table(300);
    let before = Insights::compute(&table);
    for sel in selections(&table) {
        let _ = render_dashboard(&table, &sel, &Columns::default());
    }
    let total: f64 = table.records().iter().filter_map(|r| r.sales).sum();
    assert_eq!(before.total_sales, total);
    assert_eq!(Insights::compute(&table), before);
}

#[test]
fn toyota_example_from_two_rows() {
    let table = RecordTable::from_records(vec![
        Record::new("Toyota", "gasoline", d(2020, 1, 1), 100.0),
        Record::new("Suzuki", "diesel", d(2021, 6, 1), 50.0),
    ]);
    let sel = FilterSelection::new(d(2020, 1, 1), d(2020, 12, 31)).with_brands(["Toyota"]);
    let view = DerivedView::apply(&table, &sel);
    assert_eq!(view.rows(), &[&table.records()[0]]);
    let summary = summarize(&view);
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].brand, "Toyota");
    assert_eq!(summary[0].total_sales, 100.0);
}
