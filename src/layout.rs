//! Static page layout: commentary sidebar, filter controls, chart slots.
//!
//! Built once from the full table. Control options never change after
//! startup, so picking brands does not narrow the fuel list.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::charts::ChartKind;
use crate::data::{format_sales, RecordTable};
use crate::insights::Insights;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

const COMMENTARY: [(&str, &[&str]); 4] = [
    (
        "Brands and Models",
        &["The file features a wide range of automobile brands such as Toyota, Suzuki, \
           Tata Motors, Mahindra, Hyundai, Nissan, Xiaomi, Tesla, BYD, and Kia Corporation. \
           Models include various trims and body types like sedans, SUVs, coupes, \
           convertibles, hatchbacks, minivans, and wagons."],
    ),
    (
        "Fuel Types",
        &["Vehicles use different fuel types: gasoline, ethanol, diesel, bio-diesel, and \
           hybrid options. Gasoline and ethanol are the most common, with a significant \
           presence of diesel and bio-diesel vehicles, indicating a trend towards diverse \
           fuel options."],
    ),
    (
        "Transmission",
        &["The majority of vehicles have automatic transmissions, with a few manual \
           options, reflecting a preference for automatic vehicles over the years."],
    ),
    (
        "Trends and Insights",
        &[
            "Toyota and Suzuki are frequently mentioned, suggesting they are popular brands \
             in the file. Other brands like Mahindra, Hyundai, and Nissan also have \
             significant entries, indicating their market presence.",
            "The file shows a variety of fuel types, with a noticeable shift towards more \
             environmentally friendly options like ethanol and hybrid vehicles.",
            "Sedans and SUVs are the most common body types, with a wide range of trims, \
             indicating diverse consumer preferences.",
            "Automatic transmissions dominate the file, highlighting a long-term trend \
             towards automatic vehicles.",
        ],
    ),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlOptions {
    pub brands: Vec<String>,
    pub fuels: Vec<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: String,
    pub insight_lines: Vec<String>,
    pub controls: ControlOptions,
}

impl Layout {
    pub fn build(table: &RecordTable, insights: &Insights) -> Self {
        let span = table.date_span();
        Self {
            title: "Automobile Data Dashboard".to_string(),
            insight_lines: insight_lines(insights),
            controls: ControlOptions {
                brands: table.distinct_brands(),
                fuels: table.distinct_fuels(),
                start: span.map(|(lo, _)| lo),
                end: span.map(|(_, hi)| hi),
            },
        }
    }

    pub fn render_page(&self) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{css}</style>
    <script src="{plotly}"></script>
</head>
<body>
    <h1>&#128663; {title} &#128202;</h1>
    <div class="panes">
        <aside class="sidebar">
            <h3>Automobile Sales Insights</h3>
            {insights}
            {commentary}
        </aside>
        <main class="content">
            <div class="controls">
                {brand_control}
                {fuel_control}
                <div>
                    <label>Select Date Range:</label>
                    <input type="date" id="start-date" value="{start}" min="{start}" max="{end}">
                    <input type="date" id="end-date" value="{end}" min="{start}" max="{end}">
                </div>
            </div>
            <div id="status"></div>
            <div class="charts">
                {charts}
            </div>
            <div id="summary-table"></div>
        </main>
    </div>
    <script>const FIGURES = {figures};</script>
    <script>{js}</script>
</body>
</html>"#,
            title = html_escape(&self.title),
            css = inline_css(),
            plotly = PLOTLY_CDN,
            insights = paragraphs(&self.insight_lines),
            commentary = render_commentary(),
            brand_control = render_multi_select(
                "brand-dropdown",
                "Select Brand:",
                &self.controls.brands
            ),
            fuel_control = render_multi_select(
                "fuel-dropdown",
                "Select Fuel Type:",
                &self.controls.fuels
            ),
            start = date_value(self.controls.start),
            end = date_value(self.controls.end),
            charts = render_chart_slots(),
            figures = figure_map(),
            js = inline_javascript(),
        )
    }
}

fn insight_lines(insights: &Insights) -> Vec<String> {
    let years = match (insights.earliest_date, insights.latest_date) {
        (Some(lo), Some(hi)) => format!(" ({}-{})", lo.year(), hi.year()),
        _ => String::new(),
    };
    let range = match (insights.earliest_date, insights.latest_date) {
        (Some(lo), Some(hi)) => format!("{} to {}", lo, hi),
        _ => "no dated rows".to_string(),
    };
    vec![
        format!("Total Sales{}: {} units", years, format_sales(insights.total_sales)),
        format!(
            "Most Popular Brand: {}",
            insights.most_popular_brand.as_deref().unwrap_or("n/a")
        ),
        format!("Data Range: {}", range),
    ]
}

fn date_value(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

fn paragraphs(lines: &[String]) -> String {
    lines
        .iter()
        .map(|l| format!("<p>{}</p>", html_escape(l)))
        .collect::<Vec<_>>()
        .join("\n            ")
}

fn render_commentary() -> String {
    let mut html = String::new();
    for (heading, paras) in COMMENTARY {
        html.push_str(&format!("<h3>{}</h3>", heading));
        for p in paras {
            html.push_str(&format!("<p>{}</p>", p));
        }
    }
    html
}

fn render_multi_select(id: &str, label: &str, options: &[String]) -> String {
    let opts: String = options
        .iter()
        .map(|o| {
            let o = html_escape(o);
            format!("<option value=\"{}\">{}</option>", o, o)
        })
        .collect();
    format!(
        "<div><label for=\"{id}\">{label}</label><select id=\"{id}\" multiple>{opts}</select></div>",
        id = id,
        label = label,
        opts = opts
    )
}

fn render_chart_slots() -> String {
    ChartKind::ALL
        .iter()
        .map(|k| format!("<div class=\"chart\"><div id=\"{}\"></div></div>", k.element_id()))
        .collect::<Vec<_>>()
        .join("\n                ")
}

/// Element id -> field of the update response.
fn figure_map() -> String {
    let map: Map<String, Value> = ChartKind::ALL
        .iter()
        .map(|k| (k.element_id().to_string(), Value::String(k.output_field().to_string())))
        .collect();
    Value::Object(map).to_string()
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn inline_css() -> &'static str {
    r#"
body { font-family: 'Times New Roman', serif; padding: 20px; background: #000000; margin: 0; }
h1 { text-align: center; color: #DAA520; background: #000; padding: 10px; border-radius: 10px; }
h3 { color: #87CEEB; }
.panes { display: flex; flex-direction: row; }
.sidebar { width: 20%; padding: 10px; color: #FFFFFF; background: #1e1e1e; border-radius: 10px; margin-right: 20px; overflow-y: scroll; max-height: 90vh; }
.content { width: 80%; }
.controls { display: flex; justify-content: space-between; align-items: center; margin-bottom: 20px; }
.controls label { font-weight: bold; color: #87CEEB; display: block; }
.controls select { width: 200px; min-height: 6em; }
#status { color: #ff6b6b; }
.charts { display: flex; flex-wrap: wrap; }
.chart { width: 48%; margin: 1%; background: #1e1e1e; }
#summary-table { margin-top: 20px; padding: 10px; background: #fff; }
table.summary { border-collapse: collapse; }
table.summary th, table.summary td { border: 1px solid #ccc; padding: 4px 12px; text-align: left; }
"#
}

fn inline_javascript() -> &'static str {
    r#"
function selected(id) {
    return Array.from(document.getElementById(id).selectedOptions).map(o => o.value);
}

async function refresh() {
    const params = new URLSearchParams();
    selected("brand-dropdown").forEach(b => params.append("brand", b));
    selected("fuel-dropdown").forEach(f => params.append("fuel", f));
    params.set("start", document.getElementById("start-date").value);
    params.set("end", document.getElementById("end-date").value);

    const status = document.getElementById("status");
    const res = await fetch("/api/update?" + params.toString());
    if (!res.ok) {
        status.textContent = await res.text();
        return;
    }
    status.textContent = "";
    const out = await res.json();
    for (const [id, key] of Object.entries(FIGURES)) {
        Plotly.react(id, out[key].data, out[key].layout, { responsive: true });
    }
    document.getElementById("summary-table").innerHTML = out.summary_table;
}

document.querySelectorAll(".controls select, .controls input").forEach(el => {
    el.addEventListener("change", refresh);
});
refresh();
"#
}
