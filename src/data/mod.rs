//! Sales record loading.
//!
//! Reads the dataset CSV into an immutable [`RecordTable`]. The observation
//! column is parsed with [`parse_date`]; rows whose date cannot be parsed are
//! discarded and counted in the [`LoadReport`]. A blank sales cell is kept as
//! a missing value.

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::config::Columns;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub brand: String,
    pub fuel: String,
    pub transmission: Option<String>,
    /// `None` when the cell was blank.
    pub sales: Option<f64>,
    pub date: NaiveDate,
}

impl Record {
    pub fn new(brand: &str, fuel: &str, date: NaiveDate, sales: f64) -> Self {
        Self {
            brand: brand.to_string(),
            fuel: fuel.to_string(),
            transmission: None,
            sales: Some(sales),
            date,
        }
    }
}

/// All rows that survived loading, in file order.
#[derive(Debug, Clone, Default)]
pub struct RecordTable {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl RecordTable {
    pub fn from_records(records: Vec<Record>) -> Self {
        Self {
            columns: Vec::new(),
            records,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest observation date, `None` for an empty table.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut iter = self.records.iter().map(|r| r.date);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }

    /// Distinct brands in first-seen order.
    pub fn distinct_brands(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.brand.as_str()))
    }

    /// Distinct fuel types in first-seen order.
    pub fn distinct_fuels(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.fuel.as_str()))
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for v in values {
        if seen.insert(v) {
            out.push(v.to_string());
        }
    }
    out
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub rows_dropped: usize,
    /// Kept rows whose sales cell was blank.
    pub rows_missing_sales: usize,
}

pub fn load_table(path: &Path, columns: &Columns) -> Result<(RecordTable, LoadReport)> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    read_table(file, columns).with_context(|| format!("cannot load {}", path.display()))
}

pub fn read_table<R: Read>(reader: R, columns: &Columns) -> Result<(RecordTable, LoadReport)> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let header: Vec<String> = rdr.headers()?.iter().map(|s| s.to_string()).collect();
    let find = |name: &str| header.iter().position(|h| h == name);
    let required = |name: &str| find(name).ok_or_else(|| anyhow!("missing column {:?}", name));

    let date_idx = required(&columns.date)?;
    let brand_idx = required(&columns.brand)?;
    let fuel_idx = required(&columns.fuel)?;
    let sales_idx = required(&columns.sales)?;
    let transmission_idx = find(&columns.transmission);

    let mut report = LoadReport::default();
    let mut records = Vec::new();

    for (i, result) in rdr.records().enumerate() {
        let row = result?;
        report.rows_read += 1;
        let cell = |idx: usize| row.get(idx).unwrap_or("");

        let Some(date) = parse_date(cell(date_idx)) else {
            report.rows_dropped += 1;
            continue;
        };
        let raw_sales = cell(sales_idx);
        let sales = if raw_sales.is_empty() {
            report.rows_missing_sales += 1;
            None
        } else {
            match parse_sales(raw_sales) {
                Some(v) => Some(v),
                // header is line 1
                None => bail!("line {}: bad sales value {:?}", i + 2, raw_sales),
            }
        };

        records.push(Record {
            brand: cell(brand_idx).to_string(),
            fuel: cell(fuel_idx).to_string(),
            transmission: transmission_idx.map(|idx| cell(idx).to_string()),
            sales,
            date,
        });
    }

    report.rows_kept = records.len();
    Ok((RecordTable { columns: header, records }, report))
}

// %.f also accepts a missing fraction
const DATETIME_FORMATS: [&str; 7] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%d.%m.%Y %H:%M",
];

const DATE_FORMATS: [&str; 10] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d.%m.%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%Y%m%d",
];

/// Best-effort date parsing. Timestamps keep only their calendar date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    // "2021-06" and "2021" name the first day of the period
    if let Ok(d) = NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d") {
        return Some(d);
    }
    if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
        return s.parse().ok().and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1));
    }
    None
}

pub fn parse_sales(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Whole numbers print without a fractional part.
pub fn format_sales(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

// =============================================================================
// Manifest
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct DatasetManifest {
    pub path: String,
    pub hash_sha256: String,
    pub columns: Vec<String>,
    pub rows_read: usize,
    pub rows_kept: usize,
    pub rows_dropped: usize,
    pub rows_missing_sales: usize,
    pub date_min: Option<NaiveDate>,
    pub date_max: Option<NaiveDate>,
}

impl DatasetManifest {
    pub fn build(path: &Path, table: &RecordTable, report: &LoadReport) -> Result<Self> {
        let span = table.date_span();
        Ok(Self {
            path: path.display().to_string(),
            hash_sha256: file_sha256(path)?,
            columns: table.columns().to_vec(),
            rows_read: report.rows_read,
            rows_kept: report.rows_kept,
            rows_dropped: report.rows_dropped,
            rows_missing_sales: report.rows_missing_sales,
            date_min: span.map(|(lo, _)| lo),
            date_max: span.map(|(_, hi)| hi),
        })
    }
}

pub fn file_sha256(path: &Path) -> Result<String> {
    let mut file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

pub fn default_manifest_path(dataset_path: &Path) -> PathBuf {
    let mut p = dataset_path.to_path_buf();
    let fname = dataset_path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("dataset.csv");
    p.set_file_name(format!("{}.manifest.json", fname));
    p
}
