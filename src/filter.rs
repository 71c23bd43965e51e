//! Filter selection and the derived view it produces.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::data::{parse_date, Record, RecordTable};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSelection {
    /// Empty means every brand.
    pub brands: BTreeSet<String>,
    /// Empty means every fuel type.
    pub fuels: BTreeSet<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FilterSelection {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            brands: BTreeSet::new(),
            fuels: BTreeSet::new(),
            start,
            end,
        }
    }

    pub fn with_brands<I, S>(mut self, brands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.brands = brands.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_fuels<I, S>(mut self, fuels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fuels = fuels.into_iter().map(Into::into).collect();
        self
    }

    /// Parse `brand=..&fuel=..&start=..&end=..`. Missing dates fall back to
    /// `default_span`; an unparseable date is an error.
    pub fn from_query(query: &str, default_span: (NaiveDate, NaiveDate)) -> Result<Self, String> {
        let mut selection = Self::new(default_span.0, default_span.1);
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "brand" if !value.is_empty() => {
                    selection.brands.insert(value.into_owned());
                }
                "fuel" if !value.is_empty() => {
                    selection.fuels.insert(value.into_owned());
                }
                "start" if !value.is_empty() => {
                    selection.start =
                        parse_date(&value).ok_or_else(|| format!("bad start date: {}", value))?;
                }
                "end" if !value.is_empty() => {
                    selection.end =
                        parse_date(&value).ok_or_else(|| format!("bad end date: {}", value))?;
                }
                _ => {}
            }
        }
        Ok(selection)
    }

    /// Date interval first, then brand membership, then fuel membership.
    pub fn matches(&self, r: &Record) -> bool {
        r.date >= self.start
            && r.date <= self.end
            && (self.brands.is_empty() || self.brands.contains(&r.brand))
            && (self.fuels.is_empty() || self.fuels.contains(&r.fuel))
    }
}

/// Rows of the table that pass a selection, in table order.
#[derive(Debug, Clone)]
pub struct DerivedView<'a> {
    rows: Vec<&'a Record>,
}

impl<'a> DerivedView<'a> {
    pub fn apply(table: &'a RecordTable, selection: &FilterSelection) -> Self {
        let rows = table
            .records()
            .iter()
            .filter(|r| selection.matches(r))
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[&'a Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Missing sales values are skipped.
    pub fn total_sales(&self) -> f64 {
        self.rows.iter().filter_map(|r| r.sales).sum()
    }

    /// Summed sales per brand, brands ascending.
    pub fn sales_by_brand(&self) -> BTreeMap<&'a str, f64> {
        self.sum_by(|r| r.brand.as_str())
    }

    /// Summed sales per fuel type, fuels ascending.
    pub fn sales_by_fuel(&self) -> BTreeMap<&'a str, f64> {
        self.sum_by(|r| r.fuel.as_str())
    }

    /// Rows grouped by brand, brands ascending, table order inside a group.
    pub fn rows_by_brand(&self) -> BTreeMap<&'a str, Vec<&'a Record>> {
        let mut groups: BTreeMap<&'a str, Vec<&'a Record>> = BTreeMap::new();
        for &r in &self.rows {
            groups.entry(r.brand.as_str()).or_default().push(r);
        }
        groups
    }

    /// A group whose rows all lack sales still appears, with 0.
    fn sum_by(&self, key: impl Fn(&'a Record) -> &'a str) -> BTreeMap<&'a str, f64> {
        let mut sums = BTreeMap::new();
        for &r in &self.rows {
            *sums.entry(key(r)).or_insert(0.0) += r.sales.unwrap_or(0.0);
        }
        sums
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn table() -> RecordTable {
        RecordTable::from_records(vec![
            Record::new("Toyota", "gasoline", d(2020, 1, 1), 100.0),
            Record::new("Suzuki", "diesel", d(2021, 6, 1), 50.0),
            Record::new("Toyota", "diesel", d(2020, 12, 31), 25.0),
        ])
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let t = table();
        let sel = FilterSelection::new(d(2020, 1, 1), d(2020, 12, 31));
        let view = DerivedView::apply(&t, &sel);
        assert_eq!(view.len(), 2);
        assert_eq!(view.total_sales(), 125.0);
    }

    #[test]
    fn brand_and_fuel_sets_intersect() {
        let t = table();
        let sel = FilterSelection::new(d(2000, 1, 1), d(2030, 1, 1))
            .with_brands(["Toyota"])
            .with_fuels(["diesel"]);
        let view = DerivedView::apply(&t, &sel);
        assert_eq!(view.len(), 1);
        assert_eq!(view.rows()[0].sales, Some(25.0));
    }

    #[test]
    fn reversed_interval_is_empty_not_error() {
        let t = table();
        let sel = FilterSelection::new(d(2022, 1, 1), d(2019, 1, 1));
        assert!(DerivedView::apply(&t, &sel).is_empty());
    }

    #[test]
    fn grouped_sums_are_sorted_by_key() {
        let t = table();
        let sel = FilterSelection::new(d(2000, 1, 1), d(2030, 1, 1));
        let view = DerivedView::apply(&t, &sel);
        let by_brand: Vec<_> = view.sales_by_brand().into_iter().collect();
        assert_eq!(by_brand, vec![("Suzuki", 50.0), ("Toyota", 125.0)]);
        let by_fuel: Vec<_> = view.sales_by_fuel().into_iter().collect();
        assert_eq!(by_fuel, vec![("diesel", 75.0), ("gasoline", 100.0)]);
    }

    #[test]
    fn missing_sales_are_skipped_in_sums() {
        let mut records = table().records().to_vec();
        records.push(Record {
            sales: None,
            ..Record::new("Kia", "hybrid", d(2020, 5, 5), 0.0)
        });
        let t = RecordTable::from_records(records);
        let view = DerivedView::apply(&t, &FilterSelection::new(d(2000, 1, 1), d(2030, 1, 1)));
        assert_eq!(view.len(), 4);
        assert_eq!(view.total_sales(), 175.0);
        assert_eq!(view.sales_by_brand().get("Kia"), Some(&0.0));
    }

    #[test]
    fn query_collects_repeated_keys() {
        let span = (d(2000, 1, 1), d(2030, 1, 1));
        let sel = FilterSelection::from_query(
            "brand=Toyota&brand=Tata+Motors&fuel=bio-diesel&start=2020-01-01",
            span,
        )
        .unwrap();
        assert_eq!(sel.brands.len(), 2);
        assert!(sel.brands.contains("Tata Motors"));
        assert!(sel.fuels.contains("bio-diesel"));
        assert_eq!(sel.start, d(2020, 1, 1));
        assert_eq!(sel.end, span.1);
    }

    #[test]
    fn query_rejects_unparseable_dates() {
        let span = (d(2000, 1, 1), d(2030, 1, 1));
        let err = FilterSelection::from_query("end=someday", span).unwrap_err();
        assert!(err.contains("end"));
    }

    #[test]
    fn view_keeps_table_order() {
        let t = table();
        let sel = FilterSelection::new(d(2020, 6, 1), d(2021, 12, 31)).with_fuels(["diesel"]);
        let view = DerivedView::apply(&t, &sel);
        let expected = vec![&t.records()[1], &t.records()[2]];
        assert_eq!(view.rows(), expected.as_slice());
    }
}
