// src/aggregate/mod.rs
//
// Aggregations that never raise. Every result is an `Aggregate<T>`, so an empty
// view, a missing column or a column full of blanks shows up as
// `Aggregate::Unavailable` rather than an error or a NaN.

pub mod describe;

use anyhow::{anyhow, Result};
use arrow::array::{Array, Int64Array};
use serde::Serialize;
use std::{cmp::Ordering, collections::HashMap, fmt};
use tracing::debug;

use crate::schema::YEAR;
use crate::table::{cell_key, numeric_values, IncidentTable};

pub use describe::{describe, ColumnSummary};

/// Rendered in place of any unavailable value.
pub const SENTINEL: &str = "–";

/// Either a computed value or the explicit "could not be computed" marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Aggregate<T> {
    Value(T),
    Unavailable,
}

impl<T> Aggregate<T> {
    pub fn value(self) -> Option<T> {
        match self {
            Aggregate::Value(v) => Some(v),
            Aggregate::Unavailable => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Aggregate<U> {
        match self {
            Aggregate::Value(v) => Aggregate::Value(f(v)),
            Aggregate::Unavailable => Aggregate::Unavailable,
        }
    }

    pub fn unwrap_or(self, default: T) -> T {
        self.value().unwrap_or(default)
    }
}

impl<T> From<Option<T>> for Aggregate<T> {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => Aggregate::Value(v),
            None => Aggregate::Unavailable,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Aggregate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregate::Value(v) => v.fmt(f),
            Aggregate::Unavailable => f.write_str(SENTINEL),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    Mean,
    Sum,
}

/// Mean or sum over the present entries. Missing and NaN entries count in
/// neither the numerator nor the denominator.
pub fn reduce(series: &[Option<f64>], op: ReduceOp) -> Aggregate<f64> {
    let present: Vec<f64> = series
        .iter()
        .flatten()
        .copied()
        .filter(|v| !v.is_nan())
        .collect();
    if present.is_empty() {
        return Aggregate::Unavailable;
    }
    let sum: f64 = present.iter().sum();
    match op {
        ReduceOp::Sum => Aggregate::Value(sum),
        ReduceOp::Mean => Aggregate::Value(sum / present.len() as f64),
    }
}

/// `reduce` over a table column; absent or non-numeric columns are unavailable.
pub fn reduce_column(table: &IncidentTable, column: &str, op: ReduceOp) -> Aggregate<f64> {
    match table.numeric_values(column) {
        Some(values) => reduce(&values, op),
        None => Aggregate::Unavailable,
    }
}

/// Per-key accumulator that remembers first-appearance order.
struct Tally<V> {
    order: Vec<(String, V)>,
    index: HashMap<String, usize>,
}

impl<V: Default> Tally<V> {
    fn new() -> Self {
        Self {
            order: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn entry(&mut self, key: String) -> &mut V {
        let idx = match self.index.get(&key) {
            Some(&idx) => idx,
            None => {
                self.order.push((key.clone(), V::default()));
                self.index.insert(key, self.order.len() - 1);
                self.order.len() - 1
            }
        };
        &mut self.order[idx].1
    }

    fn into_entries(self) -> Vec<(String, V)> {
        self.order
    }
}

/// First entry with the largest value; earlier entries win ties.
fn first_max<V: PartialOrd>(entries: Vec<(String, V)>) -> Option<String> {
    let mut best: Option<(String, V)> = None;
    for (k, v) in entries {
        let replace = match &best {
            Some((_, bv)) => v.partial_cmp(bv) == Some(Ordering::Greater),
            None => true,
        };
        if replace {
            best = Some((k, v));
        }
    }
    best.map(|(k, _)| k)
}

fn count_values(table: &IncidentTable, column: &str) -> Result<Vec<(String, usize)>> {
    let arr = table
        .column(column)
        .ok_or_else(|| anyhow!("column `{}` not found", column))?;
    let mut tally: Tally<usize> = Tally::new();
    for row in 0..arr.len() {
        if let Some(key) = cell_key(arr.as_ref(), row) {
            *tally.entry(key) += 1;
        }
    }
    Ok(tally.into_entries())
}

/// The most common non-missing value of `column`.
///
/// Ties go to the value that appears first in row order.
pub fn most_frequent(table: &IncidentTable, column: &str) -> Aggregate<String> {
    if table.is_empty() {
        return Aggregate::Unavailable;
    }
    match count_values(table, column) {
        Ok(counts) => first_max(counts).into(),
        Err(e) => {
            debug!("most_frequent({}) unavailable: {}", column, e);
            Aggregate::Unavailable
        }
    }
}

fn sum_by_group(table: &IncidentTable, group: &str, value: &str) -> Result<Vec<(String, f64)>> {
    let keys = table
        .column(group)
        .ok_or_else(|| anyhow!("column `{}` not found", group))?;
    let values = table
        .numeric_values(value)
        .ok_or_else(|| anyhow!("column `{}` is absent or not numeric", value))?;

    // Groups only exist once they have seen a present value.
    let mut tally: Tally<f64> = Tally::new();
    for (row, v) in values.iter().enumerate() {
        if let (Some(key), Some(v)) = (cell_key(keys.as_ref(), row), v) {
            *tally.entry(key) += *v;
        }
    }
    Ok(tally.into_entries())
}

/// The group key of `group` whose summed `value` is largest.
///
/// Rows with a missing key are dropped, groups with no present value do not
/// compete, and ties go to the key that appears first in row order.
pub fn group_sum(table: &IncidentTable, group: &str, value: &str) -> Aggregate<String> {
    if table.is_empty() {
        return Aggregate::Unavailable;
    }
    match sum_by_group(table, group, value) {
        Ok(sums) => first_max(sums).into(),
        Err(e) => {
            debug!("group_sum({}, {}) unavailable: {}", group, value, e);
            Aggregate::Unavailable
        }
    }
}

/// Counts per non-missing value, most common first, truncated to `limit`.
/// Equal counts keep first-appearance order. Empty when the column is absent.
pub fn value_counts(table: &IncidentTable, column: &str, limit: usize) -> Vec<(String, usize)> {
    let mut counts = count_values(table, column).unwrap_or_default();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(limit);
    counts
}

/// Row count per key of `column`, in ascending key order.
pub fn group_size(table: &IncidentTable, column: &str) -> Vec<(String, usize)> {
    let mut counts = count_values(table, column).unwrap_or_default();
    sort_keys(table, column, &mut counts);
    counts
}

/// Summed `value` per key of `group`, in ascending key order.
pub fn group_sum_series(table: &IncidentTable, group: &str, value: &str) -> Vec<(String, f64)> {
    let mut sums = sum_by_group(table, group, value).unwrap_or_default();
    sort_keys(table, group, &mut sums);
    sums
}

/// Numeric columns sort by value, everything else lexically.
fn sort_keys<V>(table: &IncidentTable, column: &str, entries: &mut [(String, V)]) {
    let numeric = table
        .column(column)
        .map(|c| c.data_type().is_numeric())
        .unwrap_or(false);
    if numeric {
        entries.sort_by(|a, b| {
            let (x, y) = (a.0.parse::<f64>(), b.0.parse::<f64>());
            match (x, y) {
                (Ok(x), Ok(y)) => x.total_cmp(&y),
                _ => a.0.cmp(&b.0),
            }
        });
    } else {
        entries.sort_by(|a, b| a.0.cmp(&b.0));
    }
}

/// Earliest and latest `Year` in the table.
pub fn year_range(table: &IncidentTable) -> Aggregate<(i64, i64)> {
    let years = match table
        .column(YEAR)
        .and_then(|c| c.as_any().downcast_ref::<Int64Array>())
    {
        Some(years) => years,
        None => {
            return table
                .column(YEAR)
                .and_then(|c| numeric_values(c.as_ref()))
                .and_then(|v| {
                    let present: Vec<f64> = v.into_iter().flatten().collect();
                    let min = present.iter().copied().reduce(f64::min)?;
                    let max = present.iter().copied().reduce(f64::max)?;
                    Some((min as i64, max as i64))
                })
                .into();
        }
    };
    match (arrow::compute::min(years), arrow::compute::max(years)) {
        (Some(min), Some(max)) => Aggregate::Value((min, max)),
        _ => Aggregate::Unavailable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{COUNTRY, FATALITIES_AIR};
    use arrow::{
        array::{ArrayRef, StringArray},
        datatypes::{DataType, Field, Schema},
        record_batch::RecordBatch,
    };
    use std::sync::Arc;

    fn table(
        countries: Vec<Option<&str>>,
        years: Vec<Option<i64>>,
        fatal: Vec<Option<i64>>,
    ) -> IncidentTable {
        let schema = Arc::new(Schema::new(vec![
            Field::new(COUNTRY, DataType::Utf8, true),
            Field::new(YEAR, DataType::Int64, true),
            Field::new(FATALITIES_AIR, DataType::Int64, true),
        ]));
        let cols: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(countries)),
            Arc::new(Int64Array::from(years)),
            Arc::new(Int64Array::from(fatal)),
        ];
        IncidentTable::from_batch(RecordBatch::try_new(schema, cols).unwrap())
    }

    #[test]
    fn reduce_returns_sentinel_for_empty_and_all_missing() {
        assert_eq!(reduce(&[], ReduceOp::Mean), Aggregate::Unavailable);
        assert_eq!(reduce(&[None, None], ReduceOp::Mean), Aggregate::Unavailable);
        assert_eq!(reduce(&[None, Some(f64::NAN)], ReduceOp::Sum), Aggregate::Unavailable);
        assert_eq!(Aggregate::<f64>::Unavailable.to_string(), SENTINEL);
    }

    #[test]
    fn reduce_ignores_missing_entries() {
        let s = [Some(1.0), None, Some(3.0)];
        assert_eq!(reduce(&s, ReduceOp::Mean), Aggregate::Value(2.0));
        assert_eq!(reduce(&s, ReduceOp::Sum), Aggregate::Value(4.0));
        // A real zero is a value, not the sentinel.
        assert_eq!(reduce(&[Some(0.0)], ReduceOp::Sum), Aggregate::Value(0.0));
    }

    #[test]
    fn most_frequent_picks_highest_count() {
        let mut countries = vec![Some("USA"); 5];
        countries.extend(vec![Some("UK"); 3]);
        countries.insert(0, Some("UK"));
        countries.push(None);
        let n = countries.len();
        let t = table(countries, vec![None; n], vec![None; n]);
        assert_eq!(most_frequent(&t, COUNTRY), Aggregate::Value("USA".to_string()));
    }

    #[test]
    fn most_frequent_ties_go_to_first_seen() {
        let t = table(
            vec![Some("UK"), Some("USA"), Some("USA"), Some("UK")],
            vec![None; 4],
            vec![None; 4],
        );
        assert_eq!(most_frequent(&t, COUNTRY), Aggregate::Value("UK".to_string()));
    }

    #[test]
    fn most_frequent_sentinel_cases() {
        let t = table(vec![None, None], vec![None, None], vec![None, None]);
        assert_eq!(most_frequent(&t, COUNTRY), Aggregate::Unavailable);
        assert_eq!(most_frequent(&t, "Operator"), Aggregate::Unavailable);
        assert_eq!(most_frequent(&IncidentTable::empty(), COUNTRY), Aggregate::Unavailable);
    }

    #[test]
    fn group_sum_returns_key_with_largest_total() {
        let t = table(
            vec![Some("USA"), Some("USA"), Some("UK"), None],
            vec![Some(1985), Some(1985), Some(1990), Some(2000)],
            vec![Some(20), Some(50), Some(0), Some(999)],
        );
        assert_eq!(group_sum(&t, COUNTRY, FATALITIES_AIR), Aggregate::Value("USA".to_string()));
        assert_eq!(group_sum(&t, YEAR, FATALITIES_AIR), Aggregate::Value("2000".to_string()));
    }

    #[test]
    fn group_sum_sentinel_cases() {
        let t = table(vec![Some("USA"), Some("UK")], vec![None, None], vec![None, None]);
        assert_eq!(group_sum(&t, COUNTRY, FATALITIES_AIR), Aggregate::Unavailable);
        assert_eq!(group_sum(&t, COUNTRY, "Ground"), Aggregate::Unavailable);
        assert_eq!(group_sum(&t, "Region", FATALITIES_AIR), Aggregate::Unavailable);
        // Text value column cannot be summed.
        assert_eq!(group_sum(&t, YEAR, COUNTRY), Aggregate::Unavailable);
        assert_eq!(
            group_sum(&IncidentTable::empty(), COUNTRY, FATALITIES_AIR),
            Aggregate::Unavailable
        );
    }

    #[test]
    fn value_counts_orders_and_truncates() {
        let t = table(
            vec![Some("B"), Some("A"), Some("A"), Some("C"), Some("B"), Some("A"), None],
            vec![None; 7],
            vec![None; 7],
        );
        assert_eq!(
            value_counts(&t, COUNTRY, 2),
            vec![("A".to_string(), 3), ("B".to_string(), 2)]
        );
        assert!(value_counts(&t, "Region", 5).is_empty());
    }

    #[test]
    fn grouped_series_sort_numerically() {
        let t = table(
            vec![None; 4],
            vec![Some(1990), Some(985), Some(1990), None],
            vec![Some(1), Some(2), Some(3), Some(4)],
        );
        assert_eq!(
            group_size(&t, YEAR),
            vec![("985".to_string(), 1), ("1990".to_string(), 2)]
        );
        assert_eq!(
            group_sum_series(&t, YEAR, FATALITIES_AIR),
            vec![("985".to_string(), 2.0), ("1990".to_string(), 4.0)]
        );
    }

    #[test]
    fn year_range_spans_present_years() {
        let t = table(vec![None; 3], vec![Some(1990), None, Some(1908)], vec![None; 3]);
        assert_eq!(year_range(&t), Aggregate::Value((1908, 1990)));
        assert_eq!(year_range(&IncidentTable::empty()), Aggregate::Unavailable);
    }
}
