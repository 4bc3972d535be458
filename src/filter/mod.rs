// src/filter/mod.rs

pub mod options;

use anyhow::{anyhow, bail, Context, Result};
use arrow::{
    array::{
        Array, ArrayRef, BooleanArray, Float64Array, Int64Array, LargeStringArray, Scalar,
        StringArray,
    },
    compute::{and, filter_record_batch, kernels::cmp::eq},
    datatypes::DataType,
    record_batch::RecordBatch,
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, sync::Arc};
use tracing::{debug, error, warn};

use crate::schema::normalize::parse_integer;
use crate::table::IncidentTable;

pub use options::{filter_options, filter_panel, FilterControl, FilterField, DASHBOARD_FILTERS};

/// Wildcard selection: no constraint on the column.
pub const ALL: &str = "All";

/// A filter selection: the wildcard or one exact value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterValue {
    All,
    Value(String),
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        if s == ALL {
            FilterValue::All
        } else {
            FilterValue::Value(s)
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::from(s.to_string())
    }
}

impl From<FilterValue> for String {
    fn from(v: FilterValue) -> Self {
        match v {
            FilterValue::All => ALL.to_string(),
            FilterValue::Value(s) => s,
        }
    }
}

/// Canonical column name → selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredicateSet(BTreeMap<String, FilterValue>);

impl PredicateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: &str, value: impl Into<FilterValue>) -> Self {
        self.set(column, value);
        self
    }

    pub fn set(&mut self, column: &str, value: impl Into<FilterValue>) {
        self.0.insert(column.to_string(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&FilterValue> {
        self.0.get(column)
    }

    /// Predicates that actually constrain something.
    pub fn active(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().filter_map(|(c, v)| match v {
            FilterValue::All => None,
            FilterValue::Value(s) => Some((c.as_str(), s.as_str())),
        })
    }
}

/// Keep the rows matching every active predicate.
///
/// Wildcards and predicates on absent columns are ignored; a predicate that
/// cannot be evaluated is logged and skipped while the others still apply.
/// The source table is never modified.
pub fn apply_filters(table: &IncidentTable, predicates: &PredicateSet) -> IncidentTable {
    let mut mask: Option<BooleanArray> = None;

    for (column, wanted) in predicates.active() {
        let arr = match table.column(column) {
            Some(arr) => arr,
            None => {
                debug!(column, "filter column absent; ignored");
                continue;
            }
        };
        let step = equality_mask(arr, wanted).and_then(|m| match &mask {
            Some(prev) => and(prev, &m).context("combining filter masks"),
            None => Ok(m),
        });
        match step {
            Ok(m) => mask = Some(m),
            Err(e) => warn!(column, value = wanted, "skipping filter: {:#}", e),
        }
    }

    let mask = match mask {
        Some(mask) => mask,
        None => return table.clone(),
    };
    match filter_record_batch(table.batch(), &mask) {
        Ok(batch) => IncidentTable::from_batch(batch),
        Err(e) => {
            error!("filtering failed: {}", e);
            IncidentTable::from_batch(RecordBatch::new_empty(table.batch().schema()))
        }
    }
}

/// `column == wanted`, typed by the column. Missing cells never match.
fn equality_mask(arr: &ArrayRef, wanted: &str) -> Result<BooleanArray> {
    let rhs: ArrayRef = match arr.data_type() {
        DataType::Utf8 => Arc::new(StringArray::from(vec![wanted])),
        DataType::LargeUtf8 => Arc::new(LargeStringArray::from(vec![wanted])),
        DataType::Int64 => {
            let v = parse_integer(wanted)
                .ok_or_else(|| anyhow!("`{}` is not an integer", wanted))?;
            Arc::new(Int64Array::from(vec![v]))
        }
        DataType::Float64 => {
            let v: f64 = wanted
                .trim()
                .parse()
                .with_context(|| format!("`{}` is not a number", wanted))?;
            Arc::new(Float64Array::from(vec![v]))
        }
        other => bail!("cannot filter a {} column", other),
    };
    let matched = eq(arr, &Scalar::new(rhs)).context("comparing column")?;

    // Fold nulls into `false` so later `and`s stay two-valued.
    if matched.null_count() == 0 {
        return Ok(matched);
    }
    Ok(matched.iter().map(|v| Some(v.unwrap_or(false))).collect())
}
