// src/table/mod.rs

pub mod load;

use arrow::{
    array::{Array, ArrayRef, Float64Array, Int64Array, LargeStringArray, StringArray},
    datatypes::{DataType, Schema},
    record_batch::RecordBatch,
    util::display::{ArrayFormatter, FormatOptions},
};
use std::sync::Arc;

pub use load::{load_incidents, read_csv_as_text};

/// An immutable, ordered table of incident records.
///
/// Cloning is cheap: the underlying Arrow buffers are reference counted, and
/// nothing in this crate mutates a table once built. Filtering and derivation
/// always produce a new `IncidentTable`.
#[derive(Debug, Clone)]
pub struct IncidentTable {
    batch: RecordBatch,
}

impl IncidentTable {
    /// Zero rows, no columns. This is the load-failure signal.
    pub fn empty() -> Self {
        Self {
            batch: RecordBatch::new_empty(Arc::new(Schema::empty())),
        }
    }

    pub fn from_batch(batch: RecordBatch) -> Self {
        Self { batch }
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    /// True when there is nothing to show: no rows (or no columns at all).
    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0 || self.batch.num_columns() == 0
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.batch.schema().index_of(name).is_ok()
    }

    pub fn column(&self, name: &str) -> Option<&ArrayRef> {
        self.batch.column_by_name(name)
    }

    /// Names of the columns holding numbers (integer or float).
    pub fn numeric_column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .filter(|f| f.data_type().is_numeric())
            .map(|f| f.name().clone())
            .collect()
    }

    /// Numeric view of `name` as `f64`, `None` for missing cells.
    /// Returns `None` when the column is absent or not numeric.
    pub fn numeric_values(&self, name: &str) -> Option<Vec<Option<f64>>> {
        self.column(name).and_then(|arr| numeric_values(arr.as_ref()))
    }

    /// Total bytes held by the table's buffers.
    pub fn memory_size(&self) -> usize {
        self.batch.get_array_memory_size()
    }
}

/// Render a single cell as the key used for grouping, counting and filter
/// options. Missing cells yield `None`.
pub fn cell_key(arr: &dyn Array, row: usize) -> Option<String> {
    if arr.is_null(row) {
        return None;
    }
    if let Some(s) = arr.as_any().downcast_ref::<StringArray>() {
        return Some(s.value(row).to_string());
    }
    if let Some(s) = arr.as_any().downcast_ref::<LargeStringArray>() {
        return Some(s.value(row).to_string());
    }
    if let Some(i) = arr.as_any().downcast_ref::<Int64Array>() {
        return Some(i.value(row).to_string());
    }
    if let Some(f) = arr.as_any().downcast_ref::<Float64Array>() {
        let v = f.value(row);
        if v.is_nan() {
            return None;
        }
        return Some(format_float_key(v));
    }
    let formatter = ArrayFormatter::try_new(arr, &FormatOptions::default()).ok()?;
    Some(formatter.value(row).to_string())
}

/// Whole floats print without a fractional part, so `1985.0` groups as "1985".
pub fn format_float_key(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{:.0}", v)
    } else {
        v.to_string()
    }
}

/// Numeric view of any integer/float Arrow array. NaN counts as missing.
pub fn numeric_values(arr: &dyn Array) -> Option<Vec<Option<f64>>> {
    if let Some(i) = arr.as_any().downcast_ref::<Int64Array>() {
        return Some(i.iter().map(|v| v.map(|v| v as f64)).collect());
    }
    if let Some(f) = arr.as_any().downcast_ref::<Float64Array>() {
        return Some(
            f.iter()
                .map(|v| v.filter(|x| !x.is_nan()))
                .collect(),
        );
    }
    if arr.data_type().is_numeric() {
        let cast = arrow::compute::cast(arr, &DataType::Float64).ok()?;
        return numeric_values(cast.as_ref());
    }
    None
}
