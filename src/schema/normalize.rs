// src/schema/normalize.rs

use anyhow::{Context, Result};
use arrow::{
    array::{new_null_array, Array, ArrayRef, Float64Array, Int64Array, Int64Builder, StringArray},
    compute::{cast_with_options, CastOptions},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use std::{collections::HashSet, sync::Arc};
use tracing::{debug, warn};

use super::alias::{canonical_name, NUMERIC_COLUMNS};

/// Rename aliased headers to their canonical names and coerce the numeric
/// columns to `Int64`. Unknown columns pass through; blank text cells become
/// missing in every text column.
#[tracing::instrument(level = "debug", skip(batch), fields(rows = batch.num_rows()))]
pub fn normalize(batch: &RecordBatch) -> Result<RecordBatch> {
    let schema = batch.schema();
    let mut fields = Vec::with_capacity(batch.num_columns());
    let mut columns = Vec::with_capacity(batch.num_columns());
    let mut claimed: HashSet<&'static str> = HashSet::new();

    for (field, arr) in schema.fields().iter().zip(batch.columns()) {
        let raw = field.name().as_str();
        let (name, is_canonical) = match canonical_name(raw) {
            Some(canonical) if claimed.insert(canonical) => {
                if canonical != raw {
                    debug!(from = raw, to = canonical, "renamed column");
                }
                (canonical.to_string(), true)
            }
            Some(canonical) => {
                warn!(
                    column = raw,
                    canonical, "canonical column already present; leaving duplicate untouched"
                );
                (raw.to_string(), false)
            }
            None => (raw.to_string(), false),
        };

        let is_canonical_numeric = is_canonical && NUMERIC_COLUMNS.contains(&name.as_str());
        let col = if is_canonical_numeric {
            coerce_integer(arr).with_context(|| format!("coercing column {}", name))?
        } else {
            blank_to_null(arr)
        };

        fields.push(Field::new(&name, col.data_type().clone(), true));
        columns.push(col);
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)
        .context("building normalized batch")
}

/// Parse a cell as an integer. Whole-valued floats ("12.0") are accepted;
/// anything else is missing.
pub fn parse_integer(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    float_to_integer(s.parse::<f64>().ok()?)
}

fn float_to_integer(v: f64) -> Option<i64> {
    if v.is_finite() && v.fract() == 0.0 && v.abs() <= i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}

fn coerce_integer(arr: &ArrayRef) -> Result<ArrayRef> {
    if arr.data_type() == &DataType::Int64 {
        return Ok(arr.clone());
    }
    if let Some(sarr) = arr.as_any().downcast_ref::<StringArray>() {
        let mut b = Int64Builder::with_capacity(sarr.len());
        for opt in sarr.iter() {
            b.append_option(opt.and_then(parse_integer));
        }
        return Ok(Arc::new(b.finish()));
    }
    if let Some(farr) = arr.as_any().downcast_ref::<Float64Array>() {
        let ints: Int64Array = farr.iter().map(|v| v.and_then(float_to_integer)).collect();
        return Ok(Arc::new(ints));
    }

    // Any other type: let Arrow try, unparseable cells become null.
    let options = CastOptions {
        safe: true,
        ..Default::default()
    };
    match cast_with_options(arr.as_ref(), &DataType::Int64, &options) {
        Ok(cast) => Ok(cast),
        Err(e) => {
            warn!("cannot coerce {} to integers ({}); all values missing", arr.data_type(), e);
            Ok(new_null_array(&DataType::Int64, arr.len()))
        }
    }
}

fn blank_to_null(arr: &ArrayRef) -> ArrayRef {
    match arr.as_any().downcast_ref::<StringArray>() {
        Some(sarr) if sarr.iter().any(|v| matches!(v, Some(s) if s.trim().is_empty())) => {
            let cleaned: StringArray = sarr
                .iter()
                .map(|v| v.filter(|s| !s.trim().is_empty()))
                .collect();
            Arc::new(cleaned)
        }
        _ => arr.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_batch(cols: Vec<(&str, Vec<Option<&str>>)>) -> RecordBatch {
        let fields: Vec<Field> = cols
            .iter()
            .map(|(n, _)| Field::new(*n, DataType::Utf8, true))
            .collect();
        let arrays: Vec<ArrayRef> = cols
            .into_iter()
            .map(|(_, v)| Arc::new(StringArray::from(v)) as ArrayRef)
            .collect();
        RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).unwrap()
    }

    fn names(batch: &RecordBatch) -> Vec<String> {
        batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    #[test]
    fn alias_variants_normalize_to_the_same_column() -> Result<()> {
        let lower = normalize(&text_batch(vec![("year", vec![Some("1985")])]))?;
        let upper = normalize(&text_batch(vec![("Year", vec![Some("1985")])]))?;
        assert_eq!(names(&lower), vec!["Year"]);
        assert_eq!(names(&upper), vec!["Year"]);
        assert_eq!(lower.column(0).data_type(), &DataType::Int64);
        assert_eq!(upper.column(0).data_type(), &DataType::Int64);
        Ok(())
    }

    #[test]
    fn unknown_columns_pass_through() -> Result<()> {
        let batch = text_batch(vec![
            ("Registration", vec![Some("N123")]),
            ("YEAR", vec![Some("1985")]),
        ]);
        let out = normalize(&batch)?;
        assert_eq!(names(&out), vec!["Registration", "YEAR"]);
        // Not a recognized numeric column, so it stays text.
        assert_eq!(out.column(1).data_type(), &DataType::Utf8);
        Ok(())
    }

    #[test]
    fn unparseable_numbers_become_missing() -> Result<()> {
        let batch = text_batch(vec![(
            "aboard",
            vec![Some("100"), Some(" 12 "), Some("7.0"), Some("3.5"), Some("?"), Some(""), None],
        )]);
        let out = normalize(&batch)?;
        let aboard = out
            .column(0)
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        let got: Vec<Option<i64>> = aboard.iter().collect();
        assert_eq!(got, vec![Some(100), Some(12), Some(7), None, None, None, None]);
        Ok(())
    }

    #[test]
    fn blank_text_becomes_missing() -> Result<()> {
        let out = normalize(&text_batch(vec![("country", vec![Some("USA"), Some("  ")])]))?;
        assert_eq!(names(&out), vec!["Country"]);
        assert!(out.column(0).is_null(1));
        assert!(!out.column(0).is_null(0));
        Ok(())
    }

    #[test]
    fn duplicate_aliases_keep_first() -> Result<()> {
        let batch = text_batch(vec![
            ("year", vec![Some("1985")]),
            ("Year", vec![Some("1990")]),
        ]);
        let out = normalize(&batch)?;
        assert_eq!(names(&out), vec!["Year", "Year"]);
        assert_eq!(out.column(0).data_type(), &DataType::Int64);
        let first = out.column(0).as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(first.value(0), 1985);
        Ok(())
    }

    #[test]
    fn parse_integer_rules() {
        assert_eq!(parse_integer("1985"), Some(1985));
        assert_eq!(parse_integer("-3"), Some(-3));
        assert_eq!(parse_integer("1e3"), Some(1000));
        assert_eq!(parse_integer("NaN"), None);
        assert_eq!(parse_integer("inf"), None);
        assert_eq!(parse_integer("12abc"), None);
        // Whole floats survive; fractions are not integers.
        assert_eq!(parse_integer(" 12.0 "), Some(12));
        assert_eq!(parse_integer("2.5"), None);
    }
}
