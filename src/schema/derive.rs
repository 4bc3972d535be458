// src/schema/derive.rs

use anyhow::{Context, Result};
use arrow::{
    array::{Array, ArrayRef, Float64Array, Int64Array, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use std::sync::Arc;
use tracing::debug;

use super::{ABOARD, FATALITIES_AIR, MONTH, MONTH_NAME, SURVIVAL_RATE};

/// Calendar order; index 0 is month 1.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub fn month_name(month: i64) -> Option<&'static str> {
    if (1..=12).contains(&month) {
        Some(MONTH_NAMES[(month - 1) as usize])
    } else {
        None
    }
}

/// `1 - clamp(fatalities / aboard, 0, 1)`, defined only for a positive
/// headcount and a known fatality count.
pub fn survival_rate(aboard: Option<i64>, fatalities: Option<i64>) -> Option<f64> {
    match (aboard, fatalities) {
        (Some(a), Some(f)) if a > 0 => Some(1.0 - (f as f64 / a as f64).clamp(0.0, 1.0)),
        _ => None,
    }
}

/// Append `Month Name` and `Survival Rate` when their inputs exist.
/// A derivation whose inputs are missing is skipped without complaint.
pub fn add_derived_metrics(batch: &RecordBatch) -> Result<RecordBatch> {
    let schema = batch.schema();
    let mut fields: Vec<Field> = schema.fields().iter().map(|f| f.as_ref().clone()).collect();
    let mut columns: Vec<ArrayRef> = batch.columns().to_vec();

    if schema.index_of(MONTH_NAME).is_err() {
        if let Some(month) = int_column(batch, MONTH) {
            let names: StringArray = month.iter().map(|m| m.and_then(month_name)).collect();
            fields.push(Field::new(MONTH_NAME, DataType::Utf8, true));
            columns.push(Arc::new(names));
            debug!("derived {}", MONTH_NAME);
        }
    }

    if let (Some(aboard), Some(fatalities)) =
        (int_column(batch, ABOARD), int_column(batch, FATALITIES_AIR))
    {
        let rates: Float64Array = aboard
            .iter()
            .zip(fatalities.iter())
            .map(|(a, f)| survival_rate(a, f))
            .collect();
        if let Ok(idx) = schema.index_of(SURVIVAL_RATE) {
            fields[idx] = Field::new(SURVIVAL_RATE, DataType::Float64, true);
            columns[idx] = Arc::new(rates);
        } else {
            fields.push(Field::new(SURVIVAL_RATE, DataType::Float64, true));
            columns.push(Arc::new(rates));
        }
        debug!("derived {}", SURVIVAL_RATE);
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)
        .context("building batch with derived metrics")
}

fn int_column<'a>(batch: &'a RecordBatch, name: &str) -> Option<&'a Int64Array> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<Int64Array>())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_batch(cols: Vec<(&str, Vec<Option<i64>>)>) -> RecordBatch {
        let fields: Vec<Field> = cols
            .iter()
            .map(|(n, _)| Field::new(*n, DataType::Int64, true))
            .collect();
        let arrays: Vec<ArrayRef> = cols
            .into_iter()
            .map(|(_, v)| Arc::new(Int64Array::from(v)) as ArrayRef)
            .collect();
        RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).unwrap()
    }

    fn rates(batch: &RecordBatch) -> Vec<Option<f64>> {
        batch
            .column_by_name(SURVIVAL_RATE)
            .unwrap()
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap()
            .iter()
            .collect()
    }

    #[test]
    fn month_names_follow_calendar() {
        assert_eq!(month_name(1), Some("January"));
        assert_eq!(month_name(12), Some("December"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
    }

    #[test]
    fn derives_month_name_from_month() -> Result<()> {
        let out = add_derived_metrics(&int_batch(vec![(MONTH, vec![Some(3), Some(14), None])]))?;
        let names = out
            .column_by_name(MONTH_NAME)
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(names.value(0), "March");
        assert!(names.is_null(1));
        assert!(names.is_null(2));
        Ok(())
    }

    #[test]
    fn existing_month_name_is_kept() -> Result<()> {
        let schema = Arc::new(Schema::new(vec![
            Field::new(MONTH, DataType::Int64, true),
            Field::new(MONTH_NAME, DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![Some(3)])),
                Arc::new(StringArray::from(vec![Some("Mar")])),
            ],
        )?;
        let out = add_derived_metrics(&batch)?;
        assert_eq!(out.num_columns(), 2);
        Ok(())
    }

    #[test]
    fn survival_rate_is_bounded_or_undefined() -> Result<()> {
        let out = add_derived_metrics(&int_batch(vec![
            (ABOARD, vec![Some(100), Some(50), Some(0), Some(10), Some(10), None, Some(-4)]),
            (FATALITIES_AIR, vec![Some(20), Some(50), Some(0), None, Some(30), Some(1), Some(1)]),
        ]))?;
        let got = rates(&out);
        assert!((got[0].unwrap() - 0.8).abs() < 1e-12);
        assert_eq!(got[1], Some(0.0));
        assert_eq!(got[2], None);
        assert_eq!(got[3], None);
        // More fatalities than aboard clamps instead of going negative.
        assert_eq!(got[4], Some(0.0));
        assert_eq!(got[5], None);
        assert_eq!(got[6], None);
        for r in got.into_iter().flatten() {
            assert!((0.0..=1.0).contains(&r));
        }
        Ok(())
    }

    #[test]
    fn derivations_skip_when_inputs_absent() -> Result<()> {
        let out = add_derived_metrics(&int_batch(vec![(ABOARD, vec![Some(5)])]))?;
        assert_eq!(out.num_columns(), 1);
        assert!(out.column_by_name(SURVIVAL_RATE).is_none());
        assert!(out.column_by_name(MONTH_NAME).is_none());
        Ok(())
    }
}
