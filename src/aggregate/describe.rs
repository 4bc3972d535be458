// src/aggregate/describe.rs

use serde::Serialize;

use super::{reduce, Aggregate, ReduceOp};
use crate::table::IncidentTable;

/// Summary statistics for one numeric column, missing cells excluded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: Aggregate<f64>,
    /// Sample standard deviation (n - 1); unavailable below two values.
    pub std: Aggregate<f64>,
    pub min: Aggregate<f64>,
    pub q25: Aggregate<f64>,
    pub median: Aggregate<f64>,
    pub q75: Aggregate<f64>,
    pub max: Aggregate<f64>,
}

/// Summaries for every numeric column of `table`, in column order.
pub fn describe(table: &IncidentTable) -> Vec<ColumnSummary> {
    table
        .numeric_column_names()
        .into_iter()
        .filter_map(|name| {
            let values = table.numeric_values(&name)?;
            Some(summarize(name, &values))
        })
        .collect()
}

pub fn summarize(column: String, values: &[Option<f64>]) -> ColumnSummary {
    let mut present: Vec<f64> = values.iter().flatten().copied().filter(|v| !v.is_nan()).collect();
    present.sort_by(f64::total_cmp);

    let mean = reduce(values, ReduceOp::Mean);
    let std = match mean {
        Aggregate::Value(m) if present.len() > 1 => {
            let ss: f64 = present.iter().map(|v| (v - m).powi(2)).sum();
            Aggregate::Value((ss / (present.len() - 1) as f64).sqrt())
        }
        _ => Aggregate::Unavailable,
    };

    ColumnSummary {
        column,
        count: present.len(),
        mean,
        std,
        min: present.first().copied().into(),
        q25: quantile(&present, 0.25),
        median: quantile(&present, 0.5),
        q75: quantile(&present, 0.75),
        max: present.last().copied().into(),
    }
}

/// Linear interpolation between the closest ranks of an ascending slice.
fn quantile(sorted: &[f64], q: f64) -> Aggregate<f64> {
    if sorted.is_empty() {
        return Aggregate::Unavailable;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Aggregate::Value(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}
