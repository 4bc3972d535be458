// src/filter/options.rs

use arrow::array::Array;
use serde::Serialize;
use std::collections::HashSet;

use super::ALL;
use crate::schema::{
    AIRCRAFT, AIRCRAFT_MANUFACTURER, CITY, COUNTRY, MONTH_NAME, MONTH_NAMES, OPERATOR, REGION,
    YEAR,
};
use crate::table::{cell_key, IncidentTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterField {
    pub label: &'static str,
    pub column: &'static str,
}

/// The sidebar filters, in display order.
pub const DASHBOARD_FILTERS: &[FilterField] = &[
    FilterField { label: "Year", column: YEAR },
    FilterField { label: "Month", column: MONTH_NAME },
    FilterField { label: "Country", column: COUNTRY },
    FilterField { label: "Region", column: REGION },
    FilterField { label: "City", column: CITY },
    FilterField { label: "Operator", column: OPERATOR },
    FilterField { label: "Aircraft", column: AIRCRAFT },
    FilterField {
        label: "Aircraft Manufacturer",
        column: AIRCRAFT_MANUFACTURER,
    },
];

/// One filter widget: "All" first, then the selectable values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterControl {
    pub label: String,
    pub column: String,
    pub options: Vec<String>,
}

/// Distinct non-missing values of `column` in the table given, which should be
/// the full loaded table rather than a filtered view.
///
/// `Month Name` keeps calendar order (non-calendar spellings are not offered),
/// numeric columns sort by value, everything else lexically.
pub fn filter_options(table: &IncidentTable, column: &str) -> Vec<String> {
    let arr = match table.column(column) {
        Some(arr) => arr,
        None => return Vec::new(),
    };

    let mut seen = HashSet::new();
    let mut values: Vec<String> = (0..arr.len())
        .filter_map(|row| cell_key(arr.as_ref(), row))
        .filter(|v| seen.insert(v.clone()))
        .collect();

    if column == MONTH_NAME {
        return MONTH_NAMES
            .iter()
            .filter(|m| seen.contains(**m))
            .map(|m| m.to_string())
            .collect();
    }

    if arr.data_type().is_numeric() {
        values.sort_by(|a, b| match (a.parse::<f64>(), b.parse::<f64>()) {
            (Ok(x), Ok(y)) => x.total_cmp(&y),
            _ => a.cmp(b),
        });
    } else {
        values.sort();
    }
    values
}

/// Every dashboard filter with its options. A filter whose column is absent
/// only offers "All".
pub fn filter_panel(table: &IncidentTable) -> Vec<FilterControl> {
    DASHBOARD_FILTERS
        .iter()
        .map(|spec| {
            let mut options = vec![ALL.to_string()];
            options.extend(filter_options(table, spec.column));
            FilterControl {
                label: spec.label.to_string(),
                column: spec.column.to_string(),
                options,
            }
        })
        .collect()
}
