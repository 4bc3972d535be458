// src/view/format.rs

use crate::aggregate::{Aggregate, SENTINEL};

/// Integer with thousands separators: `1234567` → `"1,234,567"`.
pub fn format_count(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// A summed total shown as an integer; an unavailable sum shows as 0.
pub fn format_total(total: Aggregate<f64>) -> String {
    format_count(total.unwrap_or(0.0).round() as i64)
}

/// One decimal place, or the sentinel.
pub fn format_decimal(v: Aggregate<f64>) -> String {
    match v {
        Aggregate::Value(v) => format!("{:.1}", v),
        Aggregate::Unavailable => SENTINEL.to_string(),
    }
}

/// A ratio in [0, 1] as a percentage with one decimal, or the sentinel.
pub fn format_percent(ratio: Aggregate<f64>) -> String {
    match ratio {
        Aggregate::Value(v) => format!("{:.1}%", v * 100.0),
        Aggregate::Unavailable => SENTINEL.to_string(),
    }
}

pub fn format_megabytes(bytes: usize) -> String {
    format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
}
