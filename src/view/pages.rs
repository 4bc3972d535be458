// src/view/pages.rs

use anyhow::{Context, Result};
use arrow::json::ArrayWriter;

use super::{ChartKind, ChartSeries, Kpi, Notice, Page, PageView, Point};
use super::format::{
    format_count, format_decimal, format_megabytes, format_percent, format_total,
};
use crate::aggregate::{
    describe, group_size, group_sum, group_sum_series, most_frequent, reduce_column, value_counts,
    ReduceOp,
};
use crate::schema::{
    AIRCRAFT, AIRCRAFT_MANUFACTURER, COUNTRY, FATALITIES_AIR, GROUND, MONTH_NAME, MONTH_NAMES,
    OPERATOR, REGION, SURVIVAL_RATE, YEAR,
};
use crate::table::IncidentTable;

/// Assemble one page from an already-filtered, non-empty view.
pub fn render_page(view: &IncidentTable, page: Page) -> PageView {
    let mut out = PageView::new(page);
    match page {
        Page::Overview => overview(view, &mut out),
        Page::TimeAnalysis => time_analysis(view, &mut out),
        Page::Geography => {
            top_chart(
                view,
                &mut out,
                COUNTRY,
                20,
                "Top 20 Countries by Incidents",
                "Country",
                "Number of Incidents",
                600,
            );
            top_chart(
                view,
                &mut out,
                REGION,
                15,
                "Top 15 Regions by Incidents",
                "Region",
                "Number of Incidents",
                500,
            );
        }
        Page::Operators => {
            top_chart(
                view,
                &mut out,
                OPERATOR,
                20,
                "Top 20 Operators by Incidents",
                "Operator",
                "Number of Incidents",
                600,
            );
        }
        Page::Aircraft => {
            top_chart(
                view,
                &mut out,
                AIRCRAFT,
                15,
                "Top 15 Aircraft by Incidents",
                "Aircraft",
                "Incidents",
                500,
            );
            top_chart(
                view,
                &mut out,
                AIRCRAFT_MANUFACTURER,
                15,
                "Top 15 Manufacturers",
                "Manufacturer",
                "Incidents",
                500,
            );
        }
        Page::RawData => raw_data(view, &mut out),
    }
    out
}

fn overview(view: &IncidentTable, out: &mut PageView) {
    out.kpis = vec![
        Kpi::new("Total Incidents", format_count(view.num_rows() as i64)),
        Kpi::new(
            "Air Fatalities",
            format_total(reduce_column(view, FATALITIES_AIR, ReduceOp::Sum)),
        ),
        Kpi::new("Ground Fatalities", format_total(reduce_column(view, GROUND, ReduceOp::Sum))),
        Kpi::new(
            "Avg Fatalities/Incident",
            format_decimal(reduce_column(view, FATALITIES_AIR, ReduceOp::Mean)),
        ),
        Kpi::new(
            "Mean Survival Rate",
            format_percent(reduce_column(view, SURVIVAL_RATE, ReduceOp::Mean)),
        ),
        Kpi::new(
            "Country w/ Most Deaths",
            group_sum(view, COUNTRY, FATALITIES_AIR).to_string(),
        ),
        Kpi::new("Year w/ Most Incidents", most_frequent(view, YEAR).to_string()),
    ];

    if view.has_column(YEAR) {
        out.push_chart(chart(
            "Incidents Over Time",
            ChartKind::Line,
            "Year",
            "Number of Incidents",
            400,
            counts_to_points(group_size(view, YEAR)),
        ));
    }
    if view.has_column(MONTH_NAME) && view.has_column(FATALITIES_AIR) {
        let by_month = group_sum_series(view, MONTH_NAME, FATALITIES_AIR);
        let ordered: Vec<Point> = MONTH_NAMES
            .iter()
            .filter_map(|m| {
                by_month
                    .iter()
                    .find(|(k, _)| k == m)
                    .map(|(k, v)| Point {
                        label: k.clone(),
                        value: *v,
                    })
            })
            .collect();
        out.push_chart(chart(
            "Fatalities by Month",
            ChartKind::Bar,
            "Month",
            "Fatalities",
            400,
            ordered,
        ));
    }
}

fn time_analysis(view: &IncidentTable, out: &mut PageView) {
    if view.has_column(YEAR) {
        out.push_chart(chart(
            "Incidents per Year",
            ChartKind::Line,
            "Year",
            "Number of Incidents",
            500,
            counts_to_points(group_size(view, YEAR)),
        ));
    }
    if view.has_column(YEAR) && view.has_column(FATALITIES_AIR) {
        let points = group_sum_series(view, YEAR, FATALITIES_AIR)
            .into_iter()
            .map(|(label, value)| Point { label, value })
            .collect();
        out.push_chart(chart(
            "Fatalities per Year",
            ChartKind::Line,
            "Year",
            "Fatalities",
            500,
            points,
        ));
    }
}

#[allow(clippy::too_many_arguments)]
fn top_chart(
    view: &IncidentTable,
    out: &mut PageView,
    column: &str,
    limit: usize,
    title: &str,
    x_label: &str,
    y_label: &str,
    height: u32,
) {
    if !view.has_column(column) {
        return;
    }
    let points = counts_to_points(value_counts(view, column, limit));
    out.push_chart(chart(title, ChartKind::Bar, x_label, y_label, height, points));
}

fn raw_data(view: &IncidentTable, out: &mut PageView) {
    out.kpis = vec![
        Kpi::new("Total Rows", format_count(view.num_rows() as i64)),
        Kpi::new("Total Columns", view.num_columns().to_string()),
        Kpi::new("Memory Usage", format_megabytes(view.memory_size())),
    ];

    match rows_as_json(view) {
        Ok(rows) => out.rows = Some(rows),
        Err(e) => out
            .notices
            .push(Notice::error(format!("Error rendering rows: {:#}", e))),
    }

    let summary = describe(view);
    if summary.is_empty() {
        out.notices.push(Notice::info(
            "No numeric columns available for statistical summary.",
        ));
    } else {
        out.summary = Some(summary);
    }
}

/// The view as a JSON array of row objects; missing cells are omitted.
pub fn rows_as_json(view: &IncidentTable) -> Result<serde_json::Value> {
    let mut writer = ArrayWriter::new(Vec::new());
    writer.write(view.batch()).context("encoding rows as JSON")?;
    writer.finish().context("finishing JSON rows")?;
    let buf = writer.into_inner();
    serde_json::from_slice(&buf).context("parsing encoded rows")
}

fn chart(
    title: &str,
    kind: ChartKind,
    x_label: &str,
    y_label: &str,
    height: u32,
    points: Vec<Point>,
) -> ChartSeries {
    ChartSeries {
        title: title.to_string(),
        kind,
        x_label: x_label.to_string(),
        y_label: y_label.to_string(),
        height,
        points,
    }
}

fn counts_to_points(counts: Vec<(String, usize)>) -> Vec<Point> {
    counts
        .into_iter()
        .map(|(label, n)| Point {
            label,
            value: n as f64,
        })
        .collect()
}
