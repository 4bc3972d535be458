// src/view/mod.rs
//
// Thin assemblers: ask the filter engine and the aggregator for what a page
// needs and package it for the rendering layer. No layout or drawing here.

pub mod format;
pub mod pages;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::aggregate::{year_range, ColumnSummary};
use crate::filter::{apply_filters, filter_panel, FilterControl, PredicateSet};
use crate::table::IncidentTable;

pub use format::{format_count, format_decimal, format_megabytes, format_percent, format_total};
pub use pages::render_page;

pub const LOAD_FAILED_MESSAGE: &str = "Unable to load data. Please check the file path and format.";
pub const NO_MATCHES_MESSAGE: &str =
    "No data matches the current filters. Please adjust your selection.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Overview,
    TimeAnalysis,
    Geography,
    Operators,
    Aircraft,
    RawData,
}

impl Page {
    pub const ALL: [Page; 6] = [
        Page::Overview,
        Page::TimeAnalysis,
        Page::Geography,
        Page::Operators,
        Page::Aircraft,
        Page::RawData,
    ];

    /// Navigation label.
    pub fn label(&self) -> &'static str {
        match self {
            Page::Overview => "Overview",
            Page::TimeAnalysis => "Time Analysis",
            Page::Geography => "Geography",
            Page::Operators => "Operators",
            Page::Aircraft => "Aircraft",
            Page::RawData => "Raw Data",
        }
    }

    /// Heading shown above the page content.
    pub fn heading(&self) -> &'static str {
        match self {
            Page::Overview => "Summary KPIs",
            Page::TimeAnalysis => "Temporal Trends",
            Page::Geography => "Geographic Analysis",
            Page::Operators => "Operator Analysis",
            Page::Aircraft => "Aircraft Analysis",
            Page::RawData => "Filtered Dataset",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpi {
    pub label: String,
    pub value: String,
}

impl Kpi {
    pub fn new(label: &str, value: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub title: String,
    pub kind: ChartKind,
    pub x_label: String,
    pub y_label: String,
    pub height: u32,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub level: Level,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: Level::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }
}

/// Everything one page hands to the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView {
    pub page: Page,
    pub label: String,
    pub heading: String,
    pub kpis: Vec<Kpi>,
    pub charts: Vec<ChartSeries>,
    pub notices: Vec<Notice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Vec<ColumnSummary>>,
}

impl PageView {
    pub fn new(page: Page) -> Self {
        Self {
            page,
            label: page.label().to_string(),
            heading: page.heading().to_string(),
            kpis: Vec::new(),
            charts: Vec::new(),
            notices: Vec::new(),
            rows: None,
            summary: None,
        }
    }

    /// Add a chart, or a warning in its place when there is nothing to plot.
    pub fn push_chart(&mut self, chart: ChartSeries) {
        if chart.points.is_empty() {
            self.notices
                .push(Notice::warning(format!("No data available for {}", chart.title)));
        } else {
            self.charts.push(chart);
        }
    }

    pub fn kpi(&self, label: &str) -> Option<&str> {
        self.kpis
            .iter()
            .find(|k| k.label == label)
            .map(|k| k.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    /// "first - last" year of the full table.
    pub data_range: String,
    pub filtered_records: String,
}

/// One full recomputation for an interaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Dashboard {
    /// Blocking: nothing could be loaded.
    LoadFailed { message: String },
    /// Non-blocking: the filters left no rows, so nothing was aggregated.
    NoMatches {
        filters: Vec<FilterControl>,
        header: Header,
        notice: Notice,
    },
    Ready {
        filters: Vec<FilterControl>,
        header: Header,
        pages: Vec<PageView>,
    },
}

/// Filter the full table with `predicates` and assemble `pages`.
///
/// Filter options always come from `full`, never from the filtered view.
pub fn render_dashboard(
    full: &IncidentTable,
    predicates: &PredicateSet,
    pages: &[Page],
) -> Dashboard {
    if full.is_empty() {
        return Dashboard::LoadFailed {
            message: LOAD_FAILED_MESSAGE.to_string(),
        };
    }

    let filters = filter_panel(full);
    let view = apply_filters(full, predicates);
    let header = Header {
        data_range: match year_range(full).value() {
            Some((first, last)) => format!("{} - {}", first, last),
            None => crate::aggregate::SENTINEL.to_string(),
        },
        filtered_records: format_count(view.num_rows() as i64),
    };
    info!(
        total = full.num_rows(),
        filtered = view.num_rows(),
        "applied filters"
    );

    if view.is_empty() {
        warn!("no rows match the current filters");
        return Dashboard::NoMatches {
            filters,
            header,
            notice: Notice::warning(NO_MATCHES_MESSAGE),
        };
    }

    Dashboard::Ready {
        filters,
        header,
        pages: pages.iter().map(|p| render_page(&view, *p)).collect(),
    }
}
