//! Data preparation, filtering and aggregation for the aircraft-incident
//! dashboard.
//!
//! raw CSV → [`schema::normalize`] → [`schema::add_derived_metrics`] →
//! [`filter::apply_filters`] → [`aggregate`] → [`view`] page models.

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod filter;
pub mod schema;
pub mod table;
pub mod view;

pub use aggregate::{Aggregate, SENTINEL};
pub use filter::{apply_filters, FilterValue, PredicateSet};
pub use table::{load_incidents, IncidentTable};
