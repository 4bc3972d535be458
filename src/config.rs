// src/config.rs
//
// Dashboard configuration, read from YAML:
//
//   data_path: cleaned_aircraft_incidents.csv
//   log_filter: info,aircraft_incidents=info
//   pages: [overview, geography]
//   filters:
//     Year: "1985"
//     Country: All

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::filter::PredicateSet;
use crate::view::Page;

pub const DEFAULT_CONFIG_PATH: &str = "dashboard.yaml";
pub const DEFAULT_DATA_PATH: &str = "cleaned_aircraft_incidents.csv";
pub const DEFAULT_LOG_FILTER: &str = "info,aircraft_incidents=info";

/// Env var naming the config file.
pub const CONFIG_ENV: &str = "INCIDENTS_CONFIG";
/// Env var overriding `data_path`.
pub const DATA_PATH_ENV: &str = "INCIDENTS_DATA_PATH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub log_filter: String,
    pub pages: Vec<Page>,
    pub filters: PredicateSet,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            pages: Page::ALL.to_vec(),
            filters: PredicateSet::new(),
        }
    }
}

impl DashboardConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("parsing dashboard config")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text =
            fs::read_to_string(path).with_context(|| format!("reading config {:?}", path))?;
        Self::from_yaml_str(&text).with_context(|| format!("in {:?}", path))
    }

    /// Config file from `INCIDENTS_CONFIG` (or `dashboard.yaml`) if it exists,
    /// defaults otherwise, then `INCIDENTS_DATA_PATH` on top.
    pub fn resolve() -> Result<Self> {
        let path = env::var(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        let explicit = env::var(CONFIG_ENV).is_ok();

        let mut config = if path.is_file() {
            Self::from_file(&path)?
        } else if explicit {
            anyhow::bail!("config file {:?} not found", path);
        } else {
            debug!("no {:?}; using defaults", path);
            Self::default()
        };

        if let Ok(data_path) = env::var(DATA_PATH_ENV) {
            config.data_path = PathBuf::from(data_path);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterValue;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn empty_yaml_gives_defaults() -> Result<()> {
        let c = DashboardConfig::from_yaml_str("{}")?;
        assert_eq!(c, DashboardConfig::default());
        assert_eq!(c.pages.len(), 6);
        Ok(())
    }

    #[test]
    fn parses_pages_and_filters() -> Result<()> {
        let c = DashboardConfig::from_yaml_str(
            "data_path: data/incidents.csv\n\
             pages: [overview, raw_data]\n\
             filters:\n  Year: \"1985\"\n  Month Name: All\n",
        )?;
        assert_eq!(c.data_path, PathBuf::from("data/incidents.csv"));
        assert_eq!(c.pages, vec![Page::Overview, Page::RawData]);
        assert_eq!(c.filters.get("Year"), Some(&FilterValue::Value("1985".into())));
        assert_eq!(c.filters.get("Month Name"), Some(&FilterValue::All));
        assert_eq!(c.log_filter, DEFAULT_LOG_FILTER);
        Ok(())
    }

    #[test]
    fn unknown_page_is_an_error() {
        assert!(DashboardConfig::from_yaml_str("pages: [cockpit]").is_err());
    }

    #[test]
    fn reads_from_file() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(b"log_filter: debug\n")?;
        let c = DashboardConfig::from_file(tmp.path())?;
        assert_eq!(c.log_filter, "debug");
        assert_eq!(c.data_path, PathBuf::from(DEFAULT_DATA_PATH));
        Ok(())
    }
}
