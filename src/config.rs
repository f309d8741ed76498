use chrono::NaiveDate;
use clap::ValueEnum;

use crate::error::{SensorError, SensorResult};

pub const DEFAULT_TIME_COLUMN: &str = "Time";
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M";
pub const DEFAULT_TIMESTAMP_COLUMN: &str = "Timestamp";
pub const DEFAULT_SELECTION: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn template(self) -> &'static str {
        match self {
            Theme::Light => "plotly_white",
            Theme::Dark => "plotly_dark",
        }
    }
}

/// Everything the processing pipeline needs; built from CLI args in `main`.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Anchor date for day offset 0.
    pub start_date: NaiveDate,
    pub time_column: String,
    pub time_format: String,
    pub timestamp_column: String,
    /// Fixed sensor-name renames, applied after normalization.
    pub renames: Vec<(String, String)>,
    /// Explicit series selection; `None` picks the first `default_selection`
    /// numeric columns.
    pub columns: Option<Vec<String>>,
    pub default_selection: usize,
    pub theme: Theme,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            start_date: default_start_date(),
            time_column: DEFAULT_TIME_COLUMN.to_string(),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            timestamp_column: DEFAULT_TIMESTAMP_COLUMN.to_string(),
            renames: Vec::new(),
            columns: None,
            default_selection: DEFAULT_SELECTION,
            theme: Theme::default(),
        }
    }
}

pub fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 7).unwrap_or_default()
}

/// Parse a `FROM=TO` rename pair.
pub fn parse_rename(raw: &str) -> SensorResult<(String, String)> {
    match raw.split_once('=') {
        Some((from, to)) if !from.trim().is_empty() && !to.trim().is_empty() => {
            Ok((from.trim().to_string(), to.trim().to_string()))
        }
        _ => Err(SensorError::InvalidRename(raw.to_string())),
    }
}
