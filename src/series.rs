use serde::Serialize;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::Theme;
use crate::error::{SensorError, SensorResult};
use crate::normalizer::sanitize_label;
use crate::table::{Cell, Table};

pub const CHART_TITLE: &str = "Sensor Data Over Time";

/// Labels of numeric columns (every cell a number or missing), skipping `exclude`.
pub fn numeric_columns(table: &Table, exclude: &[&str]) -> Vec<String> {
    let candidates: Vec<usize> = (0..table.columns.len())
        .filter(|&i| !exclude.contains(&table.columns[i].as_str()))
        .collect();

    let is_numeric = |&i: &usize| table.column(i).all(Cell::is_numeric_or_missing);

    #[cfg(feature = "parallel")]
    let keep: Vec<usize> = candidates.into_par_iter().filter(is_numeric).collect();
    #[cfg(not(feature = "parallel"))]
    let keep: Vec<usize> = candidates.into_iter().filter(is_numeric).collect();

    keep.into_iter().map(|i| table.columns[i].clone()).collect()
}

/// Resolve the series to plot: explicit names (matched raw or sanitized) or
/// the first `default_count` numeric columns.
pub fn select_columns(
    numeric: &[String],
    requested: Option<&[String]>,
    default_count: usize,
) -> SensorResult<Vec<String>> {
    if numeric.is_empty() {
        return Err(SensorError::NoNumericColumns);
    }
    let selected: Vec<String> = match requested {
        None => numeric.iter().take(default_count).cloned().collect(),
        Some(names) => names
            .iter()
            .map(|name| {
                let sanitized = sanitize_label(name);
                numeric
                    .iter()
                    .find(|c| *c == name || **c == sanitized)
                    .cloned()
                    .ok_or_else(|| SensorError::UnknownColumn(name.clone()))
            })
            .collect::<SensorResult<_>>()?,
    };
    if selected.is_empty() {
        return Err(SensorError::NoColumnsSelected);
    }
    Ok(selected)
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Series {
    pub name: String,
    pub mode: &'static str,
    pub line_width: u32,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RangeButton {
    pub label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    pub step: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stepmode: Option<&'static str>,
}

impl RangeButton {
    const fn hours_back(label: &'static str, count: u32) -> Self {
        RangeButton {
            label,
            count: Some(count),
            step: "hour",
            stepmode: Some("backward"),
        }
    }
}

pub const RANGE_BUTTONS: [RangeButton; 4] = [
    RangeButton::hours_back("1h", 1),
    RangeButton::hours_back("6h", 6),
    RangeButton::hours_back("12h", 12),
    RangeButton {
        label: "all",
        count: None,
        step: "all",
        stepmode: None,
    },
];

/// Horizontal legend centered above the plot area.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Legend {
    pub orientation: &'static str,
    pub x: f64,
    pub xanchor: &'static str,
    pub y: f64,
    pub yanchor: &'static str,
}

impl Default for Legend {
    fn default() -> Self {
        Legend {
            orientation: "h",
            x: 0.5,
            xanchor: "center",
            y: 1.02,
            yanchor: "bottom",
        }
    }
}

/// Chart description handed to an external charting surface.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSpec {
    pub title: &'static str,
    pub x_title: &'static str,
    pub y_title: &'static str,
    pub x_type: &'static str,
    pub template: &'static str,
    pub hovermode: &'static str,
    pub dragmode: &'static str,
    pub legend: Legend,
    pub range_slider: bool,
    pub range_buttons: Vec<RangeButton>,
    pub x: Vec<String>,
    pub series: Vec<Series>,
}

impl ChartSpec {
    pub fn build(
        table: &Table,
        timestamp_column: &str,
        selected: &[String],
        theme: Theme,
    ) -> SensorResult<Self> {
        let ts_idx = table
            .column_index(timestamp_column)
            .ok_or_else(|| SensorError::MissingTimeColumn(timestamp_column.to_string()))?;
        let x = table.column(ts_idx).map(Cell::render).collect();

        let series = selected
            .iter()
            .map(|name| {
                let idx = table
                    .column_index(name)
                    .ok_or_else(|| SensorError::UnknownColumn(name.clone()))?;
                Ok(Series {
                    name: name.clone(),
                    mode: "lines+markers",
                    line_width: 2,
                    values: table.column(idx).map(Cell::as_number).collect(),
                })
            })
            .collect::<SensorResult<Vec<_>>>()?;

        Ok(ChartSpec {
            title: CHART_TITLE,
            x_title: "Time",
            y_title: "Values",
            x_type: "date",
            template: theme.template(),
            hovermode: "x unified",
            dragmode: "zoom",
            legend: Legend::default(),
            range_slider: true,
            range_buttons: RANGE_BUTTONS.to_vec(),
            x,
            series,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> Table {
        let ts = NaiveDate::from_ymd_opt(2025, 7, 7)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let ok = || Cell::Text("ok".into());
        Table::new(
            ["Timestamp", "PV1", "Status", "PV_2", "PV3"].map(String::from).to_vec(),
            vec![
                vec![
                    Cell::Timestamp(ts),
                    Cell::number(1.0),
                    ok(),
                    Cell::Missing,
                    Cell::number(7.0),
                ],
                vec![
                    Cell::Timestamp(ts),
                    Cell::Missing,
                    ok(),
                    Cell::number(2.0),
                    Cell::number(8.0),
                ],
            ],
        )
    }

    #[test]
    fn numeric_filter_skips_text_and_excluded() {
        assert_eq!(
            numeric_columns(&sample(), &["Timestamp"]),
            vec!["PV1", "PV_2", "PV3"]
        );
        assert_eq!(
            numeric_columns(&sample(), &["Timestamp", "PV1"]),
            vec!["PV_2", "PV3"]
        );
    }

    #[test]
    fn default_selection_takes_first_two() {
        let numeric = numeric_columns(&sample(), &["Timestamp"]);
        assert_eq!(
            select_columns(&numeric, None, 2).unwrap(),
            vec!["PV1", "PV_2"]
        );
    }

    #[test]
    fn explicit_selection_matches_sanitized_names() {
        let numeric = numeric_columns(&sample(), &["Timestamp"]);
        let req = vec!["PV 2".to_string(), "PV3".to_string()];
        assert_eq!(
            select_columns(&numeric, Some(req.as_slice()), 2).unwrap(),
            vec!["PV_2", "PV3"]
        );
    }

    #[test]
    fn selection_errors() {
        assert!(matches!(
            select_columns(&[], None, 2),
            Err(SensorError::NoNumericColumns)
        ));
        let numeric = vec!["PV1".to_string()];
        assert!(matches!(
            select_columns(&numeric, Some(&[][..]), 2),
            Err(SensorError::NoColumnsSelected)
        ));
        assert!(matches!(
            select_columns(&numeric, Some(&["Status".to_string()][..]), 2),
            Err(SensorError::UnknownColumn(name)) if name == "Status"
        ));
        assert!(matches!(
            select_columns(&numeric, None, 0),
            Err(SensorError::NoColumnsSelected)
        ));
    }

    #[test]
    fn chart_spec_carries_series_and_theme() {
        let selected = ["PV1".to_string()];
        let chart = ChartSpec::build(&sample(), "Timestamp", &selected, Theme::Dark).unwrap();
        assert_eq!(chart.template, "plotly_dark");
        assert_eq!(chart.x, vec!["2025-07-07 09:00:00", "2025-07-07 09:00:00"]);
        assert_eq!(chart.series[0].values, vec![Some(1.0), None]);

        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["range_buttons"][3]["step"], "all");
        assert!(json["range_buttons"][3].get("count").is_none());
        assert!(json["range_buttons"][3].get("stepmode").is_none());
    }

    #[test]
    fn chart_spec_carries_layout() {
        let selected = ["PV1".to_string(), "PV3".to_string()];
        let chart = ChartSpec::build(&sample(), "Timestamp", &selected, Theme::Light).unwrap();
        let json = serde_json::to_value(&chart).unwrap();

        assert_eq!(json["hovermode"], "x unified");
        assert_eq!(json["dragmode"], "zoom");
        assert_eq!(json["x_type"], "date");
        assert_eq!(json["legend"]["orientation"], "h");
        assert_eq!(json["legend"]["xanchor"], "center");
        assert_eq!(json["legend"]["y"], 1.02);
        assert_eq!(json["range_buttons"][0]["stepmode"], "backward");
        assert_eq!(json["range_buttons"][2]["count"], 12);
        assert_eq!(json["series"][1]["line_width"], 2);
        assert_eq!(json["series"][1]["mode"], "lines+markers");
    }
}
