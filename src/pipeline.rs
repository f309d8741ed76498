use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::config::Settings;
use crate::error::{SensorError, SensorResult};
use crate::normalizer::{apply_renames, normalize_columns, sanitize_label};
use crate::series::{ChartSpec, numeric_columns, select_columns};
use crate::table::{Cell, Table};
use crate::timestamps::{parse_time_column, reconstruct_timestamps};

/// Result of running a loaded table through the pipeline.
#[derive(Debug, Clone)]
pub struct Processed {
    /// Normalized columns, bad-time rows removed, timestamp column set.
    pub table: Table,
    pub timestamp_column: String,
    pub timestamps: Vec<NaiveDateTime>,
    pub numeric: Vec<String>,
    pub selected: Vec<String>,
    pub dropped_rows: usize,
}

impl Processed {
    pub fn chart(&self, settings: &Settings) -> SensorResult<ChartSpec> {
        ChartSpec::build(
            &self.table,
            &self.timestamp_column,
            &self.selected,
            settings.theme,
        )
    }
}

pub fn process(raw: &Table, settings: &Settings) -> SensorResult<Processed> {
    let columns = apply_renames(&normalize_columns(&raw.columns), &settings.renames);
    let table = raw.with_columns(columns);

    let time_label = sanitize_label(&settings.time_column);
    let time_idx = table
        .column_index(&time_label)
        .ok_or_else(|| SensorError::MissingTimeColumn(settings.time_column.clone()))?;

    let parsed = parse_time_column(table.column(time_idx), &settings.time_format);
    let dropped_rows = parsed.dropped(table.len());
    if dropped_rows > 0 {
        warn!(
            dropped = dropped_rows,
            column = %time_label,
            format = %settings.time_format,
            "dropped rows with unparseable time"
        );
    }

    let table = table
        .select_rows(&parsed.rows)
        .with_column(
            &time_label,
            parsed.times.iter().copied().map(Cell::Time).collect(),
        );

    let timestamp_column = sanitize_label(&settings.timestamp_column);
    let timestamps = reconstruct_timestamps(&parsed.times, settings.start_date);
    let table = table.with_column(
        &timestamp_column,
        timestamps.iter().copied().map(Cell::Timestamp).collect(),
    );

    let numeric = numeric_columns(&table, &[time_label.as_str(), timestamp_column.as_str()]);
    let selected = select_columns(
        &numeric,
        settings.columns.as_deref(),
        settings.default_selection,
    )?;

    info!(
        rows = table.len(),
        numeric = numeric.len(),
        selected = ?selected,
        "processed sensor table"
    );

    Ok(Processed {
        table,
        timestamp_column,
        timestamps,
        numeric,
        selected,
        dropped_rows,
    })
}
