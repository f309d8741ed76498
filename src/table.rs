use chrono::{NaiveDateTime, NaiveTime};
use serde::{Serialize, Serializer};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Tokens read as missing values, matching the usual dataframe loader defaults.
pub const NA_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// A single cell of a loaded or derived table.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Parsed value plus the text it was read from, so exports keep `21.0`.
    Number { value: f64, text: String },
    Text(String),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    Missing,
}

impl Cell {
    pub fn number(value: f64) -> Cell {
        Cell::Number {
            value,
            text: value.to_string(),
        }
    }

    /// Infer a cell from raw loader text: blank or an NA token is missing,
    /// anything `f64` accepts is a number, the rest stays text.
    pub fn infer(raw: &str) -> Cell {
        let trimmed = raw.trim();
        if trimmed.is_empty() || NA_TOKENS.contains(&trimmed) {
            return Cell::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(value) if !value.is_nan() => Cell::Number {
                value,
                text: trimmed.to_string(),
            },
            _ => Cell::Text(raw.to_string()),
        }
    }

    pub fn is_numeric_or_missing(&self) -> bool {
        matches!(self, Cell::Number { .. } | Cell::Missing)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// Text form used by the delimited writers.
    pub fn render(&self) -> String {
        match self {
            Cell::Number { text, .. } => text.clone(),
            Cell::Text(s) => s.clone(),
            Cell::Time(t) => t.format(TIME_FORMAT).to_string(),
            Cell::Timestamp(ts) => ts.format(TIMESTAMP_FORMAT).to_string(),
            Cell::Missing => String::new(),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Number { value, .. } => serializer.serialize_f64(*value),
            Cell::Missing => serializer.serialize_none(),
            other => serializer.serialize_str(&other.render()),
        }
    }
}

/// Column labels plus rows; every row holds exactly `columns.len()` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Build a table, padding short rows with `Missing` and truncating long ones.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Missing);
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column(&self, idx: usize) -> impl Iterator<Item = &Cell> {
        self.rows.iter().map(move |row| &row[idx])
    }

    pub fn with_columns(&self, columns: Vec<String>) -> Table {
        Table {
            columns,
            rows: self.rows.clone(),
        }
    }

    /// Keep only the rows at `indices`, in that order.
    pub fn select_rows(&self, indices: &[usize]) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }

    /// Set a column, overwriting it if the label already exists.
    pub fn with_column(&self, name: &str, values: Vec<Cell>) -> Table {
        let mut out = self.clone();
        match out.column_index(name) {
            Some(idx) => {
                for (row, value) in out.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                out.columns.push(name.to_string());
                for (row, value) in out.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        out
    }

    pub fn render_row(&self, idx: usize) -> Vec<String> {
        self.rows[idx].iter().map(Cell::render).collect()
    }
}
