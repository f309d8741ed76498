use crate::parsers::Format;

#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(Format),

    #[error("Input is not valid UTF-8 (byte offset {0})")]
    InvalidUtf8(usize),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Input has no header row")]
    EmptyInput,

    #[error("No '{0}' column found in file")]
    MissingTimeColumn(String),

    #[error("No numeric columns found")]
    NoNumericColumns,

    #[error("No columns selected to plot")]
    NoColumnsSelected,

    #[error("Unknown or non-numeric column: {0}")]
    UnknownColumn(String),

    #[error("Invalid rename '{0}', expected FROM=TO")]
    InvalidRename(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SensorResult<T> = Result<T, SensorError>;
