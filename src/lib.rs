//! Sensor-log normalization: load a delimited sensor export, clean its column
//! labels, rebuild full timestamps from a date-less `HH:MM` column and pick
//! the numeric series to plot or export.

pub mod config;
pub mod error;
pub mod normalizer;
pub mod output;
pub mod parsers;
pub mod pipeline;
pub mod series;
pub mod table;
pub mod timestamps;

pub use error::{SensorError, SensorResult};
pub use normalizer::normalize_columns;
pub use timestamps::reconstruct_timestamps;
