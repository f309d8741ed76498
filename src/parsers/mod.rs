pub mod delimited;

use std::fmt;
use std::path::Path;

use clap::ValueEnum;
use memchr::{memchr, memchr_iter};

use crate::error::{SensorError, SensorResult};
use crate::table::Table;

/// Magic bytes of zip-based (xlsx) and OLE2 (xls) workbooks.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE2_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Comma,
    Tab,
    Spreadsheet,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Comma => "comma-delimited",
            Format::Tab => "tab-delimited",
            Format::Spreadsheet => "spreadsheet",
        };
        f.write_str(name)
    }
}

impl Format {
    pub fn from_extension(path: &Path) -> Option<Format> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(Format::Comma),
            "tsv" | "tab" => Some(Format::Tab),
            "xlsx" | "xls" | "xlsm" => Some(Format::Spreadsheet),
            _ => None,
        }
    }
}

/// Guess the format of `bytes`: extension first, then workbook magic, then
/// whichever delimiter shows up more on the header line.
pub fn sniff(path: Option<&Path>, bytes: &[u8]) -> Format {
    if let Some(format) = path.and_then(Format::from_extension) {
        return format;
    }
    if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE2_MAGIC) {
        return Format::Spreadsheet;
    }
    let header = match memchr(b'\n', bytes) {
        Some(end) => &bytes[..end],
        None => bytes,
    };
    let tabs = memchr_iter(b'\t', header).count();
    let commas = memchr_iter(b',', header).count();
    if tabs > commas {
        Format::Tab
    } else {
        Format::Comma
    }
}

pub fn parse(format: Format, input: &[u8]) -> SensorResult<Table> {
    match format {
        Format::Comma => delimited::parse_delimited(input, b','),
        Format::Tab => delimited::parse_delimited(input, b'\t'),
        Format::Spreadsheet => Err(SensorError::UnsupportedFormat(format)),
    }
}
