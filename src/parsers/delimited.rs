use csv::{ReaderBuilder, Trim};
use tracing::debug;

use crate::error::{SensorError, SensorResult};
use crate::table::{Cell, Table};

/// Parse comma- or tab-delimited text with a header row.
///
/// Header labels are trimmed; cells are inferred one by one. Ragged rows are
/// accepted and squared up by `Table::new`.
pub fn parse_delimited(input: &[u8], delimiter: u8) -> SensorResult<Table> {
    let text = std::str::from_utf8(input).map_err(|e| SensorError::InvalidUtf8(e.valid_up_to()))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if columns.is_empty() || columns.iter().all(String::is_empty) {
        return Err(SensorError::EmptyInput);
    }

    let mut rows = Vec::with_capacity(text.len() / 64);
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        rows.push(record.iter().map(Cell::infer).collect::<Vec<_>>());
    }

    debug!(columns = columns.len(), rows = rows.len(), "parsed delimited input");
    Ok(Table::new(columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = " Time , Temp PV ,Status\n09:00,21.5,ok\n09:05,,ok\n\n09:10,22\n";

    #[test]
    fn parse_sample() {
        let t = parse_delimited(SAMPLE.as_bytes(), b',').unwrap();
        assert_eq!(t.columns, vec!["Time", "Temp PV", "Status"]);
        assert_eq!(t.len(), 3);
        assert_eq!(t.rows[0][1], Cell::number(21.5));
        assert_eq!(t.rows[1][1], Cell::Missing);
        assert_eq!(t.rows[2][2], Cell::Missing);
        assert_eq!(t.rows[0][0], Cell::Text("09:00".into()));
    }

    #[test]
    fn parse_tabs_with_bom() {
        let input = "\u{feff}Time\tPV1\n00:15\t3\n";
        let t = parse_delimited(input.as_bytes(), b'\t').unwrap();
        assert_eq!(t.columns, vec!["Time", "PV1"]);
        assert_eq!(t.rows[0][1], Cell::number(3.0));
    }

    #[test]
    fn quoted_fields() {
        let input = "Time,Note\n09:00,\"a, b\"\n";
        let t = parse_delimited(input.as_bytes(), b',').unwrap();
        assert_eq!(t.rows[0][1], Cell::Text("a, b".into()));
    }

    #[test]
    fn rejects_empty_and_invalid_input() {
        assert!(matches!(parse_delimited(b"", b','), Err(SensorError::EmptyInput)));
        assert!(matches!(
            parse_delimited(b"Time\n\xff\xfe", b','),
            Err(SensorError::InvalidUtf8(5))
        ));
    }
}
