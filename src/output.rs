use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::series::ChartSpec;
use crate::table::{Cell, Table};

/// One row serialized as an object keyed by column label, in column order.
struct Record<'a> {
    columns: &'a [String],
    cells: &'a [Cell],
}

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, cell) in self.columns.iter().zip(self.cells) {
            map.serialize_entry(column, cell)?;
        }
        map.end()
    }
}

pub enum Sink {
    // bool tracks if we've written headers
    Stdout(csv::Writer<Box<dyn Write + Send>>, bool),
    // bool tracks if we've written the opening bracket
    JsonFile(BufWriter<File>, bool),
    JsonlFile(BufWriter<File>),
    CsvFile(csv::Writer<BufWriter<File>>, bool),
    TsvFile(csv::Writer<BufWriter<File>>, bool),
}

pub struct TableWriter {
    columns: Vec<String>,
    sink: Sink,
}

impl TableWriter {
    pub fn write_batch(&mut self, rows: &[Vec<Cell>]) -> Result<()> {
        let columns = &self.columns;
        match &mut self.sink {
            Sink::Stdout(writer, headers_written) => {
                write_delimited(writer, headers_written, columns, rows)?;
            }
            Sink::CsvFile(writer, headers_written) | Sink::TsvFile(writer, headers_written) => {
                write_delimited(writer, headers_written, columns, rows)?;
            }
            Sink::JsonFile(writer, is_first) => {
                for cells in rows {
                    if *is_first {
                        write!(writer, "[")?;
                        *is_first = false;
                    } else {
                        write!(writer, ",")?;
                    }
                    let serialized = serde_json::to_string_pretty(&Record { columns, cells })?;
                    write!(writer, "\n{}", serialized)?;
                }
            }
            Sink::JsonlFile(writer) => {
                for cells in rows {
                    let serialized = serde_json::to_string(&Record { columns, cells })?;
                    writeln!(writer, "{}", serialized)?;
                }
            }
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        let columns = &self.columns;
        match &mut self.sink {
            Sink::JsonFile(writer, is_first) => {
                if *is_first {
                    write!(writer, "[")?;
                }
                writeln!(writer, "\n]")?;
                writer.flush()?;
            }
            Sink::JsonlFile(writer) => writer.flush()?,
            Sink::Stdout(writer, headers_written) => {
                write_delimited(writer, headers_written, columns, &[])?;
                writer.flush()?;
            }
            Sink::CsvFile(writer, headers_written) | Sink::TsvFile(writer, headers_written) => {
                write_delimited(writer, headers_written, columns, &[])?;
                writer.flush()?;
            }
        }
        Ok(())
    }
}

fn write_delimited<W: Write>(
    writer: &mut csv::Writer<W>,
    headers_written: &mut bool,
    columns: &[String],
    rows: &[Vec<Cell>],
) -> Result<()> {
    if !*headers_written {
        writer.write_record(columns)?;
        *headers_written = true;
    }
    for row in rows {
        writer.write_record(row.iter().map(Cell::render))?;
    }
    Ok(())
}

pub fn create_writer(output_arg: &str, columns: Vec<String>) -> Result<TableWriter> {
    let sink = match output_arg {
        "stdout" | "csv" => {
            let out: Box<dyn Write + Send> = Box::new(io::stdout());
            Sink::Stdout(csv::Writer::from_writer(out), false)
        }
        path if path.ends_with(".json") => Sink::JsonFile(open(path)?, true),
        path if path.ends_with(".jsonl") || path.ends_with(".ndjson") => {
            Sink::JsonlFile(open(path)?)
        }
        path if path.ends_with(".csv") => {
            Sink::CsvFile(csv::Writer::from_writer(open(path)?), false)
        }
        path if path.ends_with(".tsv") => {
            let writer = csv::WriterBuilder::new()
                .delimiter(b'\t')
                .from_writer(open(path)?);
            Sink::TsvFile(writer, false)
        }
        path => {
            // Default to JSON file if it looks like a path
            if path.contains('/') || path.contains('\\') || path.contains('.') {
                Sink::JsonFile(open(path)?, true)
            } else {
                return Err(anyhow!(
                    "Unknown output format: {}. Use 'stdout' or a .csv/.tsv/.json/.jsonl path",
                    output_arg
                ));
            }
        }
    };
    Ok(TableWriter { columns, sink })
}

fn open(path: &str) -> Result<BufWriter<File>> {
    create_parent_dirs(path)?;
    let file = File::create(path).with_context(|| format!("creating {path}"))?;
    Ok(BufWriter::new(file))
}

fn create_parent_dirs(file_path: &str) -> Result<()> {
    if let Some(parent) = Path::new(file_path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Write a whole table in one batch.
pub fn write_table(output_arg: &str, table: &Table) -> Result<()> {
    let mut writer = create_writer(output_arg, table.columns.clone())?;
    writer.write_batch(&table.rows)?;
    writer.finish()
}

pub fn write_chart(path: &str, chart: &ChartSpec) -> Result<()> {
    let mut writer = open(path)?;
    serde_json::to_writer_pretty(&mut writer, chart)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
