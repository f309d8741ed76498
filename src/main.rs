use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use clap::Parser;
use crossbeam::channel::unbounded;
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt};

use sensornorm::config::{self, Settings, Theme};
use sensornorm::parsers::{self, Format};
use sensornorm::table::Cell;
use sensornorm::{SensorError, output, pipeline};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input format; sniffed from extension and content when omitted
    #[arg(short, long, value_enum)]
    format: Option<Format>,

    #[arg(short, long, default_value = "stdout")]
    output: String,

    /// Write a chart description (JSON) for the selected series
    #[arg(long)]
    chart: Option<String>,

    #[arg(value_name = "FILE")]
    file: String,

    #[arg(long, default_value = "2025-07-07")]
    start_date: NaiveDate,

    #[arg(long, default_value = config::DEFAULT_TIME_COLUMN)]
    time_column: String,

    #[arg(long, default_value = config::DEFAULT_TIME_FORMAT)]
    time_format: String,

    /// Columns to plot, comma separated; defaults to the first two numeric columns
    #[arg(long, value_delimiter = ',')]
    columns: Option<Vec<String>>,

    /// Fixed sensor rename, FROM=TO; may be repeated
    #[arg(long = "rename", value_name = "FROM=TO")]
    renames: Vec<String>,

    #[arg(long, value_enum, default_value_t = Theme::Light)]
    theme: Theme,

    #[arg(long, default_value = "10000")]
    batch_size: usize,

    #[arg(long)]
    benchmark: bool,
}

impl Args {
    fn settings(&self) -> Result<Settings> {
        let renames = self
            .renames
            .iter()
            .map(|r| config::parse_rename(r))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Settings {
            start_date: self.start_date,
            time_column: self.time_column.clone(),
            time_format: self.time_format.clone(),
            renames,
            columns: self.columns.clone(),
            theme: self.theme,
            ..Settings::default()
        })
    }
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let settings = args.settings()?;

    let start_time = Instant::now();
    let file_size = std::fs::metadata(&args.file)
        .with_context(|| format!("reading metadata of {}", args.file))?
        .len();
    if file_size == 0 {
        return Err(SensorError::EmptyInput.into());
    }

    // mmap the file
    let file = File::open(&args.file)?;
    let mmap = unsafe { Mmap::map(&file)? };

    let format = args
        .format
        .unwrap_or_else(|| parsers::sniff(Some(Path::new(&args.file)), &mmap));
    info!(file = %args.file, %format, bytes = file_size, "loading");

    let raw = parsers::parse(format, &mmap)?;
    let total_lines = raw.len();
    let processed = pipeline::process(&raw, &settings)?;
    drop(raw);

    if let Some(chart_path) = &args.chart {
        output::write_chart(chart_path, &processed.chart(&settings)?)?;
        info!(path = %chart_path, series = processed.selected.len(), "wrote chart description");
    }

    // channel for sending row batches to the writer
    let (tx, rx) = unbounded::<Vec<Vec<Cell>>>();

    let output_arg = args.output.clone();
    let columns = processed.table.columns.clone();
    let writer_handle = std::thread::spawn(move || -> Result<()> {
        let mut writer = output::create_writer(&output_arg, columns)?;
        for batch in rx {
            writer.write_batch(&batch)?;
        }
        writer.finish()
    });

    let mut batches = 0usize;
    for chunk in processed.table.rows.chunks(args.batch_size.max(1)) {
        // receiver gone means the writer failed; its error surfaces on join
        if tx.send(chunk.to_vec()).is_err() {
            break;
        }
        batches += 1;
    }
    debug!(batches, "queued row batches");

    // close channel so writer thread can finish
    drop(tx);
    writer_handle
        .join()
        .map_err(|_| anyhow!("writer thread panicked"))??;

    if args.benchmark {
        print_benchmark_results(
            file_size,
            total_lines,
            processed.table.len(),
            processed.dropped_rows,
            start_time.elapsed(),
        );
    }

    Ok(())
}

fn print_benchmark_results(
    file_size: u64,
    total_rows: usize,
    kept_rows: usize,
    dropped_rows: usize,
    duration: std::time::Duration,
) {
    let duration_secs = duration.as_secs_f64();
    let file_size_mb = file_size as f64 / (1024.0 * 1024.0);
    let throughput_mbs = file_size_mb / duration_secs;
    let throughput_rows = total_rows as f64 / duration_secs;

    eprintln!("\n=== BENCHMARK RESULTS ===");
    eprintln!("File size: {:.2} MB", file_size_mb);
    eprintln!("Loaded rows: {}", total_rows);
    eprintln!("Kept rows: {}", kept_rows);
    eprintln!("Dropped (bad time): {}", dropped_rows);
    eprintln!("Processing time: {:.3}s", duration_secs);
    eprintln!("Throughput: {:.2} MB/s", throughput_mbs);
    eprintln!("Throughput: {:.0} rows/s", throughput_rows);
    if total_rows > 0 {
        eprintln!(
            "Time parse success rate: {:.1}%",
            (kept_rows as f64 / total_rows as f64) * 100.0
        );
    }
}
