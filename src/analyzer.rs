//! Stream drivers for the two analysis pipelines
//!
//! Each driver pulls timestamps from a source, feeds one component, and
//! writes results in the selected output format. Blocking reads stay in the
//! source; the drivers check the interrupt flag between timestamps.

use crate::cli::OutputFormat;
use crate::config::{CountConfig, QuantizeConfig};
use crate::csv_output::{CsvHistogramOutput, CsvIntervalOutput};
use crate::histogram_output;
use crate::iat_quantizer::{Classification, HistogramSnapshot};
use crate::interval_counter::IntervalRecord;
use crate::json_output::{JsonCountReport, JsonHistogramReport, JsonRunSummary};
use crate::source::TimestampSource;
use crate::text_output;
use crate::timestamp::Resolution;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// Options for a `count` run
#[derive(Debug, Clone)]
pub struct CountOptions {
    pub config: CountConfig,
    pub format: OutputFormat,
}

/// Outcome of a `count` run
#[derive(Debug, Clone, PartialEq)]
pub struct CountSummary {
    /// Timestamps pulled from the source
    pub timestamps: u64,
    /// Closed windows written
    pub windows: u64,
    /// Packets counted into closed windows (plus the flushed window, if any)
    pub counted_packets: u64,
    /// Open window written at end of stream when a final flush was requested
    pub partial: Option<IntervalRecord>,
    pub elapsed: Duration,
    pub interrupted: bool,
}

/// Options for a `quantize` run
#[derive(Debug, Clone)]
pub struct QuantizeOptions {
    pub config: QuantizeConfig,
    pub format: OutputFormat,
    /// Write `<path>.dat` with one bucket count per line
    pub histogram_path: Option<PathBuf>,
    /// Print progress lines to stderr as progress windows close
    pub show_progress: bool,
}

/// Outcome of a `quantize` run
#[derive(Debug, Clone, PartialEq)]
pub struct QuantizeSummary {
    pub timestamps: u64,
    pub snapshot: HistogramSnapshot,
    pub data_file: Option<PathBuf>,
    pub elapsed: Duration,
    pub interrupted: bool,
}

/// Count packets per fixed window and stream closed windows to `out`
pub fn count_packets<S, W>(
    source: &mut S,
    options: &CountOptions,
    out: &mut W,
    interrupt: &AtomicBool,
) -> Result<CountSummary>
where
    S: TimestampSource + ?Sized,
    W: Write,
{
    let mut counter = options.config.build_counter()?;
    let window_length = options.config.window_length_seconds.unwrap_or_default();
    info!(
        window_length_seconds = window_length,
        predicate = counter.predicate().as_str(),
        "Counting packets"
    );

    let csv = CsvIntervalOutput::new();
    let mut json = match options.format {
        OutputFormat::Json => Some(JsonCountReport::new(window_length, counter.predicate())),
        OutputFormat::Text => {
            writeln!(out, "{}", text_output::INTERVAL_HEADER).context("Failed to write output")?;
            None
        }
        OutputFormat::Csv => {
            writeln!(out, "{}", csv.header()).context("Failed to write output")?;
            None
        }
    };

    let resolution = counter.resolution();
    let started = Instant::now();
    let mut timestamps = 0u64;
    let mut windows = 0u64;
    let mut counted_packets = 0u64;
    let mut interrupted = false;

    let mut emit = |record: &IntervalRecord, json: &mut Option<JsonCountReport>| -> Result<()> {
        match json {
            Some(report) => report.add_record(record),
            None => {
                let row = match options.format {
                    OutputFormat::Csv => csv.format_record(record),
                    _ => text_output::format_interval_row(record),
                };
                writeln!(out, "{}", row).context("Failed to write output")?;
            }
        }
        Ok(())
    };

    loop {
        if interrupt.load(Ordering::SeqCst) {
            warn!("Interrupt received, stopping after {} timestamps", timestamps);
            interrupted = true;
            break;
        }
        let Some(timestamp) = source
            .next_timestamp()
            .context("Failed to read timestamp")?
        else {
            break;
        };
        timestamps += 1;

        for record in counter.observe(timestamp) {
            trace!(
                window_end = %record.window_end.display(resolution),
                count = record.count,
                "Window closed"
            );
            windows += 1;
            counted_packets += record.count;
            emit(&record, &mut json)?;
        }
    }

    let partial = if options.config.flush_final {
        counter.flush()
    } else {
        None
    };
    if let Some(record) = &partial {
        debug!(count = record.count, "Flushing open window");
        counted_packets += record.count;
        if let Some(report) = json.as_mut() {
            report.set_partial(record);
        } else {
            emit(record, &mut json)?;
        }
    }

    let elapsed = started.elapsed();
    if let Some(mut report) = json {
        report.set_summary(JsonRunSummary {
            timestamps,
            elapsed_seconds: elapsed.as_secs_f64(),
            interrupted,
        });
        writeln!(out, "{}", report.to_json()?).context("Failed to write output")?;
    }
    out.flush().context("Failed to write output")?;

    info!(timestamps, windows, "Counting finished");
    Ok(CountSummary {
        timestamps,
        windows,
        counted_packets,
        partial,
        elapsed,
        interrupted,
    })
}

/// Build the IAT histogram for a stream and write it to `out` at the end
pub fn quantize_iat<S, W>(
    source: &mut S,
    options: &QuantizeOptions,
    out: &mut W,
    interrupt: &AtomicBool,
) -> Result<QuantizeSummary>
where
    S: TimestampSource + ?Sized,
    W: Write,
{
    let mut quantizer = options.config.build_quantizer()?;
    let mut progress = options.config.build_progress()?;
    info!(
        bucket_shift = quantizer.bucket_shift(),
        bucket_count = quantizer.bucket_count(),
        "Quantizing inter-arrival times"
    );

    let started = Instant::now();
    let mut timestamps = 0u64;
    let mut interrupted = false;
    let mut progress_shown = false;

    loop {
        if interrupt.load(Ordering::SeqCst) {
            warn!("Interrupt received, stopping after {} timestamps", timestamps);
            interrupted = true;
            break;
        }
        let Some(timestamp) = source
            .next_timestamp()
            .context("Failed to read timestamp")?
        else {
            break;
        };
        timestamps += 1;

        if let Some(tick) = progress.observe(timestamp) {
            let line = text_output::format_progress(
                &tick,
                quantizer.negative_count(),
                quantizer.overflow_count(),
            );
            debug!(windows = tick.windows, "{}", line);
            if options.show_progress {
                eprint!("\x1b[2K\r{}", line);
                progress_shown = true;
            }
        }

        match quantizer.observe(timestamp) {
            Classification::Negative => trace!(
                timestamp = %timestamp.display(Resolution::Microsecond),
                "Negative inter-arrival time"
            ),
            class => trace!(?class, "Classified inter-arrival time"),
        }
    }
    if progress_shown {
        eprintln!();
    }

    let snapshot = quantizer.snapshot();
    let elapsed = started.elapsed();

    match options.format {
        OutputFormat::Text => write!(out, "{}", text_output::format_histogram(&snapshot)),
        OutputFormat::Csv => write!(out, "{}", CsvHistogramOutput::new().to_csv(&quantizer)),
        OutputFormat::Json => {
            let report = JsonHistogramReport::new(
                quantizer.bucket_shift(),
                &snapshot,
                JsonRunSummary {
                    timestamps,
                    elapsed_seconds: elapsed.as_secs_f64(),
                    interrupted,
                },
            );
            writeln!(out, "{}", report.to_json()?)
        }
    }
    .context("Failed to write output")?;
    out.flush().context("Failed to write output")?;

    let data_file = match &options.histogram_path {
        Some(path) => {
            let written = histogram_output::write_data_file(path, &snapshot)?;
            info!("Histogram data written to {}", written.display());
            Some(written)
        }
        None => None,
    };

    info!(
        timestamps,
        negative = snapshot.negative_count,
        overflow = snapshot.overflow_count,
        "Quantization finished"
    );
    Ok(QuantizeSummary {
        timestamps,
        snapshot,
        data_file,
        elapsed,
        interrupted,
    })
}
