//! CLI argument parsing for ptstat

use crate::config::{CountConfig, QuantizeConfig};
use crate::interval_counter::BoundaryPredicate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for records and histograms
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
    /// CSV format for spreadsheet analysis
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "ptstat")]
#[command(version)]
#[command(about = "Packet trace statistics: windowed packet counts and IAT histograms", long_about = None)]
pub struct Cli {
    /// Log progress and configuration to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug tracing output (to stderr)
    #[arg(long, global = true)]
    pub debug: bool,

    /// TOML configuration file; command-line values take precedence
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Count packets per fixed wall-clock window
    Count(CountArgs),
    /// Build a histogram of quantized inter-arrival times
    Quantize(QuantizeArgs),
}

/// Options shared by both subcommands
#[derive(Args, Debug)]
pub struct IoArgs {
    /// Timestamp file, one SECONDS[.FRACTION] per line ("-" for stdin)
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    pub input: PathBuf,

    /// Write results to FILE instead of stdout
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct CountArgs {
    #[command(flatten)]
    pub io: IoArgs,

    /// Window length in seconds (fractions allowed, e.g. 0.25)
    #[arg(short = 't', long = "time-interval", value_name = "SECONDS")]
    pub time_interval: Option<f64>,

    /// Boundary-crossing rule (default: both-fields)
    #[arg(long = "boundary", value_enum)]
    pub boundary: Option<BoundaryPredicate>,

    /// Also emit the window still open at end of stream
    #[arg(long = "flush-final")]
    pub flush_final: bool,
}

impl CountArgs {
    /// Overlay command-line values on a configuration loaded from file
    pub fn apply(&self, config: &mut CountConfig) {
        if let Some(length) = self.time_interval {
            config.window_length_seconds = Some(length);
        }
        if let Some(boundary) = self.boundary {
            config.boundary = boundary;
        }
        if self.flush_final {
            config.flush_final = true;
        }
    }
}

#[derive(Args, Debug)]
pub struct QuantizeArgs {
    #[command(flatten)]
    pub io: IoArgs,

    /// Bucket width as a power of two, in microseconds (2^SHIFT us)
    #[arg(short = 'q', long = "quantize-time", value_name = "SHIFT")]
    pub quantize_time: Option<u32>,

    /// Number of buckets (default: 20)
    #[arg(short = 's', long = "count-size", value_name = "COUNT")]
    pub count_size: Option<usize>,

    /// Capture-time seconds between progress reports (default: 10)
    #[arg(long = "progress-interval", value_name = "SECONDS")]
    pub progress_interval: Option<f64>,

    /// Write bucket counts to PATH.dat (give the path without extension)
    #[arg(short = 'p', long = "histogram-path", value_name = "PATH")]
    pub histogram_path: Option<PathBuf>,
}

impl QuantizeArgs {
    /// Overlay command-line values on a configuration loaded from file
    pub fn apply(&self, config: &mut QuantizeConfig) {
        if let Some(shift) = self.quantize_time {
            config.bucket_shift = Some(shift);
        }
        if let Some(count) = self.count_size {
            config.bucket_count = count;
        }
        if let Some(interval) = self.progress_interval {
            config.progress_interval_seconds = interval;
        }
    }
}
