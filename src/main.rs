use anyhow::{Context, Result};
use clap::Parser;
use ptstat::analyzer::{self, CountOptions, QuantizeOptions};
use ptstat::cli::{Cli, Command, IoArgs};
use ptstat::config::FileConfig;
use ptstat::signal;
use ptstat::source;
use ptstat::text_output;
use ptstat::timestamp::Resolution;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for verbose/debug output
fn init_tracing(verbose: bool, debug: bool) {
    let level = if debug {
        tracing::Level::TRACE
    } else if verbose {
        tracing::Level::INFO
    } else {
        return;
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

/// Open the result writer: the output file if given, stdout otherwise
fn open_output(io_args: &IoArgs) -> Result<Box<dyn Write>> {
    Ok(match &io_args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path).with_context(|| {
            format!("Failed to create output file {}", path.display())
        })?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.verbose, args.debug);

    let file_config = match &args.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };

    // Interrupts stop the stream; results collected so far are still written
    signal::install_interrupt_handler().context("Failed to install signal handlers")?;

    match args.command {
        Command::Count(count_args) => {
            let mut config = file_config.count;
            count_args.apply(&mut config);
            config.validate()?;
            tracing::debug!(?config, input = %count_args.io.input.display(), "Arguments parsed");

            let mut input = source::open_text_source(&count_args.io.input, Resolution::Nanosecond)
                .with_context(|| {
                    format!("Failed to open input {}", count_args.io.input.display())
                })?;
            let mut out = open_output(&count_args.io)?;
            let options = CountOptions {
                config,
                format: count_args.io.format,
            };

            let summary =
                analyzer::count_packets(&mut input, &options, &mut out, signal::interrupt_flag())?;
            if summary.interrupted {
                eprintln!("Interrupted, output is incomplete");
            }
            eprintln!("{}", text_output::format_elapsed(summary.elapsed));
        }
        Command::Quantize(quantize_args) => {
            let mut config = file_config.quantize;
            quantize_args.apply(&mut config);
            config.validate()?;
            tracing::debug!(?config, input = %quantize_args.io.input.display(), "Arguments parsed");

            let mut input =
                source::open_text_source(&quantize_args.io.input, Resolution::Microsecond)
                    .with_context(|| {
                        format!("Failed to open input {}", quantize_args.io.input.display())
                    })?;
            let mut out = open_output(&quantize_args.io)?;
            let options = QuantizeOptions {
                config,
                format: quantize_args.io.format,
                histogram_path: quantize_args.histogram_path.clone(),
                show_progress: args.verbose,
            };

            let summary =
                analyzer::quantize_iat(&mut input, &options, &mut out, signal::interrupt_flag())?;
            if summary.interrupted {
                eprintln!("Interrupted, histogram covers a partial stream");
            }
            if let Some(path) = &summary.data_file {
                eprintln!("Histogram data written to {}", path.display());
            }
            eprintln!("{}", text_output::format_elapsed(summary.elapsed));
        }
    }

    Ok(())
}
