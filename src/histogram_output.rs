//! Histogram data file (`<path>.dat`, one bucket count per line)
//!
//! The file is plain enough to feed straight into gnuplot's
//! `plot '<path>.dat' using 1` with histogram style.

use crate::iat_quantizer::HistogramSnapshot;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Path of the data file for a histogram path given without extension
pub fn data_file_path(histogram_path: &Path) -> PathBuf {
    let mut name = histogram_path.as_os_str().to_owned();
    name.push(".dat");
    PathBuf::from(name)
}

/// Write bucket counts to `<histogram_path>.dat` and return the written path
pub fn write_data_file(histogram_path: &Path, snapshot: &HistogramSnapshot) -> Result<PathBuf> {
    let path = data_file_path(histogram_path);
    let file = File::create(&path)
        .with_context(|| format!("Failed to create histogram data file {}", path.display()))?;

    let mut writer = BufWriter::new(file);
    for count in &snapshot.buckets {
        writeln!(writer, "{}", count)
            .with_context(|| format!("Failed to write histogram data file {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write histogram data file {}", path.display()))?;

    Ok(path)
}
