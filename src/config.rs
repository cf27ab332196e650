//! Analysis configuration
//!
//! Values come from defaults, then an optional TOML file, then the command
//! line. Validation happens when the components are built, so an invalid
//! value surfaces as [`AnalysisError::InvalidConfiguration`] before any
//! timestamp is read.
//!
//! # Example ptstat.toml
//!
//! ```toml
//! [count]
//! window_length_seconds = 0.5
//! boundary = "seconds-only"
//! flush_final = true
//!
//! [quantize]
//! bucket_shift = 4
//! bucket_count = 32
//! progress_interval_seconds = 60
//! ```

use crate::error::AnalysisError;
use crate::iat_quantizer::IatQuantizer;
use crate::interval_counter::{BoundaryPredicate, IntervalCounter};
use crate::progress::{ProgressReporter, DEFAULT_PROGRESS_INTERVAL_SECONDS};
use crate::timestamp::Resolution;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default number of IAT buckets
pub const DEFAULT_BUCKET_COUNT: usize = 20;

/// Settings for the windowed packet counter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CountConfig {
    /// Window length in seconds (required, no default)
    pub window_length_seconds: Option<f64>,

    /// Boundary-crossing rule
    ///
    /// Default: both-fields, matching the historical packet counter
    pub boundary: BoundaryPredicate,

    /// Emit the open window as a final row at end of stream
    pub flush_final: bool,
}

impl Default for CountConfig {
    fn default() -> Self {
        Self {
            window_length_seconds: None,
            boundary: BoundaryPredicate::BothFields,
            flush_final: false,
        }
    }
}

impl CountConfig {
    /// Build a nanosecond-resolution counter from these settings
    pub fn build_counter(&self) -> Result<IntervalCounter, AnalysisError> {
        let length = self.window_length_seconds.ok_or_else(|| {
            AnalysisError::InvalidConfiguration("window_length_seconds is required".to_string())
        })?;
        IntervalCounter::new(length, Resolution::Nanosecond, self.boundary)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        self.build_counter().map(|_| ())
    }
}

/// Settings for the IAT quantizer and its progress reporter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuantizeConfig {
    /// Bucket width is `2^bucket_shift` microseconds (required, >= 1)
    pub bucket_shift: Option<u32>,

    /// Number of buckets
    ///
    /// Default: 20, which covers shifts of 4 or 5 for typical LAN captures
    pub bucket_count: usize,

    /// Capture-time seconds between progress reports
    pub progress_interval_seconds: f64,
}

impl Default for QuantizeConfig {
    fn default() -> Self {
        Self {
            bucket_shift: None,
            bucket_count: DEFAULT_BUCKET_COUNT,
            progress_interval_seconds: DEFAULT_PROGRESS_INTERVAL_SECONDS,
        }
    }
}

impl QuantizeConfig {
    pub fn build_quantizer(&self) -> Result<IatQuantizer, AnalysisError> {
        let shift = self.bucket_shift.ok_or_else(|| {
            AnalysisError::InvalidConfiguration("bucket_shift is required".to_string())
        })?;
        IatQuantizer::new(shift, self.bucket_count)
    }

    pub fn build_progress(&self) -> Result<ProgressReporter, AnalysisError> {
        ProgressReporter::new(self.progress_interval_seconds)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        self.build_quantizer()?;
        self.build_progress()?;
        Ok(())
    }
}

/// Root of a ptstat.toml file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub count: CountConfig,
    pub quantize: QuantizeConfig,
}

impl FileConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}
