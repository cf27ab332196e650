//! Error types for the analysis core and timestamp sources

use thiserror::Error;

/// Errors raised while configuring or feeding the analysis components
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// Rejected configuration value (window length, bucket shift, bucket count)
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Sub-second field outside the range of its resolution
    #[error("Invalid timestamp: fraction {fraction} must be below {modulus}")]
    InvalidTimestamp { fraction: u64, modulus: u32 },
}

/// Errors produced while pulling timestamps from a source
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("line {line}: invalid timestamp '{text}': {reason}")]
    Parse {
        line: u64,
        text: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
