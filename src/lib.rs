//! ptstat - packet trace statistics
//!
//! Streaming analysis of packet timestamps: a fixed-window packet counter and
//! a log2-quantized inter-arrival time histogram, plus the sources, sinks and
//! drivers the `ptstat` binary wires around them.

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod csv_output;
pub mod error;
pub mod histogram_output;
pub mod iat_quantizer;
pub mod interval_counter;
pub mod json_output;
pub mod progress;
pub mod signal;
pub mod source;
pub mod text_output;
pub mod timestamp;
