//! CSV output format for interval records and IAT histograms

use crate::iat_quantizer::IatQuantizer;
use crate::interval_counter::IntervalRecord;

/// CSV formatter for closed count windows
///
/// Rows are formatted one at a time so they can be streamed as windows close.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvIntervalOutput;

impl CsvIntervalOutput {
    pub fn new() -> Self {
        Self
    }

    /// Header row
    pub fn header(&self) -> &'static str {
        "window_end_sec,window_end_nsec,packets"
    }

    /// Format a record as CSV row
    pub fn format_record(&self, record: &IntervalRecord) -> String {
        format!(
            "{},{},{}",
            record.window_end.seconds(),
            record.window_end.fraction(),
            record.count
        )
    }
}

/// CSV formatter for a quantized IAT histogram
///
/// Bucket rows are followed by `negative` and `overflow` rows whose
/// open-ended bounds are left empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvHistogramOutput;

impl CsvHistogramOutput {
    pub fn new() -> Self {
        Self
    }

    /// Generate CSV output for the quantizer's current histogram
    pub fn to_csv(&self, quantizer: &IatQuantizer) -> String {
        let snapshot = quantizer.snapshot();
        let mut output = String::from("bucket,lower_us,upper_us,count\n");

        for (index, count) in snapshot.buckets.iter().enumerate() {
            let (lower, upper) = quantizer.bucket_bounds_us(index);
            output.push_str(&format!("{},{},{},{}\n", index, lower, upper, count));
        }

        output.push_str(&format!("negative,,0,{}\n", snapshot.negative_count));
        let (ceiling, _) = quantizer.bucket_bounds_us(snapshot.buckets.len());
        output.push_str(&format!("overflow,{},,{}\n", ceiling, snapshot.overflow_count));

        output
    }
}
