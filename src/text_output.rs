//! Human-readable text output

use crate::iat_quantizer::HistogramSnapshot;
use crate::interval_counter::IntervalRecord;
use crate::progress::ProgressTick;
use std::time::Duration;

/// Column header printed before the first count row
pub const INTERVAL_HEADER: &str = "Time(Sec)\tTime(nSec)\tPackets";

/// One count window as a tab-separated row
pub fn format_interval_row(record: &IntervalRecord) -> String {
    format!(
        "{} \t{} \t{}",
        record.window_end.seconds(),
        record.window_end.fraction(),
        record.count
    )
}

/// Histogram listing: one line per bucket, then the out-of-range counters
pub fn format_histogram(snapshot: &HistogramSnapshot) -> String {
    let mut output = String::new();
    for (index, count) in snapshot.buckets.iter().enumerate() {
        output.push_str(&format!("Quantized IAT[{:02}]: {}\n", index, count));
    }
    output.push_str(&format!("Negative IAT: {}\n", snapshot.negative_count));
    output.push_str(&format!("Exceed max IAT: {}\n", snapshot.overflow_count));
    output
}

pub fn format_progress(tick: &ProgressTick, negative_count: u64, overflow_count: u64) -> String {
    format!(
        "Processed {} seconds of packets\t| negative IAT: {}\t| exceed max IAT: {}",
        tick.processed_seconds, negative_count, overflow_count
    )
}

pub fn format_elapsed(elapsed: Duration) -> String {
    format!(
        "Elapsed time: {}.{:09} sec",
        elapsed.as_secs(),
        elapsed.subsec_nanos()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::{Resolution, Timestamp};

    #[test]
    fn test_interval_row() {
        let record = IntervalRecord {
            window_end: Timestamp::new(1_700_000_000, 500, Resolution::Nanosecond).unwrap(),
            count: 12,
        };
        assert_eq!(format_interval_row(&record), "1700000000 \t500 \t12");
    }

    #[test]
    fn test_histogram_listing() {
        let snapshot = HistogramSnapshot {
            buckets: vec![3, 0],
            negative_count: 1,
            overflow_count: 2,
        };
        assert_eq!(
            format_histogram(&snapshot),
            "Quantized IAT[00]: 3\nQuantized IAT[01]: 0\nNegative IAT: 1\nExceed max IAT: 2\n"
        );
    }

    #[test]
    fn test_progress_line() {
        let line = format_progress(&ProgressTick { processed_seconds: 40, windows: 1 }, 2, 5);
        assert!(line.starts_with("Processed 40 seconds"));
        assert!(line.contains("negative IAT: 2"));
        assert!(line.contains("exceed max IAT: 5"));
    }

    #[test]
    fn test_elapsed_pads_nanoseconds() {
        assert_eq!(
            format_elapsed(Duration::new(3, 42)),
            "Elapsed time: 3.000000042 sec"
        );
    }
}
