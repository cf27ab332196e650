//! JSON output format for packet counts and IAT histograms

use crate::iat_quantizer::HistogramSnapshot;
use crate::interval_counter::{BoundaryPredicate, IntervalRecord};
use serde::{Deserialize, Serialize};

/// A closed count window
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonIntervalRecord {
    /// Window end, whole seconds
    pub window_end_sec: i64,
    /// Window end, nanoseconds
    pub window_end_nsec: u32,
    /// Packets counted into the window
    pub packets: u64,
}

impl From<&IntervalRecord> for JsonIntervalRecord {
    fn from(record: &IntervalRecord) -> Self {
        Self {
            window_end_sec: record.window_end.seconds(),
            window_end_nsec: record.window_end.fraction(),
            packets: record.count,
        }
    }
}

/// Run summary shared by both reports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRunSummary {
    /// Timestamps pulled from the source
    pub timestamps: u64,
    /// Wall-clock processing time in seconds
    pub elapsed_seconds: f64,
    /// True when an interrupt stopped the run early
    pub interrupted: bool,
}

/// Root JSON document for `count`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonCountReport {
    pub version: String,
    pub format: String,
    pub window_length_seconds: f64,
    pub predicate: BoundaryPredicate,
    pub records: Vec<JsonIntervalRecord>,
    /// Open window at end of stream, present only when a final flush was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial: Option<JsonIntervalRecord>,
    pub summary: JsonRunSummary,
}

impl JsonCountReport {
    pub fn new(window_length_seconds: f64, predicate: BoundaryPredicate) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "ptstat-count-v1".to_string(),
            window_length_seconds,
            predicate,
            records: Vec::new(),
            partial: None,
            summary: JsonRunSummary {
                timestamps: 0,
                elapsed_seconds: 0.0,
                interrupted: false,
            },
        }
    }

    pub fn add_record(&mut self, record: &IntervalRecord) {
        self.records.push(record.into());
    }

    pub fn set_partial(&mut self, record: &IntervalRecord) {
        self.partial = Some(record.into());
    }

    pub fn set_summary(&mut self, summary: JsonRunSummary) {
        self.summary = summary;
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Root JSON document for `quantize`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonHistogramReport {
    pub version: String,
    pub format: String,
    pub bucket_shift: u32,
    pub bucket_count: usize,
    /// Bucket width in microseconds (`2^bucket_shift`)
    pub bucket_width_us: u64,
    pub buckets: Vec<u64>,
    pub negative_count: u64,
    pub overflow_count: u64,
    pub total_samples: u64,
    pub summary: JsonRunSummary,
}

impl JsonHistogramReport {
    pub fn new(bucket_shift: u32, snapshot: &HistogramSnapshot, summary: JsonRunSummary) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "ptstat-iat-v1".to_string(),
            bucket_shift,
            bucket_count: snapshot.buckets.len(),
            bucket_width_us: 1u64 << bucket_shift,
            buckets: snapshot.buckets.clone(),
            negative_count: snapshot.negative_count,
            overflow_count: snapshot.overflow_count,
            total_samples: snapshot.total_samples(),
            summary,
        }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::{Resolution, Timestamp};

    fn summary() -> JsonRunSummary {
        JsonRunSummary {
            timestamps: 3,
            elapsed_seconds: 0.5,
            interrupted: false,
        }
    }

    #[test]
    fn test_count_report_serializes_records() {
        let mut report = JsonCountReport::new(10.0, BoundaryPredicate::SecondsOnly);
        report.add_record(&IntervalRecord {
            window_end: Timestamp::new(10, 0, Resolution::Nanosecond).unwrap(),
            count: 2,
        });
        report.set_summary(summary());

        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["format"], "ptstat-count-v1");
        assert_eq!(value["predicate"], "seconds-only");
        assert_eq!(value["records"][0]["window_end_sec"], 10);
        assert_eq!(value["records"][0]["packets"], 2);
        assert!(value.get("partial").is_none());
        assert_eq!(value["summary"]["timestamps"], 3);
    }

    #[test]
    fn test_count_report_partial_window() {
        let mut report = JsonCountReport::new(1.0, BoundaryPredicate::BothFields);
        report.set_partial(&IntervalRecord {
            window_end: Timestamp::new(5, 7, Resolution::Nanosecond).unwrap(),
            count: 9,
        });
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["partial"]["window_end_nsec"], 7);
        assert_eq!(value["partial"]["packets"], 9);
    }

    #[test]
    fn test_histogram_report_fields() {
        let snapshot = HistogramSnapshot {
            buckets: vec![1, 1, 0],
            negative_count: 0,
            overflow_count: 1,
        };
        let report = JsonHistogramReport::new(4, &snapshot, summary());
        assert_eq!(report.bucket_count, 3);
        assert_eq!(report.bucket_width_us, 16);
        assert_eq!(report.total_samples, 3);

        let parsed: JsonHistogramReport =
            serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(parsed.buckets, vec![1, 1, 0]);
        assert_eq!(parsed.overflow_count, 1);
    }
}
