//! Inter-arrival time quantizer
//!
//! Each delta between consecutive timestamps (in microseconds) is right-shifted
//! by `bucket_shift`, so bucket `i` covers `[i << shift, (i + 1) << shift)` us.
//! Negative deltas and indices at or past `bucket_count` land in dedicated
//! counters instead of the bucket array. The first timestamp only seeds the
//! delta computation.

use crate::error::AnalysisError;
use crate::timestamp::{Resolution, Timestamp};
use serde::{Deserialize, Serialize};

/// Largest usable shift for a 64-bit delta
pub const MAX_BUCKET_SHIFT: u32 = 63;

/// Outcome of observing one timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// First timestamp of the stream; no delta yet
    Initial,
    /// Timestamp earlier than its predecessor
    Negative,
    /// Delta counted into the bucket at this index
    Bucketed(usize),
    /// Delta beyond the last bucket
    Overflow,
}

/// Read-only copy of the histogram counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramSnapshot {
    pub buckets: Vec<u64>,
    pub negative_count: u64,
    pub overflow_count: u64,
}

impl HistogramSnapshot {
    /// Number of classified deltas (everything except the seeding sample)
    pub fn total_samples(&self) -> u64 {
        self.buckets.iter().sum::<u64>() + self.negative_count + self.overflow_count
    }
}

/// Streaming IAT histogram
#[derive(Debug, Clone)]
pub struct IatQuantizer {
    bucket_shift: u32,
    buckets: Vec<u64>,
    negative_count: u64,
    overflow_count: u64,
    previous: Option<Timestamp>,
}

impl IatQuantizer {
    /// Create a quantizer with `bucket_count` buckets of width `2^bucket_shift` us
    pub fn new(bucket_shift: u32, bucket_count: usize) -> Result<Self, AnalysisError> {
        if bucket_shift < 1 {
            return Err(AnalysisError::InvalidConfiguration(
                "bucket_shift must be >= 1".to_string(),
            ));
        }
        if bucket_shift > MAX_BUCKET_SHIFT {
            return Err(AnalysisError::InvalidConfiguration(format!(
                "bucket_shift must be <= {}, got {}",
                MAX_BUCKET_SHIFT, bucket_shift
            )));
        }
        if bucket_count < 1 {
            return Err(AnalysisError::InvalidConfiguration(
                "bucket_count must be >= 1".to_string(),
            ));
        }

        Ok(Self {
            bucket_shift,
            buckets: vec![0; bucket_count],
            negative_count: 0,
            overflow_count: 0,
            previous: None,
        })
    }

    /// Classify the delta from the previous timestamp and count it
    pub fn observe(&mut self, timestamp: Timestamp) -> Classification {
        let Some(previous) = self.previous.replace(timestamp) else {
            return Classification::Initial;
        };

        let delta = timestamp.delta_units(previous, Resolution::Microsecond);
        if delta < 0 {
            self.negative_count += 1;
            return Classification::Negative;
        }

        let index = (delta as u64) >> self.bucket_shift;
        match usize::try_from(index) {
            Ok(index) if index < self.buckets.len() => {
                self.buckets[index] += 1;
                Classification::Bucketed(index)
            }
            _ => {
                self.overflow_count += 1;
                Classification::Overflow
            }
        }
    }

    pub fn snapshot(&self) -> HistogramSnapshot {
        HistogramSnapshot {
            buckets: self.buckets.clone(),
            negative_count: self.negative_count,
            overflow_count: self.overflow_count,
        }
    }

    pub fn bucket_shift(&self) -> u32 {
        self.bucket_shift
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn negative_count(&self) -> u64 {
        self.negative_count
    }

    pub fn overflow_count(&self) -> u64 {
        self.overflow_count
    }

    /// Inclusive lower and exclusive upper bound of a bucket, in microseconds
    pub fn bucket_bounds_us(&self, index: usize) -> (u128, u128) {
        let width = 1u128 << self.bucket_shift;
        let lower = index as u128 * width;
        (lower, lower + width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn us(total: i64) -> Timestamp {
        Timestamp::from_units(total, Resolution::Microsecond)
    }

    #[test]
    fn test_rejects_invalid_configuration() {
        assert!(matches!(
            IatQuantizer::new(0, 20),
            Err(AnalysisError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            IatQuantizer::new(4, 0),
            Err(AnalysisError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            IatQuantizer::new(64, 20),
            Err(AnalysisError::InvalidConfiguration(_))
        ));
        assert!(IatQuantizer::new(MAX_BUCKET_SHIFT, 1).is_ok());
    }

    #[test]
    fn test_worked_example() {
        let mut q = IatQuantizer::new(4, 3).unwrap();
        let classes: Vec<Classification> = [1000, 1005, 1025, 1100]
            .iter()
            .map(|&t| q.observe(us(t)))
            .collect();

        assert_eq!(
            classes,
            vec![
                Classification::Initial,
                Classification::Bucketed(0),
                Classification::Bucketed(1),
                Classification::Overflow,
            ]
        );
        let snap = q.snapshot();
        assert_eq!(snap.buckets, vec![1, 1, 0]);
        assert_eq!(snap.overflow_count, 1);
        assert_eq!(snap.negative_count, 0);
        assert_eq!(snap.total_samples(), 3);
    }

    #[test]
    fn test_first_observe_leaves_counters_untouched() {
        let mut q = IatQuantizer::new(1, 4).unwrap();
        assert_eq!(q.observe(us(123_456_789)), Classification::Initial);
        let snap = q.snapshot();
        assert_eq!(snap.buckets, vec![0; 4]);
        assert_eq!(snap.negative_count, 0);
        assert_eq!(snap.overflow_count, 0);
    }

    #[test]
    fn test_index_equal_to_bucket_count_overflows() {
        // delta 48 >> 4 == 3 == bucket_count
        let mut q = IatQuantizer::new(4, 3).unwrap();
        q.observe(us(0));
        assert_eq!(q.observe(us(48)), Classification::Overflow);
        // delta 47 >> 4 == 2, the last valid bucket
        assert_eq!(q.observe(us(95)), Classification::Bucketed(2));
        assert_eq!(q.snapshot().buckets, vec![0, 0, 1]);
    }

    #[test]
    fn test_negative_delta_counts_and_reseeds() {
        let mut q = IatQuantizer::new(2, 8).unwrap();
        q.observe(us(1_000));
        assert_eq!(q.observe(us(990)), Classification::Negative);
        assert_eq!(q.negative_count(), 1);
        assert_eq!(q.snapshot().buckets, vec![0; 8]);
        // previous timestamp is now 990
        assert_eq!(q.observe(us(994)), Classification::Bucketed(1));
    }

    #[test]
    fn test_zero_delta_goes_to_first_bucket() {
        let mut q = IatQuantizer::new(3, 2).unwrap();
        q.observe(us(50));
        assert_eq!(q.observe(us(50)), Classification::Bucketed(0));
    }

    #[test]
    fn test_delta_spans_seconds_field() {
        let mut q = IatQuantizer::new(10, 2000).unwrap();
        q.observe(Timestamp::new(7, 999_000, Resolution::Microsecond).unwrap());
        let class = q.observe(Timestamp::new(9, 1_000, Resolution::Microsecond).unwrap());
        // 1_002_000 us >> 10 == 978
        assert_eq!(class, Classification::Bucketed(978));
    }

    #[test]
    fn test_huge_delta_overflows() {
        let mut q = IatQuantizer::new(1, 4).unwrap();
        q.observe(Timestamp::new(i64::MIN, 0, Resolution::Microsecond).unwrap());
        let class = q.observe(Timestamp::new(i64::MAX, 0, Resolution::Microsecond).unwrap());
        assert_eq!(class, Classification::Overflow);
        assert_eq!(q.overflow_count(), 1);
    }

    #[test]
    fn test_bucket_bounds() {
        let q = IatQuantizer::new(5, 20).unwrap();
        assert_eq!(q.bucket_bounds_us(0), (0, 32));
        assert_eq!(q.bucket_bounds_us(3), (96, 128));
    }

    #[test]
    fn test_snapshot_does_not_mutate() {
        let mut q = IatQuantizer::new(1, 2).unwrap();
        q.observe(us(0));
        q.observe(us(1));
        let a = q.snapshot();
        let b = q.snapshot();
        assert_eq!(a, b);
        assert_eq!(a.buckets, vec![1, 0]);
    }
}
