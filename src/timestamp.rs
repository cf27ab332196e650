//! Packet timestamps and the carry arithmetic shared by both pipelines
//!
//! A timestamp is a whole-seconds field plus a sub-second fraction counted in
//! units of its [`Resolution`]. All boundary advancement and delta math goes
//! through [`Timestamp::advance`] and [`Timestamp::delta_units`] so the
//! counter and the quantizer normalize fractions the same way.

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sub-second resolution of a timestamp stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    /// 10^9 units per second (packet counting)
    Nanosecond,
    /// 10^6 units per second (IAT quantization)
    Microsecond,
}

impl Resolution {
    /// Number of fraction units in one second
    pub const fn modulus(self) -> u32 {
        match self {
            Resolution::Nanosecond => 1_000_000_000,
            Resolution::Microsecond => 1_000_000,
        }
    }

    /// Decimal digits of the fraction field
    pub const fn digits(self) -> usize {
        match self {
            Resolution::Nanosecond => 9,
            Resolution::Microsecond => 6,
        }
    }

    /// Short unit label used in messages
    pub const fn unit(self) -> &'static str {
        match self {
            Resolution::Nanosecond => "ns",
            Resolution::Microsecond => "us",
        }
    }
}

/// Packet timestamp: epoch-relative seconds plus a fraction below the modulus
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    seconds: i64,
    fraction: u32,
}

impl Timestamp {
    /// Build a timestamp, rejecting fractions outside the resolution range
    pub fn new(seconds: i64, fraction: u32, resolution: Resolution) -> Result<Self, AnalysisError> {
        let modulus = resolution.modulus();
        if fraction >= modulus {
            return Err(AnalysisError::InvalidTimestamp {
                fraction: u64::from(fraction),
                modulus,
            });
        }
        Ok(Self { seconds, fraction })
    }

    /// Build a timestamp from a total count of resolution units since the epoch
    ///
    /// Negative totals are normalized so the fraction stays non-negative.
    pub fn from_units(total: i64, resolution: Resolution) -> Self {
        let modulus = i64::from(resolution.modulus());
        Self {
            seconds: total.div_euclid(modulus),
            fraction: total.rem_euclid(modulus) as u32,
        }
    }

    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    pub fn fraction(&self) -> u32 {
        self.fraction
    }

    /// Advance by a window span, carrying into seconds when the fraction wraps
    ///
    /// `self` must have been built at the span's resolution.
    pub fn advance(self, span: WindowSpan) -> Self {
        let modulus = span.resolution.modulus();
        debug_assert!(
            self.fraction < modulus,
            "fraction {} exceeds {} resolution",
            self.fraction,
            span.resolution.unit()
        );
        let mut seconds = self.seconds.saturating_add(span.seconds);
        // Both operands are below the modulus, so the sum fits in u32.
        let mut fraction = self.fraction + span.fraction;
        if fraction >= modulus {
            seconds = seconds.saturating_add(1);
            fraction -= modulus;
        }
        Self { seconds, fraction }
    }

    /// Advance by `n` window spans in one step; seconds saturate at the i64 range
    pub fn advance_by(self, span: WindowSpan, n: u64) -> Self {
        let modulus = i128::from(span.resolution.modulus());
        let total = (i128::from(self.seconds) * modulus + i128::from(self.fraction))
            .saturating_add(span.total_units().saturating_mul(i128::from(n)));
        let seconds = total.div_euclid(modulus);
        Self {
            seconds: i64::try_from(seconds).unwrap_or(if seconds < 0 { i64::MIN } else { i64::MAX }),
            fraction: total.rem_euclid(modulus) as u32,
        }
    }

    /// Signed distance from `earlier` to `self` in resolution units
    ///
    /// Saturates at the i64 range instead of wrapping.
    pub fn delta_units(self, earlier: Timestamp, resolution: Resolution) -> i64 {
        let modulus = i64::from(resolution.modulus());
        self.seconds
            .saturating_sub(earlier.seconds)
            .saturating_mul(modulus)
            .saturating_add(i64::from(self.fraction) - i64::from(earlier.fraction))
    }

    /// Render as `SECONDS.FRACTION` with the fraction zero-padded
    pub fn display(self, resolution: Resolution) -> TimestampDisplay {
        TimestampDisplay {
            timestamp: self,
            resolution,
        }
    }
}

/// Formatting adapter returned by [`Timestamp::display`]
#[derive(Debug, Clone, Copy)]
pub struct TimestampDisplay {
    timestamp: Timestamp,
    resolution: Resolution,
}

impl fmt::Display for TimestampDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:0width$}",
            self.timestamp.seconds,
            self.timestamp.fraction,
            width = self.resolution.digits()
        )
    }
}

/// Window length split into whole seconds and a fraction in resolution units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpan {
    seconds: i64,
    fraction: u32,
    resolution: Resolution,
}

impl WindowSpan {
    /// Split a positive length in seconds into whole seconds and fraction units
    ///
    /// The remainder is rounded to the nearest unit. Lengths that are not
    /// finite, not positive, too large for i64 seconds, or shorter than one
    /// unit are rejected.
    pub fn from_seconds(length: f64, resolution: Resolution) -> Result<Self, AnalysisError> {
        if !length.is_finite() || length <= 0.0 {
            return Err(AnalysisError::InvalidConfiguration(format!(
                "window length must be a positive number of seconds, got {}",
                length
            )));
        }
        if length >= i64::MAX as f64 {
            return Err(AnalysisError::InvalidConfiguration(format!(
                "window length {} seconds is out of range",
                length
            )));
        }

        let modulus = resolution.modulus();
        let whole = length.trunc();
        let mut seconds = whole as i64;
        let mut fraction = ((length - whole) * f64::from(modulus)).round() as u64;
        if fraction >= u64::from(modulus) {
            seconds += 1;
            fraction -= u64::from(modulus);
        }

        if seconds == 0 && fraction == 0 {
            return Err(AnalysisError::InvalidConfiguration(format!(
                "window length {} seconds is shorter than 1 {}",
                length,
                resolution.unit()
            )));
        }

        Ok(Self {
            seconds,
            fraction: fraction as u32,
            resolution,
        })
    }

    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    pub fn fraction(&self) -> u32 {
        self.fraction
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Span length in resolution units (i128 so huge spans cannot overflow)
    pub fn total_units(&self) -> i128 {
        i128::from(self.seconds) * i128::from(self.resolution.modulus()) + i128::from(self.fraction)
    }
}
