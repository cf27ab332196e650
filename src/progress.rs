//! Progress reporting for the IAT pipeline
//!
//! Progress windows follow the seconds-only boundary rule over the same stream
//! as the quantizer. A timestamp that jumps past many windows yields a single
//! tick carrying the number of windows it passed.

use crate::error::AnalysisError;
use crate::timestamp::{Resolution, Timestamp, WindowSpan};

/// Default progress window (seconds of capture time)
pub const DEFAULT_PROGRESS_INTERVAL_SECONDS: f64 = 10.0;

/// Progress windows closed by one timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressTick {
    /// Whole seconds of capture time between the first packet and the current one
    pub processed_seconds: i64,
    /// Progress windows closed by this timestamp (at least 1)
    pub windows: u64,
}

#[derive(Debug, Clone)]
pub struct ProgressReporter {
    span: WindowSpan,
    next_boundary: Option<Timestamp>,
    first_seconds: Option<i64>,
}

impl ProgressReporter {
    pub fn new(interval_seconds: f64) -> Result<Self, AnalysisError> {
        Ok(Self {
            span: WindowSpan::from_seconds(interval_seconds, Resolution::Microsecond)?,
            next_boundary: None,
            first_seconds: None,
        })
    }

    /// Feed one microsecond timestamp; `Some` when it closed any progress window
    pub fn observe(&mut self, timestamp: Timestamp) -> Option<ProgressTick> {
        let first = *self.first_seconds.get_or_insert(timestamp.seconds());
        let Some(boundary) = self.next_boundary else {
            self.next_boundary = Some(timestamp.advance(self.span));
            return None;
        };

        // A boundary is passed once it lies before the start of the timestamp's second
        let modulus = i128::from(Resolution::Microsecond.modulus());
        let gap = (i128::from(timestamp.seconds()) - i128::from(boundary.seconds())) * modulus
            - i128::from(boundary.fraction());
        if gap <= 0 {
            return None;
        }

        let span = self.span.total_units();
        let windows = u64::try_from((gap + span - 1) / span).unwrap_or(u64::MAX);
        self.next_boundary = Some(boundary.advance_by(self.span, windows));

        Some(ProgressTick {
            processed_seconds: timestamp.seconds().saturating_sub(first),
            windows,
        })
    }
}
