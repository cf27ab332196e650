//! Fixed-width wall-clock packet counter
//!
//! The counter is seeded by the first timestamp (`next_boundary = first +
//! window`). Every later timestamp is counted into the open window, then each
//! boundary the timestamp has passed is closed in order, which yields
//! zero-count records for windows that saw no packets.

use crate::error::AnalysisError;
use crate::timestamp::{Resolution, Timestamp, WindowSpan};
use serde::{Deserialize, Serialize};
use std::iter::FusedIterator;

/// Rule deciding whether a timestamp has crossed the pending window boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum BoundaryPredicate {
    /// Both `seconds` and `fraction` must exceed the boundary's fields
    BothFields,
    /// Only `seconds` must exceed the boundary's seconds
    SecondsOnly,
}

impl BoundaryPredicate {
    /// Whether `timestamp` lies past `boundary` under this rule
    pub fn crossed(self, timestamp: Timestamp, boundary: Timestamp) -> bool {
        match self {
            BoundaryPredicate::BothFields => {
                timestamp.seconds() > boundary.seconds()
                    && timestamp.fraction() > boundary.fraction()
            }
            BoundaryPredicate::SecondsOnly => timestamp.seconds() > boundary.seconds(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BoundaryPredicate::BothFields => "both-fields",
            BoundaryPredicate::SecondsOnly => "seconds-only",
        }
    }
}

/// A closed window: its end boundary and the packets counted into it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalRecord {
    pub window_end: Timestamp,
    pub count: u64,
}

/// Windows closed by one [`IntervalCounter::observe`] call
#[derive(Debug)]
pub struct ClosedWindows<'a> {
    counter: &'a mut IntervalCounter,
    timestamp: Timestamp,
    active: bool,
}

impl Iterator for ClosedWindows<'_> {
    type Item = IntervalRecord;

    fn next(&mut self) -> Option<IntervalRecord> {
        if !self.active {
            return None;
        }
        let counter = &mut *self.counter;
        let boundary = counter.next_boundary?;
        if !counter.predicate.crossed(self.timestamp, boundary) {
            self.active = false;
            return None;
        }

        let record = IntervalRecord {
            window_end: boundary,
            count: counter.count,
        };
        counter.count = 0;
        counter.next_boundary = Some(boundary.advance(counter.span));
        Some(record)
    }
}

impl FusedIterator for ClosedWindows<'_> {}

impl Drop for ClosedWindows<'_> {
    fn drop(&mut self) {
        for _ in self.by_ref() {}
    }
}

/// Streaming packet counter over fixed wall-clock windows
#[derive(Debug, Clone)]
pub struct IntervalCounter {
    span: WindowSpan,
    predicate: BoundaryPredicate,
    next_boundary: Option<Timestamp>,
    count: u64,
}

impl IntervalCounter {
    /// Create a counter for windows of `window_length_seconds`
    pub fn new(
        window_length_seconds: f64,
        resolution: Resolution,
        predicate: BoundaryPredicate,
    ) -> Result<Self, AnalysisError> {
        let span = WindowSpan::from_seconds(window_length_seconds, resolution)?;
        Ok(Self::with_span(span, predicate))
    }

    /// Create a counter from an already validated span
    pub fn with_span(span: WindowSpan, predicate: BoundaryPredicate) -> Self {
        Self {
            span,
            predicate,
            next_boundary: None,
            count: 0,
        }
    }

    /// Feed one timestamp; the returned iterator yields the windows it closed,
    /// oldest first
    ///
    /// Windows are closed one at a time as the iterator advances, so a long
    /// gap costs no memory. Dropping the iterator early still closes the
    /// remaining windows without yielding them. `timestamp` must use the
    /// counter's resolution.
    pub fn observe(&mut self, timestamp: Timestamp) -> ClosedWindows<'_> {
        let active = match self.next_boundary {
            Some(_) => {
                self.count += 1;
                true
            }
            None => {
                self.next_boundary = Some(timestamp.advance(self.span));
                false
            }
        };

        ClosedWindows {
            counter: self,
            timestamp,
            active,
        }
    }

    /// The open window as a record, for sinks that want a final partial row
    ///
    /// Does not change state; `None` until the first timestamp was observed.
    pub fn flush(&self) -> Option<IntervalRecord> {
        self.next_boundary.map(|window_end| IntervalRecord {
            window_end,
            count: self.count,
        })
    }

    pub fn next_boundary(&self) -> Option<Timestamp> {
        self.next_boundary
    }

    /// Packets counted into the currently open window
    pub fn pending_count(&self) -> u64 {
        self.count
    }

    pub fn window_span(&self) -> WindowSpan {
        self.span
    }

    pub fn predicate(&self) -> BoundaryPredicate {
        self.predicate
    }

    pub fn resolution(&self) -> Resolution {
        self.span.resolution()
    }
}
