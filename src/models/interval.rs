//! Interval primitives.
//!
//! # Time Model
//! Intervals are absolute instants in milliseconds since the Unix epoch.
//! Every interval is half-open `[start, end)`: two intervals that only
//! touch (`a.end == b.start`) do not overlap.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CalendarError, Result};

/// A non-empty time interval `[start, end)`.
///
/// The invariant `end_ms > start_ms` is checked on construction and on
/// deserialization, so every algorithm downstream can rely on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawInterval", rename_all = "camelCase")]
pub struct TimeInterval {
    start_ms: i64,
    end_ms: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInterval {
    start_ms: i64,
    end_ms: i64,
}

impl TryFrom<RawInterval> for TimeInterval {
    type Error = CalendarError;

    fn try_from(raw: RawInterval) -> Result<Self> {
        Self::try_new(raw.start_ms, raw.end_ms)
    }
}

impl TimeInterval {
    /// Creates an interval, rejecting `end_ms <= start_ms`.
    pub fn try_new(start_ms: i64, end_ms: i64) -> Result<Self> {
        if end_ms <= start_ms {
            return Err(CalendarError::InvalidInterval { start_ms, end_ms });
        }
        Ok(Self { start_ms, end_ms })
    }

    /// Creates an interval from two instants.
    pub fn from_instants(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        Self::try_new(start.timestamp_millis(), end.timestamp_millis())
    }

    /// Interval start (ms, inclusive).
    #[inline]
    pub fn start_ms(&self) -> i64 {
        self.start_ms
    }

    /// Interval end (ms, exclusive).
    #[inline]
    pub fn end_ms(&self) -> i64 {
        self.end_ms
    }

    /// Duration of this interval (ms). Always positive.
    #[inline]
    pub fn duration_ms(&self) -> i64 {
        self.end_ms - self.start_ms
    }

    /// Whether a timestamp falls within this interval.
    #[inline]
    pub fn contains(&self, time_ms: i64) -> bool {
        time_ms >= self.start_ms && time_ms < self.end_ms
    }

    /// Whether two intervals overlap.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        spans_overlap(self.start_ms, self.end_ms, other.start_ms, other.end_ms)
    }
}

/// Half-open overlap test on raw bounds.
///
/// Shared by the conflict detector and the layout engine. Empty spans
/// (`start == end`) never overlap anything.
#[inline]
pub fn spans_overlap(a_start: i64, a_end: i64, b_start: i64, b_end: i64) -> bool {
    a_start < b_end && b_start < a_end && a_start < a_end && b_start < b_end
}

/// A closed query window `[from, to]` for expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Window start (inclusive).
    pub from: DateTime<Utc>,
    /// Window end (inclusive).
    pub to: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new window.
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    /// Whether an occurrence spanning `[start, end)` belongs to this window.
    ///
    /// It does when it starts no later than `to` and is still running after `from`.
    pub fn intersects(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start <= self.to && end > self.from
    }
}
