//! Concrete occurrence model.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::TimeInterval;
use crate::error::Result;

/// Format of a day key: civil date, lexicographically sortable.
pub const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// Civil date of `instant` in `timezone`, as a day key (`YYYY-MM-DD`).
pub fn day_key_for(instant: DateTime<Utc>, timezone: Tz) -> String {
    instant
        .with_timezone(&timezone)
        .format(DAY_KEY_FORMAT)
        .to_string()
}

/// Stable identity of one instance of a (possibly recurring) seed.
///
/// The occurrence index, not the date, identifies the instance, so a
/// single instance can be edited or cancelled by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceRef {
    /// Seed the occurrence was generated from.
    pub seed_id: String,
    /// 0-based position in the rule's full sequence.
    pub occurrence_index: usize,
}

/// One materialized instance of a seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConcreteOccurrence {
    /// Seed the occurrence was generated from.
    pub seed_id: String,
    /// 0-based position in the rule's full (unfiltered) sequence.
    pub occurrence_index: usize,
    /// Absolute start.
    pub start: DateTime<Utc>,
    /// Absolute end.
    pub end: DateTime<Utc>,
    /// Timezone the occurrence is displayed and bucketed in.
    pub timezone: Tz,
    /// Civil start date in `timezone`.
    pub day_key: String,
}

impl ConcreteOccurrence {
    /// Creates an occurrence; the day key is derived from `start`.
    pub fn new(
        seed_id: impl Into<String>,
        occurrence_index: usize,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        timezone: Tz,
    ) -> Self {
        Self {
            seed_id: seed_id.into(),
            occurrence_index,
            start,
            end,
            timezone,
            day_key: day_key_for(start, timezone),
        }
    }

    /// Start (ms since epoch).
    #[inline]
    pub fn start_ms(&self) -> i64 {
        self.start.timestamp_millis()
    }

    /// End (ms since epoch).
    #[inline]
    pub fn end_ms(&self) -> i64 {
        self.end.timestamp_millis()
    }

    /// The occurrence span, checked for `end > start`.
    pub fn interval(&self) -> Result<TimeInterval> {
        TimeInterval::try_new(self.start_ms(), self.end_ms())
    }

    /// Identity of this instance.
    pub fn occurrence_ref(&self) -> OccurrenceRef {
        OccurrenceRef {
            seed_id: self.seed_id.clone(),
            occurrence_index: self.occurrence_index,
        }
    }
}
