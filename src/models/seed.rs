//! Occurrence seed model.
//!
//! A seed is the stored template of one event or session: a first
//! occurrence, the civil timezone it was booked in, and an optional
//! recurrence rule. Seeds are owned by the persistence layer and are
//! read-only here.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::TimeInterval;
use crate::error::Result;

/// Template for one event or session.
///
/// `start` and `end` are the first occurrence as absolute instants;
/// `timezone` decides the wall-clock time that recurring instances keep.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceSeed {
    /// Unique seed identifier.
    pub id: String,
    /// First occurrence start.
    pub start: DateTime<Utc>,
    /// First occurrence end.
    pub end: DateTime<Utc>,
    /// Civil timezone (IANA name when serialized).
    pub timezone: Tz,
    /// RFC 5545 recurrence text. `None` = single occurrence.
    pub recurrence: Option<String>,
    /// Owning tutor.
    pub owner_id: String,
    /// Domain-specific key-value metadata (hub, student, title, ...).
    pub metadata: HashMap<String, String>,
}

impl OccurrenceSeed {
    /// Creates a non-recurring seed.
    ///
    /// Fails with `InvalidInterval` unless `end > start`.
    pub fn new(
        id: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        timezone: Tz,
    ) -> Result<Self> {
        TimeInterval::from_instants(start, end)?;
        Ok(Self {
            id: id.into(),
            start,
            end,
            timezone,
            recurrence: None,
            owner_id: String::new(),
            metadata: HashMap::new(),
        })
    }

    /// Sets the recurrence text (e.g. `FREQ=WEEKLY;BYDAY=MO`).
    pub fn with_recurrence(mut self, rule: impl Into<String>) -> Self {
        self.recurrence = Some(rule.into());
        self
    }

    /// Sets the owner.
    pub fn with_owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = owner_id.into();
        self
    }

    /// Adds a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Whether this seed carries a recurrence rule.
    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }

    /// The seed's span as a checked interval.
    pub fn interval(&self) -> Result<TimeInterval> {
        TimeInterval::from_instants(self.start, self.end)
    }

    /// Length of every occurrence of this seed.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// First occurrence start in the seed's timezone.
    pub fn local_start(&self) -> DateTime<Tz> {
        self.start.with_timezone(&self.timezone)
    }

    /// Wall-clock start time that every occurrence keeps.
    pub fn local_start_time(&self) -> NaiveTime {
        self.local_start().time()
    }
}
