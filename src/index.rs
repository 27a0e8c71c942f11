//! Daily grouping index.
//!
//! Buckets occurrences by day key (civil start date in the occurrence's
//! own timezone) so calendar views look up a day without rescanning the
//! full occurrence set.
//!
//! The index is a pure projection: rebuild it whenever the occurrence set
//! changes, never patch it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::ConcreteOccurrence;

/// Day key → occurrences of that day, ordered by start time.
///
/// Keys are `YYYY-MM-DD`, so map order is calendar order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailyBucket {
    days: BTreeMap<String, Vec<ConcreteOccurrence>>,
}

/// Builds the index from an occurrence set.
///
/// Within a day, occurrences are ordered by `(start, seed_id, occurrence_index)`.
///
/// # Example
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use tutor_calendar::index::build_index;
/// use tutor_calendar::models::ConcreteOccurrence;
///
/// let start = Utc.with_ymd_and_hms(2025, 4, 7, 9, 0, 0).unwrap();
/// let occ = ConcreteOccurrence::new("s1", 0, start, start + Duration::hours(1), chrono_tz::UTC);
///
/// let index = build_index(vec![occ]);
/// assert_eq!(index.day("2025-04-07").len(), 1);
/// assert!(index.day("2025-04-08").is_empty());
/// ```
pub fn build_index(occurrences: impl IntoIterator<Item = ConcreteOccurrence>) -> DailyBucket {
    let mut sorted: Vec<ConcreteOccurrence> = occurrences.into_iter().collect();
    sorted.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| a.seed_id.cmp(&b.seed_id))
            .then(a.occurrence_index.cmp(&b.occurrence_index))
    });

    let mut days: BTreeMap<String, Vec<ConcreteOccurrence>> = BTreeMap::new();
    let total = sorted.len();
    for occurrence in sorted {
        days.entry(occurrence.day_key.clone())
            .or_default()
            .push(occurrence);
    }

    log::debug!("Indexed {} occurrences into {} days", total, days.len());
    DailyBucket { days }
}

impl DailyBucket {
    /// Occurrences on a day; empty if the day has none.
    pub fn day(&self, day_key: &str) -> &[ConcreteOccurrence] {
        self.days.get(day_key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Non-empty days in `[from_key, to_key]`, in calendar order.
    ///
    /// Used by week and agenda views.
    pub fn days_between<'a>(
        &'a self,
        from_key: &str,
        to_key: &str,
    ) -> impl Iterator<Item = (&'a str, &'a [ConcreteOccurrence])> + 'a {
        let range = if from_key <= to_key {
            Some(self.days.range(from_key.to_string()..=to_key.to_string()))
        } else {
            None
        };
        range
            .into_iter()
            .flatten()
            .map(|(key, occs)| (key.as_str(), occs.as_slice()))
    }

    /// All non-empty day keys, in calendar order.
    pub fn day_keys(&self) -> impl Iterator<Item = &str> {
        self.days.keys().map(String::as_str)
    }

    /// Iterates `(day_key, occurrences)` in calendar order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ConcreteOccurrence])> {
        self.days
            .iter()
            .map(|(key, occs)| (key.as_str(), occs.as_slice()))
    }

    /// Number of non-empty days.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Whether the index holds no occurrences.
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Total number of indexed occurrences.
    pub fn occurrence_count(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }
}
