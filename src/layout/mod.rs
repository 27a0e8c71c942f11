//! Occurrence layout for time-grid views.
//!
//! Assigns each occurrence of a day a `(column_index, total_columns)` pair
//! so simultaneous occurrences render side by side. Occurrences that only
//! touch (`end == start`) do not share a cluster, matching the half-open
//! convention of [`conflict`](crate::conflict).
//!
//! Rendering uses `column_index / total_columns` of the available width as
//! the horizontal offset; vertical placement is up to the view.

mod columns;

pub use columns::ColumnSlot;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::index::DailyBucket;
use crate::models::{ConcreteOccurrence, OccurrenceRef, TimeInterval};
use columns::assign_columns;

/// Render-ready placement of one occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutPosition {
    /// The placed occurrence.
    pub occurrence: OccurrenceRef,
    /// Column, in `[0, total_columns)`.
    pub column_index: usize,
    /// Columns shared by the occurrence's cluster (≥ 1).
    pub total_columns: usize,
}

impl LayoutPosition {
    /// Horizontal offset as a fraction of the day column width.
    pub fn left_fraction(&self) -> f64 {
        self.column_index as f64 / self.total_columns as f64
    }

    /// Width as a fraction of the day column width.
    pub fn width_fraction(&self) -> f64 {
        1.0 / self.total_columns as f64
    }
}

/// Lays out one day's occurrences.
///
/// Positions are returned in input order. Zero-duration occurrences are
/// placed alone (`0 / 1`).
///
/// # Example
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use tutor_calendar::layout::layout_day;
/// use tutor_calendar::models::ConcreteOccurrence;
///
/// let nine = Utc.with_ymd_and_hms(2025, 4, 7, 9, 0, 0).unwrap();
/// let occ = |id: &str, from: i64, to: i64| {
///     ConcreteOccurrence::new(id, 0, nine + Duration::minutes(from), nine + Duration::minutes(to), chrono_tz::UTC)
/// };
///
/// let positions = layout_day(&[occ("a", 0, 60), occ("b", 30, 90), occ("c", 80, 120)]);
/// let columns: Vec<(usize, usize)> = positions.iter().map(|p| (p.column_index, p.total_columns)).collect();
/// assert_eq!(columns, vec![(0, 2), (1, 2), (0, 2)]);
/// ```
pub fn layout_day(occurrences: &[ConcreteOccurrence]) -> Vec<LayoutPosition> {
    let spans: Vec<(i64, i64)> = occurrences
        .iter()
        .map(|o| (o.start_ms(), o.end_ms()))
        .collect();

    occurrences
        .iter()
        .zip(assign_columns(&spans))
        .map(|(occurrence, slot)| LayoutPosition {
            occurrence: occurrence.occurrence_ref(),
            column_index: slot.column_index,
            total_columns: slot.total_columns,
        })
        .collect()
}

/// Lays out bare intervals. Slots are returned in input order.
pub fn layout_intervals(intervals: &[TimeInterval]) -> Vec<ColumnSlot> {
    let spans: Vec<(i64, i64)> = intervals
        .iter()
        .map(|i| (i.start_ms(), i.end_ms()))
        .collect();
    assign_columns(&spans)
}

/// Lays out every day of an index, keyed by day key.
pub fn layout_bucket(bucket: &DailyBucket) -> BTreeMap<String, Vec<LayoutPosition>> {
    bucket
        .iter()
        .map(|(day_key, occurrences)| (day_key.to_string(), layout_day(occurrences)))
        .collect()
}
