//! Write-time booking validation.
//!
//! # Procedure
//! 1. Reject a self-conflicting batch (`has_any_overlap` on proposed only).
//! 2. Otherwise sweep `proposed ++ existing` and keep pairs that cross the
//!    partition. Existing-vs-existing pairs are ignored; the stored
//!    schedule is conflict-free.
//!
//! Conflicts are returned, never raised.

use serde::{Deserialize, Serialize};

use super::{find_overlaps, has_any_overlap};
use crate::models::TimeInterval;

/// Which set a conflicting interval belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictSource {
    /// Another interval of the proposed batch.
    New,
    /// An already-stored booking.
    Existing,
}

/// One conflict between a proposed booking and another booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    /// Index into the proposed batch.
    pub proposed_index: usize,
    /// The proposed interval.
    pub proposed: TimeInterval,
    /// Index into the proposed batch (`New`) or the existing set (`Existing`).
    pub other_index: usize,
    /// The interval it collides with.
    pub conflicts_with: TimeInterval,
    /// Where `conflicts_with` comes from.
    pub source: ConflictSource,
}

/// Outcome of a booking check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictReport {
    /// Detected conflicts, empty if the batch can be committed.
    pub conflicts: Vec<Conflict>,
}

impl ConflictReport {
    /// Number of conflicts.
    pub fn len(&self) -> usize {
        self.conflicts.len()
    }

    /// Whether the batch is free of conflicts.
    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Whether the batch was rejected for overlapping itself.
    pub fn is_self_conflicting(&self) -> bool {
        self.conflicts
            .iter()
            .any(|c| c.source == ConflictSource::New)
    }
}

/// Checks a batch of proposed bookings against each other and the stored ones.
///
/// A self-conflicting batch reports only `New` conflicts and is not compared
/// against `existing`.
pub fn check_booking(proposed: &[TimeInterval], existing: &[TimeInterval]) -> ConflictReport {
    let mut report = ConflictReport::default();

    if has_any_overlap(proposed) {
        for pair in find_overlaps(proposed) {
            report.conflicts.push(Conflict {
                proposed_index: pair.index_a,
                proposed: proposed[pair.index_a],
                other_index: pair.index_b,
                conflicts_with: proposed[pair.index_b],
                source: ConflictSource::New,
            });
        }
        log::warn!(
            "Proposed batch of {} bookings overlaps itself ({} pairs)",
            proposed.len(),
            report.len()
        );
        return report;
    }

    let split = proposed.len();
    let combined: Vec<TimeInterval> = proposed.iter().chain(existing).copied().collect();

    for pair in find_overlaps(&combined) {
        // index_a < index_b, so a crossing pair has a proposed index_a.
        if pair.index_a < split && pair.index_b >= split {
            report.conflicts.push(Conflict {
                proposed_index: pair.index_a,
                proposed: combined[pair.index_a],
                other_index: pair.index_b - split,
                conflicts_with: combined[pair.index_b],
                source: ConflictSource::Existing,
            });
        }
    }

    report
        .conflicts
        .sort_by_key(|c| (c.proposed_index, c.other_index));
    log::debug!(
        "Checked {} proposed against {} existing bookings: {} conflicts",
        proposed.len(),
        existing.len(),
        report.len()
    );
    report
}
