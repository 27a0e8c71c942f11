//! Sweep-line overlap detection.
//!
//! # Algorithm
//! 1. Emit a start and an end boundary per interval.
//! 2. Sort by time; at equal times, ends come before starts, so touching
//!    intervals (`a.end == b.start`) are never reported.
//! 3. Sweep left to right with an open set. Each start pairs with every
//!    open interval, then joins the set; each end leaves it.
//!
//! # Complexity
//! O(n log n + k) for n intervals and k overlapping pairs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::ControlFlow;

use crate::models::TimeInterval;

/// Two overlapping intervals, by position in the input slice.
///
/// Always normalized so that `index_a < index_b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlapPair {
    /// Lower input index.
    pub index_a: usize,
    /// Higher input index.
    pub index_b: usize,
}

impl OverlapPair {
    fn new(i: usize, j: usize) -> Self {
        Self {
            index_a: i.min(j),
            index_b: i.max(j),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum BoundaryKind {
    // Ordered before `Start` so ties close intervals first.
    End,
    Start,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct TimeBoundary {
    time_ms: i64,
    kind: BoundaryKind,
    interval_index: usize,
}

/// Finds every pair of overlapping intervals.
///
/// Never fails; an empty result means the set is conflict-free.
pub fn find_overlaps(intervals: &[TimeInterval]) -> Vec<OverlapPair> {
    let mut pairs = Vec::new();
    let _ = sweep(intervals, |pair| {
        pairs.push(pair);
        ControlFlow::Continue(())
    });
    log::debug!(
        "Sweep over {} intervals found {} overlapping pairs",
        intervals.len(),
        pairs.len()
    );
    pairs
}

/// Whether any two intervals overlap. Stops at the first overlap found.
pub fn has_any_overlap(intervals: &[TimeInterval]) -> bool {
    sweep(intervals, |_| ControlFlow::Break(())).is_break()
}

fn sweep<F>(intervals: &[TimeInterval], mut on_pair: F) -> ControlFlow<()>
where
    F: FnMut(OverlapPair) -> ControlFlow<()>,
{
    let mut boundaries = Vec::with_capacity(intervals.len() * 2);
    for (interval_index, interval) in intervals.iter().enumerate() {
        boundaries.push(TimeBoundary {
            time_ms: interval.start_ms(),
            kind: BoundaryKind::Start,
            interval_index,
        });
        boundaries.push(TimeBoundary {
            time_ms: interval.end_ms(),
            kind: BoundaryKind::End,
            interval_index,
        });
    }
    boundaries.sort_unstable();

    let mut open: BTreeSet<usize> = BTreeSet::new();
    for boundary in boundaries {
        match boundary.kind {
            BoundaryKind::Start => {
                for &other in &open {
                    on_pair(OverlapPair::new(other, boundary.interval_index))?;
                }
                open.insert(boundary.interval_index);
            }
            BoundaryKind::End => {
                open.remove(&boundary.interval_index);
            }
        }
    }

    ControlFlow::Continue(())
}
