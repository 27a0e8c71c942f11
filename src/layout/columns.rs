//! Cluster detection and greedy column assignment on raw spans.
//!
//! # Algorithm
//! 1. Visit spans by start time, tracking the latest end of the open cluster.
//!    A span starting at or after that end closes the cluster.
//! 2. Inside a cluster, place each span in the lowest column whose last end
//!    is `<=` its start, or open a new column.
//! 3. When a cluster closes, every member gets `total_columns` = columns opened.
//!
//! Greedy coloring in start order is optimal for interval graphs, so the
//! column count equals the peak concurrency of the cluster.
//!
//! # Reference
//! Golumbic (2004), "Algorithmic Graph Theory and Perfect Graphs", Ch. 8

use serde::{Deserialize, Serialize};

/// Column placement of one span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSlot {
    /// Column, in `[0, total_columns)`.
    pub column_index: usize,
    /// Columns shared by the span's cluster.
    pub total_columns: usize,
}

impl ColumnSlot {
    const SOLO: ColumnSlot = ColumnSlot {
        column_index: 0,
        total_columns: 1,
    };
}

#[derive(Debug, Default)]
struct OpenCluster {
    members: Vec<usize>,
    column_ends: Vec<i64>,
    end_ms: i64,
}

impl OpenCluster {
    fn place(&mut self, index: usize, start_ms: i64, end_ms: i64) -> usize {
        let column = match self.column_ends.iter().position(|&end| end <= start_ms) {
            Some(free) => {
                self.column_ends[free] = end_ms;
                free
            }
            None => {
                self.column_ends.push(end_ms);
                self.column_ends.len() - 1
            }
        };
        if self.members.is_empty() || end_ms > self.end_ms {
            self.end_ms = end_ms;
        }
        self.members.push(index);
        column
    }

    fn close(&mut self, slots: &mut [ColumnSlot]) -> bool {
        if self.members.is_empty() {
            return false;
        }
        let total = self.column_ends.len();
        for &member in &self.members {
            slots[member].total_columns = total;
        }
        self.members.clear();
        self.column_ends.clear();
        true
    }
}

/// Lays out `(start_ms, end_ms)` spans. The result is in input order.
///
/// Empty or inverted spans get a solo slot and never join a cluster.
pub(crate) fn assign_columns(spans: &[(i64, i64)]) -> Vec<ColumnSlot> {
    let mut order: Vec<usize> = (0..spans.len()).collect();
    order.sort_by_key(|&i| (spans[i].0, i));

    let mut slots = vec![ColumnSlot::SOLO; spans.len()];
    let mut cluster = OpenCluster::default();
    let mut clusters = 0usize;

    for index in order {
        let (start_ms, end_ms) = spans[index];
        if end_ms <= start_ms {
            clusters += 1;
            continue;
        }
        if !cluster.members.is_empty() && start_ms >= cluster.end_ms && cluster.close(&mut slots) {
            clusters += 1;
        }
        slots[index].column_index = cluster.place(index, start_ms, end_ms);
    }
    if cluster.close(&mut slots) {
        clusters += 1;
    }

    log::debug!("Laid out {} spans in {} clusters", spans.len(), clusters);
    slots
}
