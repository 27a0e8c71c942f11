//! Conflict detection between bookings.
//!
//! Provides a sweep-line overlap finder over half-open intervals and the
//! write-time booking check built on it.
//!
//! # Usage
//!
//! ```
//! use tutor_calendar::conflict::{check_booking, ConflictSource};
//! use tutor_calendar::models::TimeInterval;
//!
//! let existing = vec![TimeInterval::try_new(0, 60).unwrap()];
//! let proposed = vec![TimeInterval::try_new(30, 90).unwrap()];
//!
//! let report = check_booking(&proposed, &existing);
//! assert_eq!(report.len(), 1);
//! assert_eq!(report.conflicts[0].source, ConflictSource::Existing);
//! ```
//!
//! # Reference
//! de Berg et al. (2008), "Computational Geometry", Ch. 2 (Plane Sweep)

mod booking;
mod sweep;

pub use booking::{check_booking, Conflict, ConflictReport, ConflictSource};
pub use sweep::{find_overlaps, has_any_overlap, OverlapPair};
