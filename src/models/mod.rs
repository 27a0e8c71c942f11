//! Calendar domain models.
//!
//! Provides the data types shared by every component: checked intervals,
//! stored seeds, and the concrete occurrences generated from them.
//!
//! # Domain Mappings
//!
//! | tutor-calendar | Tutoring app | Generic calendar |
//! |----------------|--------------|------------------|
//! | OccurrenceSeed | Session / hub meeting | Event |
//! | ConcreteOccurrence | One lesson on one day | Event instance |
//! | TimeInterval | Booked slot | Busy block |
//! | TimeWindow | Visible calendar range | Query range |

mod interval;
mod occurrence;
mod seed;

pub use interval::{spans_overlap, TimeInterval, TimeWindow};
pub use occurrence::{day_key_for, ConcreteOccurrence, OccurrenceRef, DAY_KEY_FORMAT};
pub use seed::OccurrenceSeed;
