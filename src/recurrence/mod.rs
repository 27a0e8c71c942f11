//! Recurrence expansion.
//!
//! Turns a seed plus a query window into concrete, timezone-correct
//! occurrences.
//!
//! # Termination
//!
//! | Rule | Enumerated | Then |
//! |------|------------|------|
//! | none | the seed itself | filtered to the window |
//! | `COUNT` / `UNTIL` | the whole series | filtered to the window |
//! | unterminated | up to `min(window.to, horizon)` | filtered to the window |
//!
//! Expansion is also capped at
//! [`ExpansionConfig::max_occurrences`](crate::config::ExpansionConfig):
//! positions in the series for terminated rules, occurrences in the window
//! for unterminated ones. Hitting the cap sets [`Expansion::truncated`].
//!
//! Frequencies finer than `DAILY` are rejected; every occurrence takes the
//! seed's time of day.
//!
//! # Reference
//! RFC 5545, Section 3.3.10 (Recurrence Rule)

mod expander;
mod rule;

pub use expander::{Expander, Expansion};
pub use rule::RecurrenceRule;
