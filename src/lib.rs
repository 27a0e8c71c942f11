//! Calendar occurrence engine for tutoring schedules.
//!
//! Expands recurring sessions into concrete occurrences, detects booking
//! conflicts, groups occurrences by day, and lays out simultaneous
//! occurrences in columns for time-grid views. Every operation is a pure
//! function of its arguments; callers own caching and persistence.
//!
//! # Modules
//!
//! - **`models`**: Data types: `TimeInterval`, `TimeWindow`, `OccurrenceSeed`,
//!   `ConcreteOccurrence`
//! - **`recurrence`**: Seed + window → occurrences (RFC 5545 rules)
//! - **`conflict`**: Sweep-line overlap detection and booking checks
//! - **`index`**: Day key → occurrences
//! - **`layout`**: Column assignment per day
//! - **`validation`**: Seed integrity checks
//! - **`config`**: Expansion horizon and occurrence cap
//!
//! # Data Flow
//!
//! ```text
//! seeds ─▶ recurrence ─▶ index ─▶ layout ─▶ positioned occurrences
//!                 └──────▶ conflict (write path)
//! ```

pub mod config;
pub mod conflict;
pub mod error;
pub mod index;
pub mod layout;
pub mod models;
pub mod recurrence;
pub mod validation;

pub use error::{CalendarError, Result};
