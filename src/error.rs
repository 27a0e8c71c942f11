//! Error types for calendar computation.
//!
//! Conflicts and occurrence-cap truncation are ordinary results and never
//! appear here; see [`ConflictReport`](crate::conflict::ConflictReport) and
//! [`Expansion`](crate::recurrence::Expansion).

use thiserror::Error;

/// Result type for calendar operations.
pub type Result<T> = std::result::Result<T, CalendarError>;

/// Errors surfaced by the calendar core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    /// Recurrence text could not be parsed or validated.
    #[error("Malformed recurrence rule on seed '{seed_id}': {reason}")]
    MalformedRecurrenceRule { seed_id: String, reason: String },

    /// An interval whose end is not after its start.
    #[error("Invalid interval: end {end_ms} is not after start {start_ms}")]
    InvalidInterval { start_ms: i64, end_ms: i64 },

    /// Configuration could not be loaded.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CalendarError {
    pub(crate) fn malformed(seed_id: impl Into<String>, reason: impl ToString) -> Self {
        Self::MalformedRecurrenceRule {
            seed_id: seed_id.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<toml::de::Error> for CalendarError {
    fn from(err: toml::de::Error) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}
