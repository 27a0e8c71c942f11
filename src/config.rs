//! Expansion configuration.
//!
//! Controls how far unterminated recurrence rules are enumerated and the
//! hard cap on generated occurrences per seed.
//!
//! # TOML
//!
//! ```
//! use tutor_calendar::config::{ExpansionConfig, HorizonPolicy};
//!
//! let config = ExpansionConfig::from_toml_str(
//!     r#"
//!     max_occurrences = 500
//!     horizon = { years_ahead = 2 }
//!     "#,
//! ).unwrap();
//! assert_eq!(config.max_occurrences, 500);
//! assert_eq!(config.horizon, HorizonPolicy::YearsAhead(2));
//! ```

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{CalendarError, Result};

/// Default cap on occurrences generated for one seed.
pub const DEFAULT_MAX_OCCURRENCES: usize = 10_000;

/// Where expansion of an unterminated rule stops, relative to a reference date.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HorizonPolicy {
    /// Midnight ending December 31st of the year after the reference date.
    #[default]
    EndOfNextCalendarYear,
    /// Midnight ending December 31st, `n` years after the reference date.
    YearsAhead(u32),
}

impl HorizonPolicy {
    /// Civil date-time (exclusive) at which the horizon ends.
    ///
    /// Returns `None` if the resulting year is outside chrono's range.
    pub fn end_after(&self, today: NaiveDate) -> Option<NaiveDateTime> {
        use chrono::Datelike;

        let years = match self {
            HorizonPolicy::EndOfNextCalendarYear => 1,
            HorizonPolicy::YearsAhead(n) => i32::try_from(*n).ok()?,
        };
        let year = today.year().checked_add(years)?.checked_add(1)?;
        NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0)
    }
}

/// Recurrence expansion settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExpansionConfig {
    /// Bound for rules without `UNTIL` or `COUNT`.
    pub horizon: HorizonPolicy,
    /// Cap per seed: series positions for `COUNT`/`UNTIL` rules, in-window
    /// occurrences otherwise.
    pub max_occurrences: usize,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            horizon: HorizonPolicy::default(),
            max_occurrences: DEFAULT_MAX_OCCURRENCES,
        }
    }
}

impl ExpansionConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the horizon policy.
    pub fn with_horizon(mut self, horizon: HorizonPolicy) -> Self {
        self.horizon = horizon;
        self
    }

    /// Sets the per-seed occurrence cap.
    pub fn with_max_occurrences(mut self, max: usize) -> Self {
        self.max_occurrences = max;
        self
    }

    /// Parses a configuration from TOML. Missing keys take default values.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        if config.max_occurrences == 0 {
            return Err(CalendarError::InvalidConfig(
                "max_occurrences must be at least 1".into(),
            ));
        }
        Ok(config)
    }
}
