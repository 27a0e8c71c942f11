//! Seed expansion into concrete occurrences.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::RecurrenceRule;
use crate::config::ExpansionConfig;
use crate::error::{CalendarError, Result};
use crate::models::{ConcreteOccurrence, OccurrenceSeed, TimeWindow};

/// Output of an expansion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expansion {
    /// Occurrences in the window, sorted by start.
    pub occurrences: Vec<ConcreteOccurrence>,
    /// `true` if the occurrence cap stopped enumeration early.
    pub truncated: bool,
}

impl Expansion {
    /// Number of occurrences.
    pub fn len(&self) -> usize {
        self.occurrences.len()
    }

    /// Whether no occurrence fell in the window.
    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }

    /// Consumes the expansion, returning the occurrences.
    pub fn into_occurrences(self) -> Vec<ConcreteOccurrence> {
        self.occurrences
    }
}

/// Expands seeds into occurrences.
///
/// The reference date for the horizon policy is explicit, so the same
/// `(seed, window)` always yields the same output for one expander.
///
/// # Example
///
/// ```
/// use chrono::{Duration, NaiveDate, TimeZone, Utc};
/// use tutor_calendar::config::ExpansionConfig;
/// use tutor_calendar::models::{OccurrenceSeed, TimeWindow};
/// use tutor_calendar::recurrence::Expander;
///
/// let start = Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0).unwrap(); // Monday
/// let seed = OccurrenceSeed::new("lesson", start, start + Duration::hours(1), chrono_tz::UTC)
///     .unwrap()
///     .with_recurrence("FREQ=WEEKLY");
///
/// let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
/// let expander = Expander::new(ExpansionConfig::default(), today);
/// let window = TimeWindow::new(start, start + Duration::days(20));
///
/// let expansion = expander.expand(&seed, &window).unwrap();
/// assert_eq!(expansion.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct Expander {
    config: ExpansionConfig,
    today: NaiveDate,
}

impl Expander {
    /// Creates an expander with an explicit reference date.
    pub fn new(config: ExpansionConfig, today: NaiveDate) -> Self {
        Self { config, today }
    }

    /// Creates an expander whose reference date is today (UTC).
    pub fn from_clock(config: ExpansionConfig) -> Self {
        Self::new(config, Utc::now().date_naive())
    }

    /// The active configuration.
    pub fn config(&self) -> &ExpansionConfig {
        &self.config
    }

    /// Horizon end for unterminated rules, as an instant in `timezone`.
    ///
    /// `None` if the policy overflows the representable calendar.
    pub fn horizon_end(&self, timezone: Tz) -> Option<DateTime<Utc>> {
        self.config
            .horizon
            .end_after(self.today)
            .map(|civil| resolve_local(timezone, civil))
    }

    /// Expands one seed over a window.
    ///
    /// # Errors
    /// - `InvalidInterval` if the seed's end is not after its start.
    /// - `MalformedRecurrenceRule` if the recurrence text does not parse
    ///   or recurs more often than daily.
    pub fn expand(&self, seed: &OccurrenceSeed, window: &TimeWindow) -> Result<Expansion> {
        seed.interval()?;

        let Some(text) = seed.recurrence.as_deref() else {
            let mut expansion = Expansion::default();
            if window.intersects(seed.start, seed.end) {
                expansion.occurrences.push(ConcreteOccurrence::new(
                    seed.id.clone(),
                    0,
                    seed.start,
                    seed.end,
                    seed.timezone,
                ));
            }
            return Ok(expansion);
        };

        let rule =
            RecurrenceRule::parse(text).map_err(|reason| CalendarError::malformed(&seed.id, reason))?;
        let set = rule
            .anchored_at(seed)
            .map_err(|reason| CalendarError::malformed(&seed.id, reason))?;

        // Terminated series are enumerated in full; unterminated ones stop at
        // the window end or the horizon, whichever comes first.
        let stop_after = if rule.is_terminated() {
            None
        } else {
            Some(match self.horizon_end(seed.timezone) {
                Some(horizon) if horizon <= window.to => StopAt::Before(horizon),
                _ => StopAt::After(window.to),
            })
        };

        let duration = seed.duration();
        let wall_clock = seed.local_start_time();
        let max = self.config.max_occurrences;
        let mut expansion = Expansion::default();
        let mut position = 0usize;
        let mut previous: Option<DateTime<Utc>> = None;

        for generated in &set {
            let date = generated.with_timezone(&seed.timezone).date_naive();
            let start = resolve_local(seed.timezone, date.and_time(wall_clock));
            // Several instants on one civil date collapse to one occurrence.
            if previous == Some(start) {
                continue;
            }
            previous = Some(start);

            if stop_after.is_some_and(|stop| stop.reached(start)) {
                break;
            }

            let index = position;
            position += 1;

            // Terminated series count their whole lifetime toward the cap;
            // unterminated ones only what lands in the window.
            if stop_after.is_none() && index >= max {
                expansion.truncated = true;
                break;
            }

            let end = start + duration;
            if window.intersects(start, end) {
                if expansion.occurrences.len() >= max {
                    expansion.truncated = true;
                    break;
                }
                expansion.occurrences.push(ConcreteOccurrence::new(
                    seed.id.clone(),
                    index,
                    start,
                    end,
                    seed.timezone,
                ));
            }
        }

        expansion
            .occurrences
            .sort_by(|a, b| a.start.cmp(&b.start).then(a.occurrence_index.cmp(&b.occurrence_index)));

        if expansion.truncated {
            warn!(
                "Expansion of seed '{}' truncated at {} occurrences",
                seed.id, self.config.max_occurrences
            );
        }
        debug!(
            "Expanded seed '{}' into {} occurrences in window",
            seed.id,
            expansion.len()
        );

        Ok(expansion)
    }

    /// Expands many seeds over one window.
    ///
    /// Occurrences are merged and sorted by `(start, seed_id, occurrence_index)`;
    /// `truncated` is set if any seed was truncated. The first failing seed
    /// aborts the whole call.
    pub fn expand_all(&self, seeds: &[OccurrenceSeed], window: &TimeWindow) -> Result<Expansion> {
        let mut merged = Expansion::default();
        for seed in seeds {
            let expansion = self.expand(seed, window)?;
            merged.truncated |= expansion.truncated;
            merged.occurrences.extend(expansion.occurrences);
        }

        merged.occurrences.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then_with(|| a.seed_id.cmp(&b.seed_id))
                .then(a.occurrence_index.cmp(&b.occurrence_index))
        });
        Ok(merged)
    }
}

#[derive(Debug, Clone, Copy)]
enum StopAt {
    /// Exclusive bound.
    Before(DateTime<Utc>),
    /// Inclusive bound.
    After(DateTime<Utc>),
}

impl StopAt {
    fn reached(self, start: DateTime<Utc>) -> bool {
        match self {
            StopAt::Before(bound) => start >= bound,
            StopAt::After(bound) => start > bound,
        }
    }
}

/// Resolves a civil date-time in `timezone` to an instant.
///
/// Ambiguous times (DST fall-back) take the earlier instant. Nonexistent
/// times (DST spring-forward gap) move one hour later.
fn resolve_local(timezone: Tz, civil: NaiveDateTime) -> DateTime<Utc> {
    match timezone.from_local_datetime(&civil) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => match timezone
            .from_local_datetime(&(civil + Duration::hours(1)))
            .earliest()
        {
            Some(dt) => dt.with_timezone(&Utc),
            None => {
                warn!(
                    "Local time {} does not exist in {}; reading it as UTC",
                    civil,
                    timezone.name()
                );
                Utc.from_utc_datetime(&civil)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HorizonPolicy, DEFAULT_MAX_OCCURRENCES};
    use chrono::{Datelike, Timelike, Weekday};

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn hour_seed(id: &str, start: DateTime<Utc>, tz: Tz) -> OccurrenceSeed {
        OccurrenceSeed::new(id, start, start + Duration::hours(1), tz).unwrap()
    }

    fn expander() -> Expander {
        Expander::new(ExpansionConfig::default(), date(2025, 1, 1))
    }

    #[test]
    fn test_non_recurring_round_trip() {
        let seed = hour_seed("single", utc(2025, 2, 3, 14, 0), chrono_tz::UTC);

        let inside = TimeWindow::new(utc(2025, 2, 1, 0, 0), utc(2025, 2, 28, 0, 0));
        let expansion = expander().expand(&seed, &inside).unwrap();
        assert_eq!(expansion.len(), 1);
        let occ = &expansion.occurrences[0];
        assert_eq!(occ.start, seed.start);
        assert_eq!(occ.end, seed.end);
        assert_eq!(occ.occurrence_index, 0);
        assert_eq!(occ.day_key, "2025-02-03");

        let outside = TimeWindow::new(utc(2025, 3, 1, 0, 0), utc(2025, 3, 31, 0, 0));
        assert!(expander().expand(&seed, &outside).unwrap().is_empty());
    }

    #[test]
    fn test_weekly_three_week_window() {
        // Monday 2025-01-06 09:00, weekly, no termination.
        let seed = hour_seed("weekly", utc(2025, 1, 6, 9, 0), chrono_tz::UTC).with_recurrence("FREQ=WEEKLY");
        let window = TimeWindow::new(utc(2025, 1, 6, 0, 0), utc(2025, 1, 26, 23, 59));

        let expansion = expander().expand(&seed, &window).unwrap();
        assert_eq!(expansion.len(), 3);
        assert!(!expansion.truncated);

        let keys: Vec<&str> = expansion.occurrences.iter().map(|o| o.day_key.as_str()).collect();
        assert_eq!(keys, vec!["2025-01-06", "2025-01-13", "2025-01-20"]);
        for (i, occ) in expansion.occurrences.iter().enumerate() {
            assert_eq!(occ.occurrence_index, i);
            assert_eq!(occ.start.weekday(), Weekday::Mon);
            assert_eq!((occ.start.hour(), occ.start.minute()), (9, 0));
            assert_eq!(occ.end - occ.start, Duration::hours(1));
        }
    }

    #[test]
    fn test_expansion_is_deterministic() {
        let seed = hour_seed("s", utc(2025, 1, 6, 16, 30), chrono_tz::Europe::London)
            .with_recurrence("FREQ=WEEKLY;BYDAY=MO,TH");
        let window = TimeWindow::new(utc(2025, 1, 1, 0, 0), utc(2025, 6, 30, 0, 0));

        let first = expander().expand(&seed, &window).unwrap();
        let second = expander().expand(&seed, &window).unwrap();
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_horizon_caps_unterminated_rule() {
        let seed = hour_seed("daily", utc(2026, 10, 19, 9, 0), chrono_tz::UTC).with_recurrence("FREQ=DAILY");
        let window = TimeWindow::new(utc(2026, 10, 19, 0, 0), utc(2076, 10, 19, 0, 0));
        let expander = Expander::new(ExpansionConfig::default(), date(2026, 10, 19));

        let expansion = expander.expand(&seed, &window).unwrap();
        let horizon = expander.horizon_end(chrono_tz::UTC).unwrap();
        assert_eq!(horizon, utc(2028, 1, 1, 0, 0));

        // Oct 19 2026 through Dec 31 2027.
        let expected = (date(2028, 1, 1) - date(2026, 10, 19)).num_days() as usize;
        assert_eq!(expansion.len(), expected);
        assert!(!expansion.truncated);
        assert!(expansion.occurrences.iter().all(|o| o.start < horizon));
    }

    #[test]
    fn test_configured_horizon() {
        let seed = hour_seed("monthly", utc(2025, 1, 15, 9, 0), chrono_tz::UTC)
            .with_recurrence("FREQ=MONTHLY");
        let window = TimeWindow::new(utc(2025, 1, 1, 0, 0), utc(2100, 1, 1, 0, 0));
        let config = ExpansionConfig::new().with_horizon(HorizonPolicy::YearsAhead(3));
        let expander = Expander::new(config, date(2025, 1, 1));

        // Jan 2025 through Dec 2028.
        assert_eq!(expander.expand(&seed, &window).unwrap().len(), 48);
    }

    #[test]
    fn test_count_indexes_full_sequence() {
        let seed = hour_seed("count", utc(2025, 1, 1, 9, 0), chrono_tz::UTC).with_recurrence("FREQ=DAILY;COUNT=5");
        let window = TimeWindow::new(utc(2025, 1, 3, 0, 0), utc(2025, 1, 4, 23, 0));

        let expansion = expander().expand(&seed, &window).unwrap();
        let indices: Vec<usize> = expansion.occurrences.iter().map(|o| o.occurrence_index).collect();
        assert_eq!(indices, vec![2, 3]);
    }

    #[test]
    fn test_terminated_rule_ignores_horizon() {
        // COUNT reaches past the default horizon (end of 2026).
        let seed = hour_seed("yearly", utc(2025, 6, 1, 9, 0), chrono_tz::UTC)
            .with_recurrence("FREQ=YEARLY;COUNT=5");
        let window = TimeWindow::new(utc(2025, 1, 1, 0, 0), utc(2040, 1, 1, 0, 0));

        let expansion = expander().expand(&seed, &window).unwrap();
        assert_eq!(expansion.len(), 5);
        assert_eq!(expansion.occurrences[4].day_key, "2029-06-01");
    }

    #[test]
    fn test_until_termination() {
        let seed = hour_seed("until", utc(2025, 1, 6, 9, 0), chrono_tz::UTC)
            .with_recurrence("FREQ=DAILY;UNTIL=20250110T235959Z");
        let window = TimeWindow::new(utc(2025, 1, 1, 0, 0), utc(2025, 12, 31, 0, 0));

        let expansion = expander().expand(&seed, &window).unwrap();
        assert_eq!(expansion.len(), 5); // Jan 6..=10
    }

    #[test]
    fn test_wall_clock_survives_dst() {
        // New York switches to DST on 2025-03-09.
        let tz = chrono_tz::America::New_York;
        let seed = hour_seed("ny", utc(2025, 3, 3, 14, 0), tz) // 09:00 EST
            .with_recurrence("FREQ=WEEKLY;COUNT=3");
        let window = TimeWindow::new(utc(2025, 3, 1, 0, 0), utc(2025, 3, 31, 0, 0));

        let expansion = expander().expand(&seed, &window).unwrap();
        assert_eq!(expansion.len(), 3);
        for occ in &expansion.occurrences {
            assert_eq!(occ.start.with_timezone(&tz).hour(), 9);
            assert_eq!(occ.end - occ.start, Duration::hours(1));
        }
        assert_eq!(expansion.occurrences[0].start.hour(), 14);
        assert_eq!(expansion.occurrences[1].start.hour(), 13); // 09:00 EDT
    }

    #[test]
    fn test_resolve_local_gap_and_overlap() {
        let tz = chrono_tz::America::New_York;
        // 02:30 does not exist on 2025-03-09; it moves to 03:30 EDT.
        let gap = date(2025, 3, 9).and_hms_opt(2, 30, 0).unwrap();
        assert_eq!(resolve_local(tz, gap), utc(2025, 3, 9, 7, 30));
        // 01:30 happens twice on 2025-11-02; the EDT reading comes first.
        let twice = date(2025, 11, 2).and_hms_opt(1, 30, 0).unwrap();
        assert_eq!(resolve_local(tz, twice), utc(2025, 11, 2, 5, 30));
    }

    #[test]
    fn test_byday_and_interval() {
        let seed = hour_seed("mw", utc(2025, 1, 6, 9, 0), chrono_tz::UTC)
            .with_recurrence("FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,WE");
        let window = TimeWindow::new(utc(2025, 1, 1, 0, 0), utc(2025, 1, 31, 0, 0));

        let expansion = expander().expand(&seed, &window).unwrap();
        let keys: Vec<&str> = expansion.occurrences.iter().map(|o| o.day_key.as_str()).collect();
        assert_eq!(keys, vec!["2025-01-06", "2025-01-08", "2025-01-20", "2025-01-22"]);
    }

    #[test]
    fn test_day_key_in_seed_timezone() {
        // 23:00 UTC Sunday is already Monday in Tokyo.
        let seed = hour_seed("tokyo", utc(2025, 1, 5, 23, 0), chrono_tz::Asia::Tokyo)
            .with_recurrence("FREQ=DAILY;COUNT=2");
        let window = TimeWindow::new(utc(2025, 1, 1, 0, 0), utc(2025, 1, 31, 0, 0));

        let expansion = expander().expand(&seed, &window).unwrap();
        assert_eq!(expansion.occurrences[0].day_key, "2025-01-06");
        assert_eq!(expansion.occurrences[1].day_key, "2025-01-07");
    }

    #[test]
    fn test_malformed_rule() {
        let seed = hour_seed("bad", utc(2025, 1, 6, 9, 0), chrono_tz::UTC).with_recurrence("FREQ=SOMETIMES");
        let window = TimeWindow::new(utc(2025, 1, 1, 0, 0), utc(2025, 1, 31, 0, 0));

        let err = expander().expand(&seed, &window).unwrap_err();
        assert!(matches!(
            err,
            CalendarError::MalformedRecurrenceRule { ref seed_id, .. } if seed_id == "bad"
        ));
    }

    #[test]
    fn test_inverted_seed_rejected() {
        let mut seed = hour_seed("inv", utc(2025, 1, 6, 9, 0), chrono_tz::UTC);
        seed.end = seed.start - Duration::minutes(5);
        let window = TimeWindow::new(utc(2025, 1, 1, 0, 0), utc(2025, 1, 31, 0, 0));

        assert!(matches!(
            expander().expand(&seed, &window),
            Err(CalendarError::InvalidInterval { .. })
        ));
    }

    #[test]
    fn test_rule_outside_window_is_empty() {
        let seed = hour_seed("past", utc(2024, 1, 1, 9, 0), chrono_tz::UTC).with_recurrence("FREQ=DAILY;COUNT=3");
        let window = TimeWindow::new(utc(2025, 1, 1, 0, 0), utc(2025, 1, 31, 0, 0));

        assert!(expander().expand(&seed, &window).unwrap().is_empty());
    }

    #[test]
    fn test_occurrence_cap_truncates() {
        let seed = hour_seed("many", utc(2025, 1, 1, 9, 0), chrono_tz::UTC).with_recurrence("FREQ=DAILY;COUNT=50");
        let window = TimeWindow::new(utc(2025, 1, 1, 0, 0), utc(2025, 12, 31, 0, 0));
        let expander = Expander::new(ExpansionConfig::new().with_max_occurrences(10), date(2025, 1, 1));

        let expansion = expander.expand(&seed, &window).unwrap();
        assert!(expansion.truncated);
        assert_eq!(expansion.len(), 10);
    }

    #[test]
    fn test_long_running_series_fills_window() {
        // Over 11 000 daily steps before the window, well past the cap.
        let seed = hour_seed("old", utc(1995, 1, 2, 9, 0), chrono_tz::UTC).with_recurrence("FREQ=DAILY");
        let window = TimeWindow::new(utc(2026, 10, 19, 0, 0), utc(2026, 10, 25, 23, 59));
        let expander = Expander::new(ExpansionConfig::default(), date(2026, 10, 19));

        let expansion = expander.expand(&seed, &window).unwrap();
        assert_eq!(expansion.len(), 7);
        assert!(!expansion.truncated);

        let first_index = (date(2026, 10, 19) - date(1995, 1, 2)).num_days() as usize;
        assert!(first_index > DEFAULT_MAX_OCCURRENCES);
        assert_eq!(expansion.occurrences[0].occurrence_index, first_index);
        assert_eq!(expansion.occurrences[6].occurrence_index, first_index + 6);
    }

    #[test]
    fn test_unterminated_cap_counts_window_only() {
        let seed = hour_seed("daily", utc(2025, 1, 1, 9, 0), chrono_tz::UTC).with_recurrence("FREQ=DAILY");
        let window = TimeWindow::new(utc(2025, 6, 1, 0, 0), utc(2025, 6, 30, 23, 0));
        let expander = Expander::new(ExpansionConfig::new().with_max_occurrences(10), date(2025, 1, 1));

        let expansion = expander.expand(&seed, &window).unwrap();
        assert!(expansion.truncated);
        assert_eq!(expansion.len(), 10);
        assert_eq!(expansion.occurrences[0].day_key, "2025-06-01");
    }

    #[test]
    fn test_sub_daily_frequency_rejected() {
        let seed = hour_seed("hourly", utc(2025, 1, 6, 9, 0), chrono_tz::UTC)
            .with_recurrence("FREQ=HOURLY;COUNT=5");
        let window = TimeWindow::new(utc(2025, 1, 1, 0, 0), utc(2025, 1, 31, 0, 0));

        assert!(matches!(
            expander().expand(&seed, &window),
            Err(CalendarError::MalformedRecurrenceRule { .. })
        ));
    }

    #[test]
    fn test_same_day_instants_collapse() {
        // BYHOUR yields 09:00 and 15:00; both take the seed's 09:00.
        let seed = hour_seed("twice", utc(2025, 1, 6, 9, 0), chrono_tz::UTC)
            .with_recurrence("FREQ=DAILY;COUNT=3;BYHOUR=9,15");
        let window = TimeWindow::new(utc(2025, 1, 1, 0, 0), utc(2025, 1, 31, 0, 0));

        let expansion = expander().expand(&seed, &window).unwrap();
        let found: Vec<(usize, &str)> = expansion
            .occurrences
            .iter()
            .map(|o| (o.occurrence_index, o.day_key.as_str()))
            .collect();
        assert_eq!(found, vec![(0, "2025-01-06"), (1, "2025-01-07")]);
    }

    #[test]
    fn test_expand_all_merges_sorted() {
        let a = hour_seed("a", utc(2025, 1, 6, 10, 0), chrono_tz::UTC).with_recurrence("FREQ=DAILY;COUNT=2");
        let b = hour_seed("b", utc(2025, 1, 6, 9, 0), chrono_tz::UTC);
        let window = TimeWindow::new(utc(2025, 1, 1, 0, 0), utc(2025, 1, 31, 0, 0));

        let merged = expander().expand_all(&[a, b], &window).unwrap();
        let order: Vec<(&str, usize)> = merged
            .occurrences
            .iter()
            .map(|o| (o.seed_id.as_str(), o.occurrence_index))
            .collect();
        assert_eq!(order, vec![("b", 0), ("a", 0), ("a", 1)]);
        assert!(!merged.truncated);
    }

    #[test]
    fn test_expand_all_propagates_errors() {
        let good = hour_seed("good", utc(2025, 1, 6, 9, 0), chrono_tz::UTC);
        let bad = hour_seed("bad", utc(2025, 1, 6, 9, 0), chrono_tz::UTC).with_recurrence("garbage");
        let window = TimeWindow::new(utc(2025, 1, 1, 0, 0), utc(2025, 1, 31, 0, 0));

        assert!(expander().expand_all(&[good, bad], &window).is_err());
    }
}
