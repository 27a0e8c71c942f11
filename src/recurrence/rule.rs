//! RFC 5545 recurrence text handling.
//!
//! Parsing and occurrence generation are delegated to the `rrule` crate.
//! This module only normalizes the stored text and anchors it to a seed.

use chrono::{DateTime, Utc};
use rrule::{Frequency, RRule, RRuleSet, Unvalidated};

use crate::models::OccurrenceSeed;

const RRULE_PREFIX: &str = "RRULE:";
const DTSTART_PREFIX: &str = "DTSTART";

/// A syntactically valid recurrence rule.
///
/// Accepted text:
/// - a bare rule: `FREQ=WEEKLY;BYDAY=MO,WE`
/// - one or more `RRULE:` lines, optionally mixed with `EXDATE`/`RDATE` lines
///
/// `DTSTART` lines are dropped; the seed's first occurrence is the anchor.
/// Frequencies finer than `DAILY` are rejected.
///
/// # Examples
///
/// ```
/// use tutor_calendar::recurrence::RecurrenceRule;
///
/// let rule = RecurrenceRule::parse("RRULE:FREQ=DAILY;COUNT=3").unwrap();
/// assert!(rule.is_terminated());
/// assert_eq!(rule.count(), Some(3));
///
/// assert!(!RecurrenceRule::parse("FREQ=WEEKLY").unwrap().is_terminated());
/// assert!(RecurrenceRule::parse("FREQ=SOMETIMES").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    lines: Vec<String>,
    count: Option<u32>,
    until: Option<DateTime<Utc>>,
    terminated: bool,
}

impl RecurrenceRule {
    /// Parses recurrence text. The error is a human-readable reason.
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut lines = Vec::new();
        let mut count = None;
        let mut until = None;
        let mut rule_count = 0usize;
        let mut terminated_rules = 0usize;

        for raw in text.lines() {
            let line = raw.trim();
            if line.is_empty() || line.to_ascii_uppercase().starts_with(DTSTART_PREFIX) {
                continue;
            }

            let body = match strip_prefix_ignore_case(line, RRULE_PREFIX) {
                Some(body) => body,
                None if !line.contains(':') => line,
                None => {
                    // EXDATE, RDATE, EXRULE: handed to the parser untouched.
                    lines.push(line.to_string());
                    continue;
                }
            };

            let rule: RRule<Unvalidated> = body.parse().map_err(|e| format!("{e}"))?;
            // Occurrences keep the seed's time of day, so rules stepping
            // within a day have no meaningful expansion.
            if matches!(
                rule.get_freq(),
                Frequency::Hourly | Frequency::Minutely | Frequency::Secondly
            ) {
                return Err(format!("sub-daily frequency {:?} is not supported", rule.get_freq()));
            }
            rule_count += 1;
            if rule.get_count().is_some() || rule.get_until().is_some() {
                terminated_rules += 1;
            }
            count = count.or(rule.get_count());
            until = until.or(rule.get_until().map(|u| u.with_timezone(&Utc)));
            lines.push(format!("{RRULE_PREFIX}{body}"));
        }

        if rule_count == 0 {
            return Err("no RRULE found".into());
        }

        Ok(Self {
            lines,
            count,
            until,
            terminated: terminated_rules == rule_count,
        })
    }

    /// Whether every rule line carries `COUNT` or `UNTIL`.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// `COUNT` of the first rule line that has one.
    pub fn count(&self) -> Option<u32> {
        self.count
    }

    /// `UNTIL` of the first rule line that has one.
    pub fn until(&self) -> Option<DateTime<Utc>> {
        self.until
    }

    /// Anchors the rule at the seed's first occurrence, in the seed's zone.
    ///
    /// Stepping happens on wall-clock time in that zone, so occurrences keep
    /// their local time across DST changes.
    pub(crate) fn anchored_at(&self, seed: &OccurrenceSeed) -> Result<RRuleSet, String> {
        let local = seed.local_start();
        let mut text = format!(
            "{DTSTART_PREFIX};TZID={}:{}",
            seed.timezone.name(),
            local.format("%Y%m%dT%H%M%S")
        );
        for line in &self.lines {
            text.push('\n');
            text.push_str(line);
        }
        text.parse::<RRuleSet>().map_err(|e| format!("{e}"))
    }
}

fn strip_prefix_ignore_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &line[prefix.len()..])
}
