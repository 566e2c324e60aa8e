//! Next-occurrence calculation for recurrence rules.
//!
//! [`next_occurrence`] is total: it returns a date for every input,
//! falling back to the reference date where a rule cannot produce one.
//! [`next_due`] resolves competing periods and reports "nothing to
//! schedule" as `None`.

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc};

use plantcare_model::recurrence::YEARLY_SEARCH_YEARS;
use plantcare_model::{DayOfYear, Period, RecurrenceRule};

/// Computes the first occurrence of `rule` after `reference`.
///
/// - `Daily`: `reference` plus N days, keeping the time of day.
/// - `Weekly`: `reference` plus N weeks, then the first later day on the
///   rule's weekday (1 = Sunday), at midnight.
/// - `Monthly`: midnight on the 1st of the next listed month.
/// - `Yearly`: midnight on the next listed `(day, month)` that exists.
///
/// Monthly and yearly rules with nothing usable return `reference`
/// unchanged; check [`RecurrenceRule::is_degenerate`] to detect that.
#[must_use]
pub fn next_occurrence(reference: DateTime<Utc>, rule: &RecurrenceRule) -> DateTime<Utc> {
    match rule {
        RecurrenceRule::Daily { every_n_days } => {
            add_days(reference, u64::from((*every_n_days).max(1)))
        }
        RecurrenceRule::Weekly {
            every_n_weeks,
            weekday,
        } => next_weekly(reference, (*every_n_weeks).max(1), *weekday),
        RecurrenceRule::Monthly { months, .. } => next_monthly(reference, months),
        RecurrenceRule::Yearly { dates } => next_yearly(reference, dates),
    }
}

/// Returns the earliest next occurrence across `periods`.
///
/// Degenerate periods are ignored. Returns `None` when no period can
/// produce an occurrence, including when `periods` is empty.
#[must_use]
pub fn next_due(reference: DateTime<Utc>, periods: &[Period]) -> Option<DateTime<Utc>> {
    periods
        .iter()
        .filter(|p| !p.rule.is_degenerate())
        .map(|p| next_occurrence(reference, &p.rule))
        .min()
}

/// Returns the first occurrence of `rule`, counting from `start`, that is
/// not before `not_before`.
///
/// Occurrences are chained: each one is the reference for the next. The
/// first candidate is always strictly after `start`. Returns `None` for
/// degenerate rules and when the chain stops advancing (date overflow).
#[must_use]
pub fn next_occurrence_on_or_after(
    start: DateTime<Utc>,
    rule: &RecurrenceRule,
    not_before: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    if rule.is_degenerate() {
        return None;
    }
    let mut reference = start;
    loop {
        let next = next_occurrence(reference, rule);
        if next <= reference {
            return None;
        }
        if next >= not_before {
            return Some(next);
        }
        reference = next;
    }
}

/// [`next_due`] rolled forward: the earliest occurrence across `periods`,
/// counting from `start`, that is not before `not_before`.
#[must_use]
pub fn next_due_on_or_after(
    start: DateTime<Utc>,
    periods: &[Period],
    not_before: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    periods
        .iter()
        .filter_map(|p| next_occurrence_on_or_after(start, &p.rule, not_before))
        .min()
}

fn add_days(reference: DateTime<Utc>, days: u64) -> DateTime<Utc> {
    reference
        .checked_add_days(Days::new(days))
        .unwrap_or(reference)
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn next_weekly(reference: DateTime<Utc>, every_n_weeks: u32, weekday: u8) -> DateTime<Utc> {
    let advanced = add_days(reference, u64::from(every_n_weeks) * 7);
    let advanced_day = advanced.date_naive();

    // A full week always contains a match for a valid weekday.
    for offset in 1..=7 {
        let Some(candidate) = advanced_day.checked_add_days(Days::new(offset)) else {
            break;
        };
        if candidate.weekday().num_days_from_sunday() + 1 == u32::from(weekday) {
            return start_of_day(candidate);
        }
    }
    advanced
}

fn next_monthly(reference: DateTime<Utc>, months: &BTreeSet<u8>) -> DateTime<Utc> {
    let year = reference.year();
    months
        .iter()
        .filter_map(|&month| {
            let first_after = |y: i32| {
                NaiveDate::from_ymd_opt(y, u32::from(month), 1)
                    .map(start_of_day)
                    .filter(|candidate| *candidate > reference)
            };
            first_after(year).or_else(|| first_after(year + 1))
        })
        .min()
        .unwrap_or(reference)
}

fn next_yearly(reference: DateTime<Utc>, dates: &BTreeSet<DayOfYear>) -> DateTime<Utc> {
    let year = reference.year();
    dates
        .iter()
        .filter_map(|date| {
            (year..=year + YEARLY_SEARCH_YEARS)
                .filter_map(|y| date.in_year(y).map(start_of_day))
                .find(|candidate| *candidate > reference)
        })
        .min()
        .unwrap_or(reference)
}
