//! Recurrence rules attached to task periods.
//!
//! A [`RecurrenceRule`] is a closed set of calendar cadences. Numeric
//! parameters are range-checked by the constructors and by
//! [`RecurrenceRule::validate`]; whether a `(day, month)` pair exists on a
//! real calendar is not checked at construction time.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Furthest number of years a yearly date is searched ahead.
///
/// Eight years always contains a leap year, so `(29, 2)` is reachable.
pub const YEARLY_SEARCH_YEARS: i32 = 8;

/// Errors produced when a recurrence rule's parameters are out of range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// An interval (`every N days/weeks`) was zero.
    #[error("interval must be at least 1")]
    ZeroInterval,
    /// Weekday outside `1..=7`.
    #[error("weekday {0} out of range (1 = Sunday ... 7 = Saturday)")]
    WeekdayOutOfRange(u8),
    /// Month outside `1..=12`.
    #[error("month {0} out of range (1..=12)")]
    MonthOutOfRange(u8),
    /// Day outside `1..=31`.
    #[error("day {0} out of range (1..=31)")]
    DayOutOfRange(u8),
}

/// A calendar day within a year, e.g. the 15th of March.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DayOfYear {
    /// Day of month, `1..=31`.
    pub day: u8,
    /// Month, `1..=12`.
    pub month: u8,
}

impl DayOfYear {
    /// Creates a range-checked day of year.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::DayOutOfRange`] or [`RuleError::MonthOutOfRange`].
    pub const fn new(day: u8, month: u8) -> Result<Self, RuleError> {
        if day < 1 || day > 31 {
            return Err(RuleError::DayOutOfRange(day));
        }
        if month < 1 || month > 12 {
            return Err(RuleError::MonthOutOfRange(month));
        }
        Ok(Self { day, month })
    }

    /// Returns the concrete date in `year`, or `None` if this day does not
    /// exist in that year (e.g. the 31st of February).
    #[must_use]
    pub fn in_year(self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, u32::from(self.month), u32::from(self.day))
    }

    /// Returns `true` if this day exists in at least one year of a
    /// leap-year cycle.
    #[must_use]
    pub fn exists_on_any_calendar(self) -> bool {
        // 2000 is a leap year, so (29, 2) is accepted here.
        self.in_year(2000).is_some()
    }
}

/// How often and on what calendar basis a task repeats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecurrenceRule {
    /// Every N days.
    Daily {
        /// Days between occurrences.
        every_n_days: u32,
    },
    /// Every N weeks on a given weekday.
    Weekly {
        /// Weeks between occurrences.
        every_n_weeks: u32,
        /// Weekday, 1 = Sunday ... 7 = Saturday.
        weekday: u8,
    },
    /// During the listed months.
    Monthly {
        /// Day cadence within the listed months.
        every_n_days: u32,
        /// Months, each `1..=12`.
        months: BTreeSet<u8>,
    },
    /// On fixed calendar days each year.
    Yearly {
        /// The calendar days the task falls on.
        dates: BTreeSet<DayOfYear>,
    },
}

impl RecurrenceRule {
    /// Every `every_n_days` days.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::ZeroInterval`] if `every_n_days` is zero.
    pub fn daily(every_n_days: u32) -> Result<Self, RuleError> {
        let rule = Self::Daily { every_n_days };
        rule.validate()?;
        Ok(rule)
    }

    /// Every `every_n_weeks` weeks on `weekday` (1 = Sunday).
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::ZeroInterval`] or [`RuleError::WeekdayOutOfRange`].
    pub fn weekly(every_n_weeks: u32, weekday: u8) -> Result<Self, RuleError> {
        let rule = Self::Weekly {
            every_n_weeks,
            weekday,
        };
        rule.validate()?;
        Ok(rule)
    }

    /// Every `every_n_days` days during `months`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::ZeroInterval`] or [`RuleError::MonthOutOfRange`].
    pub fn monthly(
        every_n_days: u32,
        months: impl IntoIterator<Item = u8>,
    ) -> Result<Self, RuleError> {
        let rule = Self::Monthly {
            every_n_days,
            months: months.into_iter().collect(),
        };
        rule.validate()?;
        Ok(rule)
    }

    /// On each of the given `(day, month)` pairs every year.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::DayOutOfRange`] or [`RuleError::MonthOutOfRange`].
    pub fn yearly(dates: impl IntoIterator<Item = (u8, u8)>) -> Result<Self, RuleError> {
        let dates = dates
            .into_iter()
            .map(|(day, month)| DayOfYear::new(day, month))
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self::Yearly { dates })
    }

    /// Checks every numeric parameter against its range.
    ///
    /// Rules arriving through deserialization bypass the constructors, so
    /// callers loading stored rules should run this.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range parameter found.
    pub fn validate(&self) -> Result<(), RuleError> {
        match self {
            Self::Daily { every_n_days } => {
                if *every_n_days == 0 {
                    return Err(RuleError::ZeroInterval);
                }
            }
            Self::Weekly {
                every_n_weeks,
                weekday,
            } => {
                if *every_n_weeks == 0 {
                    return Err(RuleError::ZeroInterval);
                }
                if !(1..=7).contains(weekday) {
                    return Err(RuleError::WeekdayOutOfRange(*weekday));
                }
            }
            Self::Monthly {
                every_n_days,
                months,
            } => {
                if *every_n_days == 0 {
                    return Err(RuleError::ZeroInterval);
                }
                if let Some(bad) = months.iter().find(|m| !(1..=12).contains(*m)) {
                    return Err(RuleError::MonthOutOfRange(*bad));
                }
            }
            Self::Yearly { dates } => {
                for date in dates {
                    DayOfYear::new(date.day, date.month)?;
                }
            }
        }
        Ok(())
    }

    /// Returns `true` if this rule can never produce an occurrence.
    ///
    /// That is a monthly rule with no months, or a yearly rule whose pairs
    /// are empty or all impossible calendar days.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        match self {
            Self::Daily { .. } | Self::Weekly { .. } => false,
            Self::Monthly { months, .. } => !months.iter().any(|m| (1..=12).contains(m)),
            Self::Yearly { dates } => !dates.iter().any(|d| d.exists_on_any_calendar()),
        }
    }
}
