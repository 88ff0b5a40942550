//! Recurrence engine for repeating tasks.
//!
//! Given a reference date ("now"), a task's anchor date and a recurrence
//! expression, computes the next date the task should occur on. Everything
//! here is pure: no clock reads, no I/O, no logging.
//!
//! # Example
//!
//! ```rust,ignore
//! use todo_api::scheduler::{date::parse_date, next_date};
//!
//! let now = parse_date("20240115").unwrap();
//! assert_eq!(next_date(now, "20240110", "d 3")?, "20240116");
//! ```

pub mod date;
pub mod rule;

pub use rule::{RecurrenceRule, RuleError};

use chrono::{Datelike, Days, NaiveDate};

/// Compute the next occurrence of `repeat` for a task anchored at `anchor`.
///
/// `anchor` must be a `YYYYMMDD` date; the result uses the same format.
pub fn next_date(reference: NaiveDate, anchor: &str, repeat: &str) -> Result<String, RuleError> {
    if repeat.trim().is_empty() {
        return Err(RuleError::EmptyRule);
    }
    let anchor_date =
        date::parse_date(anchor).ok_or_else(|| RuleError::InvalidDate(anchor.to_string()))?;
    let rule: RecurrenceRule = repeat.parse()?;
    let next = rule.next_after(reference, anchor_date)?;
    Ok(date::format_date(next))
}

impl RecurrenceRule {
    /// Next occurrence for a task anchored at `anchor`, judged against `reference`.
    ///
    /// - `d`: smallest `anchor + k*N` (k >= 1) not before `reference`
    /// - `y`: `anchor` plus whole years until not before `reference`, at least one year
    /// - `w`: first listed weekday strictly after `anchor`; `reference` is not consulted
    /// - `m`: first listed day (in list order) of the earliest month yielding a date
    ///   not before `reference`; days missing from a month are skipped for that month
    pub fn next_after(&self, reference: NaiveDate, anchor: NaiveDate) -> Result<NaiveDate, RuleError> {
        match self {
            Self::Interval(days) => next_interval(reference, anchor, u64::from(*days)),
            Self::Yearly => next_yearly(reference, anchor),
            Self::Weekly(weekdays) => next_weekly(anchor, weekdays),
            Self::Monthly(days) => next_monthly(reference, anchor, days),
        }
    }
}

fn next_interval(reference: NaiveDate, anchor: NaiveDate, step: u64) -> Result<NaiveDate, RuleError> {
    if step == 0 {
        return Err(RuleError::InvalidArgument {
            kind: "d",
            value: step.to_string(),
        });
    }
    let gap = u64::try_from((reference - anchor).num_days()).unwrap_or(0);
    // Smallest k >= 1 with k * step >= gap.
    let steps = gap.div_ceil(step).max(1);
    steps
        .checked_mul(step)
        .and_then(|days| anchor.checked_add_days(Days::new(days)))
        .ok_or(RuleError::DateOutOfRange)
}

fn next_yearly(reference: NaiveDate, anchor: NaiveDate) -> Result<NaiveDate, RuleError> {
    let mut current = add_year(anchor)?;
    while current < reference {
        current = add_year(current)?;
    }
    Ok(current)
}

/// Add one calendar year; Feb 29 rolls over to Mar 1 in a non-leap year.
fn add_year(date: NaiveDate) -> Result<NaiveDate, RuleError> {
    let year = date.year().checked_add(1).ok_or(RuleError::DateOutOfRange)?;
    NaiveDate::from_ymd_opt(year, date.month(), date.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
        .ok_or(RuleError::DateOutOfRange)
}

fn next_weekly(anchor: NaiveDate, weekdays: &[u32]) -> Result<NaiveDate, RuleError> {
    if weekdays.is_empty() {
        return Err(RuleError::MissingArgument { kind: "w" });
    }
    let mut current = anchor;
    for _ in 0..7 {
        current = current.succ_opt().ok_or(RuleError::DateOutOfRange)?;
        if weekdays.contains(&current.weekday().number_from_monday()) {
            return Ok(current);
        }
    }
    Err(RuleError::InvalidArgument {
        kind: "w",
        value: format!("{weekdays:?}"),
    })
}

fn next_monthly(reference: NaiveDate, anchor: NaiveDate, days: &[u32]) -> Result<NaiveDate, RuleError> {
    if days.is_empty() {
        return Err(RuleError::MissingArgument { kind: "m" });
    }

    // Months before the reference month can only produce dates before it.
    let start = if (anchor.year(), anchor.month()) >= (reference.year(), reference.month()) {
        anchor
    } else {
        reference
    };
    let (mut year, mut month) = (start.year(), start.month());

    // Every day in 1..=31 exists in at least one of any three consecutive months.
    for _ in 0..4 {
        for &day in days {
            let Some(candidate) = NaiveDate::from_ymd_opt(year, month, day) else {
                continue;
            };
            if candidate >= reference {
                return Ok(candidate);
            }
        }
        if month == 12 {
            year = year.checked_add(1).ok_or(RuleError::DateOutOfRange)?;
            month = 1;
        } else {
            month += 1;
        }
    }
    Err(RuleError::DateOutOfRange)
}
