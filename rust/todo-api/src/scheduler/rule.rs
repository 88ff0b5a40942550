//! Recurrence expression parsing.
//!
//! Supported forms:
//!
//! - `d <N>` - every N days, 1 <= N <= 400
//! - `y` - every year on the same month/day
//! - `w <d1,d2,...>` - on ISO weekdays (1 = Monday .. 7 = Sunday)
//! - `m <day1,day2,...>` - on days of the month (1..=31)

use std::str::FromStr;

use thiserror::Error;

/// Largest accepted interval for the `d` rule.
pub const MAX_INTERVAL_DAYS: i64 = 400;

/// Errors produced while parsing or evaluating a recurrence expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// The expression was empty or whitespace only.
    #[error("repeat rule is empty")]
    EmptyRule,

    /// The first token is not a known rule kind.
    #[error("unknown repeat rule: {0}")]
    UnknownRule(String),

    /// The rule kind needs an argument that was not given.
    #[error("repeat rule '{kind}' requires an argument")]
    MissingArgument { kind: &'static str },

    /// An argument is not a number or is out of range.
    #[error("invalid argument for repeat rule '{kind}': {value}")]
    InvalidArgument { kind: &'static str, value: String },

    /// The anchor date is not a valid `YYYYMMDD` date.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// The computed date falls outside the supported calendar range.
    #[error("next date is out of the supported calendar range")]
    DateOutOfRange,
}

/// A parsed recurrence expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceRule {
    /// Every N calendar days.
    Interval(u32),
    /// Every calendar year.
    Yearly,
    /// On the listed ISO weekdays.
    Weekly(Vec<u32>),
    /// On the listed days of the month, scanned in the given order.
    Monthly(Vec<u32>),
}

impl FromStr for RecurrenceRule {
    type Err = RuleError;

    fn from_str(expr: &str) -> Result<Self, Self::Err> {
        let mut tokens = expr.split_whitespace();
        let kind = tokens.next().ok_or(RuleError::EmptyRule)?;

        match kind {
            "d" => {
                let arg = tokens.next().ok_or(RuleError::MissingArgument { kind: "d" })?;
                let days = parse_number("d", arg, 1, MAX_INTERVAL_DAYS)?;
                Ok(Self::Interval(days))
            }
            "y" => Ok(Self::Yearly),
            "w" => {
                let arg = tokens.next().ok_or(RuleError::MissingArgument { kind: "w" })?;
                let mut weekdays = parse_list("w", arg, 1, 7)?;
                weekdays.sort_unstable();
                weekdays.dedup();
                Ok(Self::Weekly(weekdays))
            }
            "m" => {
                // Every remaining token contributes days, so `m 5,20` and `m 5 20` agree.
                let mut days = Vec::new();
                for arg in tokens {
                    days.extend(parse_list("m", arg, 1, 31)?);
                }
                if days.is_empty() {
                    return Err(RuleError::MissingArgument { kind: "m" });
                }
                Ok(Self::Monthly(days))
            }
            other => Err(RuleError::UnknownRule(other.to_string())),
        }
    }
}

fn parse_list(kind: &'static str, arg: &str, min: i64, max: i64) -> Result<Vec<u32>, RuleError> {
    arg.split(',')
        .map(|item| parse_number(kind, item, min, max))
        .collect()
}

fn parse_number(kind: &'static str, value: &str, min: i64, max: i64) -> Result<u32, RuleError> {
    let invalid = || RuleError::InvalidArgument {
        kind,
        value: value.to_string(),
    };
    let number: i64 = value.parse().map_err(|_| invalid())?;
    if number < min || number > max {
        return Err(invalid());
    }
    u32::try_from(number).map_err(|_| invalid())
}
