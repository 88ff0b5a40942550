//! Task record and lifecycle rules.
//!
//! Keeps a task's stored date consistent with its recurrence rule when the
//! task is created, completed or edited. Callers pass "today" in explicitly;
//! nothing here reads the clock or touches storage.

use chrono::NaiveDate;
use thiserror::Error;

use crate::scheduler::date::{format_date, parse_date};
use crate::scheduler::{next_date, RecurrenceRule, RuleError};

/// Maximum stored length of a recurrence expression.
pub const MAX_REPEAT_LEN: usize = 128;

/// A scheduled task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Task {
    /// Store-assigned identifier; `None` until inserted.
    pub id: Option<i64>,
    /// Scheduled date, `YYYYMMDD`.
    pub date: String,
    /// Task title.
    pub title: String,
    /// Free-form comment.
    pub comment: String,
    /// Recurrence expression; empty for one-shot tasks.
    pub repeat: String,
}

/// Validation failures for task records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("task title is required")]
    MissingTitle,

    #[error("date must be in YYYYMMDD format: {0}")]
    InvalidDate(String),

    #[error("invalid repeat rule: {0}")]
    InvalidRule(#[from] RuleError),

    #[error("repeat rule must be at most {MAX_REPEAT_LEN} characters")]
    RuleTooLong,
}

/// What completing a task does to its record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// One-shot task: remove the record.
    Delete,
    /// Recurring task: keep the record, move it to this date.
    Reschedule(String),
}

impl Task {
    /// Create an unsaved task.
    pub fn new(
        date: impl Into<String>,
        title: impl Into<String>,
        comment: impl Into<String>,
        repeat: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            date: date.into(),
            title: title.into(),
            comment: comment.into(),
            repeat: repeat.into(),
        }
    }

    /// Builder-style id assignment.
    #[must_use]
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Whether completing this task reschedules it instead of deleting it.
    #[must_use]
    pub fn is_recurring(&self) -> bool {
        !self.repeat.is_empty()
    }

    /// Check the record shape, defaulting an empty date to `today`.
    ///
    /// Re-validating a valid record changes nothing.
    pub fn validate(&mut self, today: NaiveDate) -> Result<(), TaskError> {
        if self.title.trim().is_empty() {
            return Err(TaskError::MissingTitle);
        }
        if self.date.is_empty() {
            self.date = format_date(today);
        }
        if parse_date(&self.date).is_none() {
            return Err(TaskError::InvalidDate(self.date.clone()));
        }
        if self.repeat.chars().count() > MAX_REPEAT_LEN {
            return Err(TaskError::RuleTooLong);
        }
        Ok(())
    }

    /// Move a past date forward before the task is first stored.
    ///
    /// One-shot tasks in the past land on `today`; recurring ones on the next
    /// occurrence not before `today`. The rule is checked even when the date
    /// needs no adjustment so an invalid rule is never stored.
    pub fn adjust_date_on_create(&mut self, today: NaiveDate) -> Result<(), TaskError> {
        if self.is_recurring() {
            self.repeat.parse::<RecurrenceRule>()?;
        }

        let today_str = format_date(today);
        // Fixed-width YYYYMMDD compares chronologically as text.
        if self.date < today_str {
            self.date = if self.is_recurring() {
                next_date(today, &self.date, &self.repeat)?
            } else {
                today_str
            };
        }
        Ok(())
    }

    /// Validate and adjust a task submitted for creation.
    pub fn prepare_for_create(&mut self, today: NaiveDate) -> Result<(), TaskError> {
        self.validate(today)?;
        self.adjust_date_on_create(today)
    }

    /// Decide what completing the task does.
    ///
    /// Recurring tasks advance relative to their own scheduled date, not to
    /// today. A monthly task already on a listed day keeps that date.
    pub fn complete(&self) -> Result<Completion, TaskError> {
        if !self.is_recurring() {
            return Ok(Completion::Delete);
        }
        let scheduled =
            parse_date(&self.date).ok_or_else(|| TaskError::InvalidDate(self.date.clone()))?;
        let next = next_date(scheduled, &self.date, &self.repeat)?;
        Ok(Completion::Reschedule(next))
    }

    /// Check that an edited rule can produce a next date from `today`.
    ///
    /// The computed date is discarded; the submitted date is stored as-is.
    pub fn validate_edited_rule(&self, today: NaiveDate) -> Result<(), TaskError> {
        if self.is_recurring() {
            next_date(today, &self.date, &self.repeat)?;
        }
        Ok(())
    }
}
