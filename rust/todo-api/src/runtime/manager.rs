//! Task lifecycle management.
//!
//! [`TaskManager`] runs one logical operation per call: it applies the task
//! lifecycle rules, talks to the record store and maps failures into
//! [`ApiError`]s. It is the only layer that logs task mutations.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::database::{TaskFilter, TaskRepository};
use crate::domain::{Completion, Task};
use crate::error::{ApiError, ApiResult};
use crate::scheduler::date::{format_date, parse_date, parse_search_date, today};
use crate::scheduler::next_date;

/// Default number of tasks returned by a listing.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Orchestrates task operations over a [`TaskRepository`].
#[derive(Clone)]
pub struct TaskManager {
    /// Record store.
    store: Arc<dyn TaskRepository>,
    /// Listing cap.
    page_size: usize,
    /// Source of "today".
    clock: fn() -> NaiveDate,
}

impl std::fmt::Debug for TaskManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskManager")
            .field("store", &self.store)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

/// Parse a task id received as text.
pub fn parse_task_id(raw: Option<&str>) -> ApiResult<i64> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(ApiError::validation("task id is required"));
    }
    raw.parse()
        .map_err(|_| ApiError::validation(format!("task id must be a number: {raw}")))
}

fn persistence_error(operation: &'static str, err: &anyhow::Error) -> ApiError {
    tracing::error!(operation, error = ?err, "Task store failure");
    ApiError::Persistence(format!("failed to {operation} task"))
}

impl TaskManager {
    /// Create a manager over `store`.
    pub fn new(store: Arc<dyn TaskRepository>, page_size: usize) -> Self {
        Self {
            store,
            page_size,
            clock: today,
        }
    }

    /// Replace the clock used for "today".
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }

    /// Current date according to the manager's clock.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    /// Validate, adjust and store a new task. Returns its id.
    pub async fn create(&self, mut task: Task) -> ApiResult<i64> {
        task.id = None;
        if let Err(err) = task.prepare_for_create(self.today()) {
            tracing::debug!(operation = "create", error = %err, "Task rejected");
            return Err(err.into());
        }

        let id = self
            .store
            .insert(&task)
            .await
            .map_err(|e| persistence_error("create", &e))?;

        tracing::info!(
            task_id = id,
            operation = "create",
            date = %task.date,
            recurring = task.is_recurring(),
            "Task created"
        );
        Ok(id)
    }

    /// Fetch a task by id.
    pub async fn get(&self, id: i64) -> ApiResult<Task> {
        self.store
            .get(id)
            .await
            .map_err(|e| persistence_error("load", &e))?
            .ok_or_else(|| ApiError::task_not_found(id))
    }

    /// Replace an existing task. The submitted date is stored as given.
    pub async fn edit(&self, mut task: Task) -> ApiResult<()> {
        let id = task
            .id
            .ok_or_else(|| ApiError::validation("task id is required"))?;

        let today = self.today();
        task.validate(today)?;
        task.validate_edited_rule(today)?;
        self.get(id).await?;

        let updated = self
            .store
            .update(&task)
            .await
            .map_err(|e| persistence_error("update", &e))?;
        if !updated {
            return Err(ApiError::task_not_found(id));
        }

        tracing::info!(task_id = id, operation = "edit", date = %task.date, "Task updated");
        Ok(())
    }

    /// Mark a task done: delete a one-shot task, reschedule a recurring one.
    pub async fn complete(&self, id: i64) -> ApiResult<Completion> {
        let task = self.get(id).await?;
        let completion = task.complete()?;

        let applied = match &completion {
            Completion::Delete => self
                .store
                .delete(id)
                .await
                .map_err(|e| persistence_error("delete", &e))?,
            Completion::Reschedule(date) => self
                .store
                .update_date(id, date)
                .await
                .map_err(|e| persistence_error("reschedule", &e))?,
        };
        if !applied {
            return Err(ApiError::task_not_found(id));
        }

        match &completion {
            Completion::Delete => {
                tracing::info!(task_id = id, operation = "complete", "One-shot task done, deleted");
            }
            Completion::Reschedule(date) => {
                tracing::info!(
                    task_id = id,
                    operation = "complete",
                    next_date = %date,
                    "Recurring task rescheduled"
                );
            }
        }
        Ok(completion)
    }

    /// Delete a task.
    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        let deleted = self
            .store
            .delete(id)
            .await
            .map_err(|e| persistence_error("delete", &e))?;
        if !deleted {
            return Err(ApiError::task_not_found(id));
        }
        tracing::info!(task_id = id, operation = "delete", "Task deleted");
        Ok(())
    }

    /// List tasks, optionally narrowed by a search string.
    ///
    /// A `DD.MM.YYYY` search selects that date; any other text matches title
    /// or comment.
    pub async fn list(&self, search: Option<&str>) -> ApiResult<Vec<Task>> {
        let search = search.map(str::trim).unwrap_or_default();
        let filter = if search.is_empty() {
            TaskFilter::All
        } else if let Some(date) = parse_search_date(search) {
            TaskFilter::Date(format_date(date))
        } else {
            TaskFilter::Search(search.to_string())
        };

        self.store
            .query(filter, self.page_size)
            .await
            .map_err(|e| persistence_error("list", &e))
    }

    /// Compute the next occurrence of `repeat` for a task dated `date`.
    ///
    /// `now` defaults to today when absent or empty.
    pub fn next_date(&self, now: Option<&str>, date: &str, repeat: &str) -> ApiResult<String> {
        let reference = match now.map(str::trim).filter(|n| !n.is_empty()) {
            Some(raw) => parse_date(raw)
                .ok_or_else(|| ApiError::validation(format!("invalid now date: {raw}")))?,
            None => self.today(),
        };
        Ok(next_date(reference, date, repeat)?)
    }
}
