//! Task record storage.
//!
//! Provides the [`TaskRepository`] abstraction and two backends:
//! - [`SqliteTaskStore`]: durable storage in a single `scheduler` table
//! - [`InMemoryTaskStore`]: process-local storage for tests and throwaway runs
//!
//! Each call is one statement and therefore atomic on its own; callers that
//! read, compute and write back get last-writer-wins semantics.
//!
//! # Example
//!
//! ```rust,ignore
//! use todo_api::database::{SqliteTaskStore, TaskFilter, TaskRepository};
//! use todo_api::domain::Task;
//!
//! let store = SqliteTaskStore::new("./scheduler.db").await?;
//! let id = store.insert(&Task::new("20240301", "Pay rent", "", "m 1")).await?;
//! let upcoming = store.query(TaskFilter::All, 50).await?;
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::task;

use crate::domain::Task;

/// Which records a listing returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskFilter {
    /// Every task.
    All,
    /// Tasks scheduled on exactly this `YYYYMMDD` date.
    Date(String),
    /// Tasks whose title or comment contains this text (ASCII case-insensitive).
    Search(String),
}

/// Repository trait for task records.
#[async_trait]
pub trait TaskRepository: Send + Sync + std::fmt::Debug {
    /// Store a new task and return its assigned id. Any id on `task` is ignored.
    async fn insert(&self, task: &Task) -> Result<i64>;

    /// Get a task by id.
    async fn get(&self, id: i64) -> Result<Option<Task>>;

    /// Replace every field of an existing task. Returns `false` if the id is unknown.
    async fn update(&self, task: &Task) -> Result<bool>;

    /// Change only the date of an existing task. Returns `false` if the id is unknown.
    async fn update_date(&self, id: i64, date: &str) -> Result<bool>;

    /// Delete a task. Returns `false` if the id is unknown.
    async fn delete(&self, id: i64) -> Result<bool>;

    /// List tasks matching `filter`, ordered by date, at most `limit` of them.
    async fn query(&self, filter: TaskFilter, limit: usize) -> Result<Vec<Task>>;
}

const SELECT_COLUMNS: &str = "SELECT id, date, title, comment, repeat FROM scheduler";

/// `SQLite`-backed task store.
///
/// All operations use `tokio::task::spawn_blocking` so the blocking driver
/// never runs on the async executor.
#[derive(Debug, Clone)]
pub struct SqliteTaskStore {
    /// Path to `SQLite` database file.
    db_path: PathBuf,
}

impl SqliteTaskStore {
    /// Open (creating if needed) the store at `path`.
    ///
    /// # Errors
    ///
    /// Returns error if database cannot be opened or schema migration fails.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let store = Self {
            db_path: path.into(),
        };
        store.migrate_schema().await?;
        Ok(store)
    }

    async fn migrate_schema(&self) -> Result<()> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || -> Result<()> {
            let conn = Connection::open(&db_path).context("Failed to open database")?;

            // journal_mode reports the resulting mode as a row.
            conn.query_row("PRAGMA journal_mode = WAL", [], |_row| Ok(()))
                .context("Failed to enable WAL mode")?;

            conn.execute(
                r#"
                CREATE TABLE IF NOT EXISTS scheduler (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    date CHAR(8) NOT NULL DEFAULT '',
                    title VARCHAR(256) NOT NULL DEFAULT '',
                    comment TEXT NOT NULL DEFAULT '',
                    repeat VARCHAR(128) NOT NULL DEFAULT '' CHECK(length(repeat) <= 128)
                )
                "#,
                [],
            )
            .context("Failed to create scheduler table")?;

            conn.execute(
                "CREATE INDEX IF NOT EXISTS idx_scheduler_date ON scheduler(date)",
                [],
            )?;

            Ok(())
        })
        .await
        .context("Failed to spawn blocking task")??;

        Ok(())
    }

    /// Run `f` against a fresh connection on the blocking pool.
    async fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        task::spawn_blocking(move || -> Result<T> {
            let conn = Connection::open(&db_path).context("Failed to open database")?;
            f(&conn)
        })
        .await
        .context("Failed to spawn blocking task")?
    }
}

fn row_to_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: Some(row.get(0)?),
        date: row.get(1)?,
        title: row.get(2)?,
        comment: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        repeat: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
    })
}

/// Escape `LIKE` wildcards so the search text matches literally.
fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn limit_param(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

#[async_trait]
impl TaskRepository for SqliteTaskStore {
    async fn insert(&self, task: &Task) -> Result<i64> {
        let task = task.clone();
        self.with_connection(move |conn| {
            conn.execute(
                "INSERT INTO scheduler (date, title, comment, repeat) VALUES (?1, ?2, ?3, ?4)",
                params![&task.date, &task.title, &task.comment, &task.repeat],
            )
            .context("Failed to insert task")?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    async fn get(&self, id: i64) -> Result<Option<Task>> {
        self.with_connection(move |conn| {
            conn.query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id],
                row_to_task,
            )
            .optional()
            .context("Failed to query task")
        })
        .await
    }

    async fn update(&self, task: &Task) -> Result<bool> {
        let Some(id) = task.id else {
            return Ok(false);
        };
        let task = task.clone();
        self.with_connection(move |conn| {
            let changed = conn
                .execute(
                    "UPDATE scheduler SET date = ?1, title = ?2, comment = ?3, repeat = ?4 WHERE id = ?5",
                    params![&task.date, &task.title, &task.comment, &task.repeat, id],
                )
                .context("Failed to update task")?;
            Ok(changed > 0)
        })
        .await
    }

    async fn update_date(&self, id: i64, date: &str) -> Result<bool> {
        let date = date.to_string();
        self.with_connection(move |conn| {
            let changed = conn
                .execute(
                    "UPDATE scheduler SET date = ?1 WHERE id = ?2",
                    params![&date, id],
                )
                .context("Failed to update task date")?;
            Ok(changed > 0)
        })
        .await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        self.with_connection(move |conn| {
            let changed = conn
                .execute("DELETE FROM scheduler WHERE id = ?1", params![id])
                .context("Failed to delete task")?;
            Ok(changed > 0)
        })
        .await
    }

    async fn query(&self, filter: TaskFilter, limit: usize) -> Result<Vec<Task>> {
        let limit = limit_param(limit);
        self.with_connection(move |conn| {
            let tasks = match filter {
                TaskFilter::All => {
                    let mut stmt = conn.prepare(&format!(
                        "{SELECT_COLUMNS} ORDER BY date, id LIMIT ?1"
                    ))?;
                    stmt.query_map(params![limit], row_to_task)?
                        .collect::<Result<Vec<_>, _>>()?
                }
                TaskFilter::Date(date) => {
                    let mut stmt = conn.prepare(&format!(
                        "{SELECT_COLUMNS} WHERE date = ?1 ORDER BY date, id LIMIT ?2"
                    ))?;
                    stmt.query_map(params![date, limit], row_to_task)?
                        .collect::<Result<Vec<_>, _>>()?
                }
                TaskFilter::Search(text) => {
                    let mut stmt = conn.prepare(&format!(
                        r"{SELECT_COLUMNS}
                        WHERE title LIKE ?1 ESCAPE '\' OR comment LIKE ?1 ESCAPE '\'
                        ORDER BY date, id LIMIT ?2"
                    ))?;
                    stmt.query_map(params![like_pattern(&text), limit], row_to_task)?
                        .collect::<Result<Vec<_>, _>>()?
                }
            };
            Ok(tasks)
        })
        .await
        .context("Failed to list tasks")
    }
}

/// Process-local task store.
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    state: RwLock<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    last_id: i64,
    tasks: BTreeMap<i64, Task>,
}

impl InMemoryTaskStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_filter(task: &Task, filter: &TaskFilter) -> bool {
    match filter {
        TaskFilter::All => true,
        TaskFilter::Date(date) => task.date == *date,
        TaskFilter::Search(text) => {
            let needle = text.to_ascii_lowercase();
            task.title.to_ascii_lowercase().contains(&needle)
                || task.comment.to_ascii_lowercase().contains(&needle)
        }
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskStore {
    async fn insert(&self, task: &Task) -> Result<i64> {
        let mut state = self.state.write();
        state.last_id += 1;
        let id = state.last_id;
        state.tasks.insert(id, task.clone().with_id(id));
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Option<Task>> {
        Ok(self.state.read().tasks.get(&id).cloned())
    }

    async fn update(&self, task: &Task) -> Result<bool> {
        let Some(id) = task.id else {
            return Ok(false);
        };
        let mut state = self.state.write();
        match state.tasks.get_mut(&id) {
            Some(stored) => {
                *stored = task.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_date(&self, id: i64, date: &str) -> Result<bool> {
        let mut state = self.state.write();
        match state.tasks.get_mut(&id) {
            Some(stored) => {
                stored.date = date.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        Ok(self.state.write().tasks.remove(&id).is_some())
    }

    async fn query(&self, filter: TaskFilter, limit: usize) -> Result<Vec<Task>> {
        let state = self.state.read();
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| matches_filter(task, &filter))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        tasks.truncate(limit);
        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    async fn create_test_store() -> (SqliteTaskStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let store = SqliteTaskStore::new(temp_file.path()).await.unwrap();
        (store, temp_file)
    }

    async fn seed(store: &dyn TaskRepository) {
        for task in [
            Task::new("20240320", "Dentist", "bring card", ""),
            Task::new("20240305", "Pay rent", "", "m 5"),
            Task::new("20240310", "Gym", "leg day", "w 1,3,5"),
            Task::new("20240305", "Call mom", "about the 50% discount", ""),
        ] {
            store.insert(&task).await.unwrap();
        }
    }

    async fn check_crud(store: &dyn TaskRepository) {
        let id = store
            .insert(&Task::new("20240301", "Write report", "", "d 7"))
            .await
            .unwrap();

        let task = store.get(id).await.unwrap().unwrap();
        assert_eq!(task.id, Some(id));
        assert_eq!(task.title, "Write report");
        assert_eq!(task.repeat, "d 7");

        let edited = Task::new("20240302", "Write final report", "v2", "").with_id(id);
        assert!(store.update(&edited).await.unwrap());
        assert_eq!(store.get(id).await.unwrap(), Some(edited));

        assert!(store.update_date(id, "20240309").await.unwrap());
        assert_eq!(store.get(id).await.unwrap().unwrap().date, "20240309");

        assert!(store.delete(id).await.unwrap());
        assert!(store.get(id).await.unwrap().is_none());
    }

    async fn check_unknown_ids(store: &dyn TaskRepository) {
        assert!(store.get(999).await.unwrap().is_none());
        assert!(!store.update(&Task::new("20240101", "x", "", "").with_id(999)).await.unwrap());
        assert!(!store.update(&Task::new("20240101", "x", "", "")).await.unwrap());
        assert!(!store.update_date(999, "20240101").await.unwrap());
        assert!(!store.delete(999).await.unwrap());
    }

    async fn check_query(store: &dyn TaskRepository) {
        seed(store).await;

        let all = store.query(TaskFilter::All, 50).await.unwrap();
        let titles: Vec<_> = all.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["Pay rent", "Call mom", "Gym", "Dentist"]);

        let capped = store.query(TaskFilter::All, 2).await.unwrap();
        assert_eq!(capped.len(), 2);

        let on_date = store
            .query(TaskFilter::Date("20240305".to_string()), 50)
            .await
            .unwrap();
        assert_eq!(on_date.len(), 2);
        assert!(on_date.iter().all(|t| t.date == "20240305"));

        let by_title = store
            .query(TaskFilter::Search("GYM".to_string()), 50)
            .await
            .unwrap();
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].title, "Gym");

        let by_comment = store
            .query(TaskFilter::Search("card".to_string()), 50)
            .await
            .unwrap();
        assert_eq!(by_comment[0].title, "Dentist");

        let literal_percent = store
            .query(TaskFilter::Search("50%".to_string()), 50)
            .await
            .unwrap();
        assert_eq!(literal_percent.len(), 1);
        assert_eq!(literal_percent[0].title, "Call mom");

        let wildcard = store
            .query(TaskFilter::Search("_".to_string()), 50)
            .await
            .unwrap();
        assert!(wildcard.is_empty());
    }

    #[tokio::test]
    async fn test_sqlite_crud() {
        let (store, _temp) = create_test_store().await;
        check_crud(&store).await;
    }

    #[tokio::test]
    async fn test_sqlite_unknown_ids() {
        let (store, _temp) = create_test_store().await;
        check_unknown_ids(&store).await;
    }

    #[tokio::test]
    async fn test_sqlite_query() {
        let (store, _temp) = create_test_store().await;
        check_query(&store).await;
    }

    #[tokio::test]
    async fn test_sqlite_reopen_keeps_data() {
        let (store, temp) = create_test_store().await;
        let id = store
            .insert(&Task::new("20240301", "Persist me", "", ""))
            .await
            .unwrap();

        let reopened = SqliteTaskStore::new(temp.path()).await.unwrap();
        assert_eq!(reopened.get(id).await.unwrap().unwrap().title, "Persist me");
    }

    #[tokio::test]
    async fn test_sqlite_rejects_overlong_repeat() {
        let (store, _temp) = create_test_store().await;
        let result = store
            .insert(&Task::new("20240301", "Too long", "", "d".repeat(129)))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_memory_crud() {
        check_crud(&InMemoryTaskStore::new()).await;
    }

    #[tokio::test]
    async fn test_memory_unknown_ids() {
        check_unknown_ids(&InMemoryTaskStore::new()).await;
    }

    #[tokio::test]
    async fn test_memory_query() {
        check_query(&InMemoryTaskStore::new()).await;
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("milk"), "%milk%");
        assert_eq!(like_pattern("50%_off"), r"%50\%\_off%");
    }
}
