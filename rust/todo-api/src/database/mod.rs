//! Database abstraction layer.
//!
//! Task records live behind the [`TaskRepository`] trait so the service runs
//! the same way against either backend:
//! - **SQLite**: durable single-file storage (default)
//! - **Memory**: process-local storage for tests and demos

pub mod task_store;

pub use task_store::{InMemoryTaskStore, SqliteTaskStore, TaskFilter, TaskRepository};

use std::sync::Arc;

use crate::config::{DatabaseConfig, DatabaseDriver};

/// Create the task store selected by configuration.
///
/// # Errors
///
/// Returns an error if the driver is unknown or the database cannot be opened.
pub async fn create_task_store(config: &DatabaseConfig) -> anyhow::Result<Arc<dyn TaskRepository>> {
    let driver = config.driver().map_err(anyhow::Error::msg)?;
    let store: Arc<dyn TaskRepository> = match driver {
        DatabaseDriver::Sqlite => Arc::new(SqliteTaskStore::new(config.path.clone()).await?),
        DatabaseDriver::Memory => Arc::new(InMemoryTaskStore::new()),
    };
    Ok(store)
}
