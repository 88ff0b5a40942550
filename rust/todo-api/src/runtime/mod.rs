//! Execution runtime for task operations.

pub mod manager;

pub use manager::{parse_task_id, TaskManager, DEFAULT_PAGE_SIZE};
