//! Todo API - personal task scheduler with recurring tasks.
//!
//! A small HTTP service for scheduled tasks. A task either happens once or
//! repeats by a compact rule (`d 7`, `y`, `w 1,3,5`, `m 1,15`); completing a
//! recurring task moves it to its next date instead of deleting it.
//!
//! # Architecture
//!
//! - [`scheduler`]: recurrence rule parsing and next-date computation (pure)
//! - [`domain`]: the task record and its lifecycle rules (pure)
//! - [`database`]: the task store trait with SQLite and in-memory backends
//! - [`runtime`]: the task manager running one operation per request
//! - [`gateway`]: HTTP task endpoints, sign-in and the session guard
//! - [`api`]: service endpoints such as `/health`
//! - [`config`]: configuration loading and validation
//!
//! # Example
//!
//! ```rust,ignore
//! use todo_api::{config::AppConfig, server::create_app};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::load(None)?;
//!     let addr = config.bind_address();
//!     let app = create_app(config).await?;
//!
//!     let listener = tokio::net::TcpListener::bind(addr).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod api;
pub mod config;
pub mod database;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod runtime;
pub mod scheduler;
pub mod server;

use std::sync::Arc;

use config::AppConfig;
use gateway::auth::AuthSettings;
use runtime::TaskManager;

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Task operations over the configured store.
    pub tasks: TaskManager,
    /// Sign-in settings and token signing key.
    pub auth: AuthSettings,
}
